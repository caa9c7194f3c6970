//! Connection and statement decorators that add the caller comment.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{DbErr, ExecResult, QueryResult};

use crate::address::LocalAddress;
use crate::config::{InterceptorConfig, ProjectName};
use crate::dispatch::CallKind;
use crate::rewrite::SqlCommenter;
use crate::surface::{SqlConnection, SqlStatement};

/// A configured caller-comment interceptor.
///
/// One is built per connection pool. It hands out decorators for that pool's
/// connections, all sharing the same immutable [`SqlCommenter`].
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
///
/// use sea_orm::Database;
/// use sea_orm_caller_comment::prelude::*;
///
/// let interceptor = CallerCommentInterceptor::new(InterceptorConfig::new("billing api")?);
///
/// let db = Database::connect("postgres://localhost/mydb").await?;
/// let conn = interceptor.statement(Arc::new(db));
///
/// // Sent as " /* billing api from 10.0.0.12 */ SELECT * FROM invoices"
/// let stmt = conn.create_statement().await?;
/// let rows = stmt.execute_query("SELECT * FROM invoices").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CallerCommentInterceptor {
    commenter: Arc<SqlCommenter>,
}

impl CallerCommentInterceptor {
    /// Build an interceptor using the process-wide local address unless the
    /// configuration already carries one.
    pub fn new(config: InterceptorConfig) -> Self {
        let local_address = config
            .local_address
            .unwrap_or_else(LocalAddress::shared);
        Self::with_commenter(SqlCommenter::new(config.project_name, local_address))
    }

    /// Build an interceptor from the pool's interceptor properties.
    pub fn from_properties(properties: &HashMap<String, String>) -> crate::error::Result<Self> {
        InterceptorConfig::from_properties(properties).map(Self::new)
    }

    /// Build an interceptor around an already configured commenter.
    pub fn with_commenter(commenter: SqlCommenter) -> Self {
        Self {
            commenter: Arc::new(commenter),
        }
    }

    /// The commenter shared by every decorator this interceptor hands out.
    pub fn commenter(&self) -> &SqlCommenter {
        &self.commenter
    }

    pub(crate) fn shared_commenter(&self) -> Arc<SqlCommenter> {
        Arc::clone(&self.commenter)
    }

    /// The validated project name written into every comment.
    pub fn project_name(&self) -> &ProjectName {
        self.commenter.project_name()
    }

    /// The address list written after `from`.
    pub fn local_address(&self) -> &LocalAddress {
        self.commenter.local_address()
    }

    /// Wrap a connection so that prepared and callable statements are
    /// commented. Plain statements are returned as is.
    pub fn connection<C: SqlConnection>(&self, conn: C) -> ConnectionInterceptor<C> {
        ConnectionInterceptor {
            inner: conn,
            commenter: Arc::clone(&self.commenter),
        }
    }

    /// Wrap a connection so that prepared and callable statements are
    /// commented, and plain statements comment each query they execute.
    pub fn statement<C: SqlConnection>(&self, conn: C) -> StatementInterceptor<C> {
        StatementInterceptor {
            connection: self.connection(conn),
        }
    }
}

/// Connection decorator that comments prepare-style calls.
#[derive(Debug, Clone)]
pub struct ConnectionInterceptor<C> {
    inner: C,
    commenter: Arc<SqlCommenter>,
}

impl<C> ConnectionInterceptor<C> {
    /// The wrapped connection.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwrap the decorator, returning the original connection.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait]
impl<C: SqlConnection> SqlConnection for ConnectionInterceptor<C> {
    type Prepared = C::Prepared;
    type Statement = C::Statement;

    async fn prepare_statement(&self, sql: &str) -> Result<C::Prepared, DbErr> {
        let sql = self.commenter.comment_call(CallKind::PrepareStatement, sql);
        self.inner.prepare_statement(&sql).await
    }

    async fn prepare_call(&self, sql: &str) -> Result<C::Prepared, DbErr> {
        let sql = self.commenter.comment_call(CallKind::PrepareCall, sql);
        self.inner.prepare_call(&sql).await
    }

    async fn create_statement(&self) -> Result<C::Statement, DbErr> {
        self.inner.create_statement().await
    }

    async fn close(&self) -> Result<(), DbErr> {
        self.inner.close().await
    }
}

/// Connection decorator that also wraps plain statements.
///
/// Prepared and callable statements are commented once, at creation, and are
/// not wrapped. Statements from `create_statement` carry no SQL yet, so they
/// are wrapped in an [`InterceptedStatement`] that comments each execution.
#[derive(Debug, Clone)]
pub struct StatementInterceptor<C> {
    connection: ConnectionInterceptor<C>,
}

impl<C> StatementInterceptor<C> {
    /// The wrapped connection.
    pub fn inner(&self) -> &C {
        self.connection.inner()
    }

    pub fn into_inner(self) -> C {
        self.connection.into_inner()
    }
}

#[async_trait]
impl<C: SqlConnection> SqlConnection for StatementInterceptor<C> {
    type Prepared = C::Prepared;
    type Statement = InterceptedStatement<C::Statement>;

    async fn prepare_statement(&self, sql: &str) -> Result<C::Prepared, DbErr> {
        self.connection.prepare_statement(sql).await
    }

    async fn prepare_call(&self, sql: &str) -> Result<C::Prepared, DbErr> {
        self.connection.prepare_call(sql).await
    }

    async fn create_statement(
        &self,
    ) -> Result<InterceptedStatement<C::Statement>, DbErr> {
        let statement = self.connection.create_statement().await?;
        Ok(InterceptedStatement {
            inner: statement,
            commenter: Arc::clone(&self.connection.commenter),
        })
    }

    async fn close(&self) -> Result<(), DbErr> {
        self.connection.close().await
    }
}

/// Statement decorator that comments SQL passed at execution time.
#[derive(Debug, Clone)]
pub struct InterceptedStatement<S> {
    inner: S,
    commenter: Arc<SqlCommenter>,
}

impl<S> InterceptedStatement<S> {
    /// The wrapped statement.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: SqlStatement> SqlStatement for InterceptedStatement<S> {
    async fn execute_query(&self, sql: &str) -> Result<Vec<QueryResult>, DbErr> {
        let sql = self.commenter.comment_call(CallKind::ExecuteQuery, sql);
        self.inner.execute_query(&sql).await
    }

    async fn execute_update(&self, sql: &str) -> Result<u64, DbErr> {
        let sql = self.commenter.comment_call(CallKind::ExecuteUpdate, sql);
        self.inner.execute_update(&sql).await
    }

    async fn execute(&self, sql: &str) -> Result<ExecResult, DbErr> {
        self.inner.execute(sql).await
    }

    async fn close(&self) -> Result<(), DbErr> {
        self.inner.close().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    type Calls = Arc<Mutex<Vec<(&'static str, String)>>>;

    struct FakeConnection {
        calls: Calls,
        fail_close: bool,
    }

    struct FakeStatement {
        calls: Calls,
    }

    fn record(calls: &Calls, method: &'static str, sql: &str) {
        calls.lock().unwrap().push((method, sql.to_string()));
    }

    #[async_trait]
    impl SqlConnection for FakeConnection {
        type Prepared = String;
        type Statement = FakeStatement;

        async fn prepare_statement(&self, sql: &str) -> Result<String, DbErr> {
            record(&self.calls, "prepare_statement", sql);
            Ok(sql.to_string())
        }

        async fn prepare_call(&self, sql: &str) -> Result<String, DbErr> {
            record(&self.calls, "prepare_call", sql);
            Ok(sql.to_string())
        }

        async fn create_statement(&self) -> Result<FakeStatement, DbErr> {
            record(&self.calls, "create_statement", "");
            Ok(FakeStatement {
                calls: Arc::clone(&self.calls),
            })
        }

        async fn close(&self) -> Result<(), DbErr> {
            record(&self.calls, "close", "");
            if self.fail_close {
                Err(DbErr::Custom("connection already closed".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl SqlStatement for FakeStatement {
        async fn execute_query(&self, sql: &str) -> Result<Vec<QueryResult>, DbErr> {
            record(&self.calls, "execute_query", sql);
            Ok(Vec::new())
        }

        async fn execute_update(&self, sql: &str) -> Result<u64, DbErr> {
            record(&self.calls, "execute_update", sql);
            Ok(1)
        }

        async fn execute(&self, sql: &str) -> Result<ExecResult, DbErr> {
            record(&self.calls, "execute", sql);
            Err(DbErr::Custom("syntax error".to_string()))
        }

        async fn close(&self) -> Result<(), DbErr> {
            record(&self.calls, "close", "");
            Ok(())
        }
    }

    fn interceptor() -> CallerCommentInterceptor {
        CallerCommentInterceptor::new(
            InterceptorConfig::new("my_project")
                .unwrap()
                .with_local_address(LocalAddress::parse("10.0.0.12").unwrap()),
        )
    }

    fn fake(fail_close: bool) -> (FakeConnection, Calls) {
        let calls = Calls::default();
        let conn = FakeConnection {
            calls: Arc::clone(&calls),
            fail_close,
        };
        (conn, calls)
    }

    fn recorded(calls: &Calls) -> Vec<(&'static str, String)> {
        calls.lock().unwrap().clone()
    }

    const COMMENT: &str = " /* my_project from 10.0.0.12 */ ";

    #[test]
    fn test_from_properties() {
        let properties = HashMap::from([("projectName".to_string(), "orders".to_string())]);
        let interceptor = CallerCommentInterceptor::from_properties(&properties).unwrap();
        assert_eq!(interceptor.project_name().as_str(), "orders");
    }

    #[test]
    fn test_from_properties_rejects_bad_name() {
        let properties = HashMap::from([("projectName".to_string(), "orders*/".to_string())]);
        assert!(CallerCommentInterceptor::from_properties(&properties).is_err());
    }

    #[test]
    fn test_injected_address_is_used() {
        let interceptor = interceptor();
        assert_eq!(interceptor.local_address().as_str(), "10.0.0.12");
        assert_eq!(interceptor.commenter().comment_sql("SELECT 1"), format!("{COMMENT}SELECT 1"));
    }

    #[test]
    fn test_discovered_address_is_shared_across_interceptors() {
        let first = CallerCommentInterceptor::new(InterceptorConfig::new("orders").unwrap());
        let second = CallerCommentInterceptor::new(InterceptorConfig::new("billing").unwrap());

        assert!(first.local_address().shares_storage_with(second.local_address()));
        assert!(first.local_address().shares_storage_with(&LocalAddress::shared()));
    }

    #[tokio::test]
    async fn test_connection_level_comments_prepare_calls() {
        let (conn, calls) = fake(false);
        let conn = interceptor().connection(conn);

        let prepared = conn.prepare_statement("select 1").await.unwrap();
        let callable = conn.prepare_call("SOME_SP").await.unwrap();

        assert_eq!(prepared, format!("{COMMENT}select 1"));
        assert_eq!(callable, format!("{COMMENT}SOME_SP"));
        assert_eq!(recorded(&calls)[0], ("prepare_statement", format!("{COMMENT}select 1")));
    }

    #[tokio::test]
    async fn test_connection_level_leaves_plain_statements_alone() {
        let (conn, calls) = fake(false);
        let conn = interceptor().connection(conn);

        let stmt = conn.create_statement().await.unwrap();
        stmt.execute_query("select 1").await.unwrap();
        stmt.execute_update("UPDATE t SET a = 1").await.unwrap();

        assert_eq!(
            recorded(&calls),
            vec![
                ("create_statement", String::new()),
                ("execute_query", "select 1".to_string()),
                ("execute_update", "UPDATE t SET a = 1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_statement_level_comments_execute_calls() {
        let (conn, calls) = fake(false);
        let conn = interceptor().statement(conn);

        let stmt = conn.create_statement().await.unwrap();
        stmt.execute_query("select 1").await.unwrap();
        let affected = stmt.execute_update("UPDATE t SET a = 1").await.unwrap();
        stmt.close().await.unwrap();

        assert_eq!(affected, 1);
        assert_eq!(
            recorded(&calls),
            vec![
                ("create_statement", String::new()),
                ("execute_query", format!("{COMMENT}select 1")),
                ("execute_update", format!("{COMMENT}UPDATE t SET a = 1")),
                ("close", String::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_statement_level_comments_prepare_once() {
        let (conn, calls) = fake(false);
        let conn = interceptor().statement(conn);

        let prepared = conn.prepare_statement("select ?").await.unwrap();
        let callable = conn.prepare_call("SOME_SP").await.unwrap();

        assert_eq!(prepared, format!("{COMMENT}select ?"));
        assert_eq!(callable, format!("{COMMENT}SOME_SP"));
        assert_eq!(
            recorded(&calls),
            vec![
                ("prepare_statement", format!("{COMMENT}select ?")),
                ("prepare_call", format!("{COMMENT}SOME_SP")),
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_is_not_commented_and_errors_pass_through() {
        let (conn, calls) = fake(false);
        let conn = interceptor().statement(conn);

        let stmt = conn.create_statement().await.unwrap();
        let err = stmt.execute("select 1").await.unwrap_err();

        assert!(matches!(err, DbErr::Custom(msg) if msg == "syntax error"));
        assert_eq!(recorded(&calls)[1], ("execute", "select 1".to_string()));
    }

    #[tokio::test]
    async fn test_close_passes_through() {
        let (conn, calls) = fake(true);
        let conn = interceptor().statement(conn);

        let err = conn.close().await.unwrap_err();

        assert!(matches!(err, DbErr::Custom(msg) if msg == "connection already closed"));
        assert_eq!(recorded(&calls), vec![("close", String::new())]);
    }

    #[tokio::test]
    async fn test_decorators_share_one_commenter() {
        let interceptor = interceptor();
        let (conn, _calls) = fake(false);
        let conn = interceptor.statement(conn);
        let stmt = conn.create_statement().await.unwrap();

        assert!(Arc::ptr_eq(&stmt.commenter, &interceptor.commenter));
        assert!(Arc::ptr_eq(&conn.connection.commenter, &interceptor.commenter));
    }
}
