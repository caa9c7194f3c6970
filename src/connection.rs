//! Commenting wrapper around SeaORM's `DatabaseConnection`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, ExecResult, QueryResult, Statement,
    StreamTrait,
};

use crate::interceptor::CallerCommentInterceptor;
use crate::rewrite::SqlCommenter;

/// A commenting wrapper around SeaORM's `DatabaseConnection`.
///
/// This wrapper implements `ConnectionTrait` and `StreamTrait`, making it a
/// drop-in replacement for `DatabaseConnection` in entity queries. The SQL of
/// every statement sent through it is prefixed with the caller comment; bound
/// values are passed along untouched.
///
/// Transactions are not wrapped: statements issued on a `DatabaseTransaction`
/// obtained from the inner connection are sent as written.
///
/// # Example
///
/// ```rust,ignore
/// use sea_orm::Database;
/// use sea_orm_caller_comment::prelude::*;
///
/// let interceptor = CallerCommentInterceptor::new(InterceptorConfig::new("billing api")?);
/// let db = Database::connect("postgres://localhost/mydb").await?;
/// let commented = db.with_caller_comments(&interceptor);
///
/// // Sent as " /* billing api from 10.0.0.12 */ SELECT ..."
/// let invoices = Invoices::find().all(&commented).await?;
/// ```
#[derive(Debug)]
pub struct CommentedConnection {
    inner: DatabaseConnection,
    commenter: Arc<SqlCommenter>,
}

impl CommentedConnection {
    /// Create a new commented connection sharing the interceptor's state.
    pub fn new(connection: DatabaseConnection, interceptor: &CallerCommentInterceptor) -> Self {
        Self {
            inner: connection,
            commenter: interceptor.shared_commenter(),
        }
    }

    /// Get a reference to the underlying `DatabaseConnection`.
    pub fn inner(&self) -> &DatabaseConnection {
        &self.inner
    }

    /// The commenter shared with the interceptor this wrapper came from.
    pub fn commenter(&self) -> &SqlCommenter {
        &self.commenter
    }

    /// Consume the wrapper and return the inner `DatabaseConnection`.
    pub fn into_inner(self) -> DatabaseConnection {
        self.inner
    }

    fn comment(&self, mut stmt: Statement) -> Statement {
        stmt.sql = self.commenter.comment_sql(&stmt.sql);
        tracing::debug!(sql = %stmt.sql, "changed sql");
        stmt
    }
}

impl AsRef<DatabaseConnection> for CommentedConnection {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.inner
    }
}

#[async_trait]
impl ConnectionTrait for CommentedConnection {
    fn get_database_backend(&self) -> DbBackend {
        self.inner.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        self.inner.execute(self.comment(stmt)).await
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        let sql = self.commenter.comment_sql(sql);
        tracing::debug!(sql = %sql, "changed sql");
        self.inner.execute_unprepared(&sql).await
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        self.inner.query_one(self.comment(stmt)).await
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        self.inner.query_all(self.comment(stmt)).await
    }

    fn support_returning(&self) -> bool {
        self.inner.support_returning()
    }

    fn is_mock_connection(&self) -> bool {
        self.inner.is_mock_connection()
    }
}

#[async_trait]
impl StreamTrait for CommentedConnection {
    type Stream<'a> = <DatabaseConnection as StreamTrait>::Stream<'a>;

    fn stream<'a>(
        &'a self,
        stmt: Statement,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Stream<'a>, DbErr>> + 'a + Send>> {
        let stmt = self.comment(stmt);
        self.inner.stream(stmt)
    }
}

/// Extension trait for easy wrapping of database connections.
pub trait CallerCommentExt {
    /// Wrap this connection so every statement carries the caller comment.
    fn with_caller_comments(self, interceptor: &CallerCommentInterceptor) -> CommentedConnection;
}

impl CallerCommentExt for DatabaseConnection {
    fn with_caller_comments(self, interceptor: &CallerCommentInterceptor) -> CommentedConnection {
        CommentedConnection::new(self, interceptor)
    }
}
