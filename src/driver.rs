//! SeaORM-backed implementation of the connection and statement surfaces.
//!
//! The surfaces are implemented for `Arc<DatabaseConnection>` so that every
//! statement handed out keeps the connection alive without cloning it.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, ExecResult, QueryResult, Statement, Value,
};

use crate::surface::{SqlConnection, SqlStatement};

/// A prepared or callable statement bound to a connection.
///
/// The SQL is fixed at creation; values are bound on each execution.
#[derive(Debug, Clone)]
pub struct PreparedSql {
    conn: Arc<DatabaseConnection>,
    sql: String,
}

impl PreparedSql {
    /// The SQL text exactly as it will be sent to the database.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    fn bind<I>(&self, values: I) -> Statement
    where
        I: IntoIterator<Item = Value>,
    {
        Statement::from_sql_and_values(self.conn.get_database_backend(), self.sql.as_str(), values)
    }

    /// Bind `values` and return every matching row.
    pub async fn query_all<I>(&self, values: I) -> Result<Vec<QueryResult>, DbErr>
    where
        I: IntoIterator<Item = Value>,
    {
        self.conn.query_all(self.bind(values)).await
    }

    /// Bind `values` and return the first matching row, if any.
    pub async fn query_one<I>(&self, values: I) -> Result<Option<QueryResult>, DbErr>
    where
        I: IntoIterator<Item = Value>,
    {
        self.conn.query_one(self.bind(values)).await
    }

    /// Bind `values` and run the statement for its effect.
    pub async fn execute<I>(&self, values: I) -> Result<ExecResult, DbErr>
    where
        I: IntoIterator<Item = Value>,
    {
        self.conn.execute(self.bind(values)).await
    }
}

/// A plain statement that runs whatever SQL it is handed.
#[derive(Debug, Clone)]
pub struct PlainStatement {
    conn: Arc<DatabaseConnection>,
}

#[async_trait]
impl SqlStatement for PlainStatement {
    async fn execute_query(&self, sql: &str) -> Result<Vec<QueryResult>, DbErr> {
        let stmt = Statement::from_string(self.conn.get_database_backend(), sql);
        self.conn.query_all(stmt).await
    }

    async fn execute_update(&self, sql: &str) -> Result<u64, DbErr> {
        let result = self.conn.execute_unprepared(sql).await?;
        Ok(result.rows_affected())
    }

    async fn execute(&self, sql: &str) -> Result<ExecResult, DbErr> {
        self.conn.execute_unprepared(sql).await
    }

    async fn close(&self) -> Result<(), DbErr> {
        Ok(())
    }
}

#[async_trait]
impl SqlConnection for Arc<DatabaseConnection> {
    type Prepared = PreparedSql;
    type Statement = PlainStatement;

    async fn prepare_statement(&self, sql: &str) -> Result<PreparedSql, DbErr> {
        Ok(PreparedSql {
            conn: Arc::clone(self),
            sql: sql.to_string(),
        })
    }

    async fn prepare_call(&self, sql: &str) -> Result<PreparedSql, DbErr> {
        Ok(PreparedSql {
            conn: Arc::clone(self),
            sql: sql.to_string(),
        })
    }

    async fn create_statement(&self) -> Result<PlainStatement, DbErr> {
        Ok(PlainStatement {
            conn: Arc::clone(self),
        })
    }

    /// Release this handle. The pool behind it stays open for the other
    /// holders of the `Arc`; close it with `DatabaseConnection::close` once
    /// the last handle is unwrapped.
    async fn close(&self) -> Result<(), DbErr> {
        tracing::trace!("released connection handle");
        Ok(())
    }
}
