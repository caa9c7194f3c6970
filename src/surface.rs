//! The connection and statement call surfaces the interceptors decorate.
//!
//! Each intercepted operation is its own trait method, so the decision of
//! what to rewrite is made by which method is called rather than by matching
//! method names at runtime. Decorators implement these traits by wrapping the
//! next handler in the chain.

use async_trait::async_trait;
use sea_orm::{DbErr, ExecResult, QueryResult};

/// Statement creation on a database connection.
#[async_trait]
pub trait SqlConnection: Send + Sync {
    /// Statement returned by `prepare_statement` and `prepare_call`.
    type Prepared: Send;

    /// Statement returned by `create_statement`.
    type Statement: SqlStatement;

    /// Create a prepared statement from `sql`.
    async fn prepare_statement(&self, sql: &str) -> Result<Self::Prepared, DbErr>;

    /// Create a callable statement (stored procedure call) from `sql`.
    async fn prepare_call(&self, sql: &str) -> Result<Self::Prepared, DbErr>;

    /// Create a plain statement; its SQL is supplied at execution time.
    async fn create_statement(&self) -> Result<Self::Statement, DbErr>;

    async fn close(&self) -> Result<(), DbErr>;
}

/// Direct SQL execution on a plain statement.
#[async_trait]
pub trait SqlStatement: Send + Sync {
    /// Run a query and return its rows.
    async fn execute_query(&self, sql: &str) -> Result<Vec<QueryResult>, DbErr>;

    /// Run a data-modifying statement and return the affected row count.
    async fn execute_update(&self, sql: &str) -> Result<u64, DbErr>;

    /// Run arbitrary SQL. Interceptors never annotate this call.
    async fn execute(&self, sql: &str) -> Result<ExecResult, DbErr>;

    async fn close(&self) -> Result<(), DbErr>;
}
