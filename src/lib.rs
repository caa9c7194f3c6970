//! # sea-orm-caller-comment
//!
//! Prepends a comment naming the calling application and host to the SQL your
//! application sends through SeaORM, so database administrators can trace a
//! slow or offending query in the server's query log back to where it came
//! from without touching application code.
//!
//! ```text
//!  /* billing api from 10.0.0.12,192.168.1.7 */ SELECT * FROM invoices WHERE id = $1
//! ```
//!
//! ## Features
//!
//! - **Two interception levels**: comment only prepared and callable statements
//!   ([`ConnectionInterceptor`]), or also every query run on a plain statement
//!   ([`StatementInterceptor`])
//! - **Drop-in SeaORM connection**: [`CommentedConnection`] implements
//!   `ConnectionTrait` and `StreamTrait` and comments everything it sends
//! - **Injection-safe**: project names are restricted to letters, digits,
//!   underscores and spaces, so they can never close the comment
//! - **Zero per-call state**: the project name and local address are fixed at
//!   startup and shared read-only across threads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use sea_orm::Database;
//! use sea_orm_caller_comment::prelude::*;
//!
//! let interceptor = CallerCommentInterceptor::new(InterceptorConfig::new("billing api")?);
//!
//! // Drop-in replacement for DatabaseConnection
//! let db = Database::connect("postgres://localhost/mydb").await?;
//! let commented = db.with_caller_comments(&interceptor);
//! let invoices = Invoices::find().all(&commented).await?;
//!
//! // Or the statement-level call surface over a shared connection
//! let conn = interceptor.statement(Arc::new(commented.into_inner()));
//! let stmt = conn.create_statement().await?;
//! stmt.execute_update("UPDATE invoices SET paid = true").await?;
//! ```
//!
//! ## Configuration
//!
//! Pools configured through key-value interceptor properties pass them to
//! [`CallerCommentInterceptor::from_properties`]. The only recognized key is
//! `projectName`.
//!
//! | Failure | Message |
//! |---------|---------|
//! | missing or blank `projectName` | `projectName property must be set.` |
//! | illegal characters | `projectName '<value>' contains illegal chars. ...` |
//!
//! The local address is discovered once per process, on first use, and falls
//! back to `unknown-local-ip` if the network interfaces cannot be read. Every
//! interceptor built without an explicit address shares it.

mod address;
mod config;
mod connection;
mod dispatch;
mod driver;
mod error;
mod interceptor;
mod rewrite;
mod surface;

pub use address::{LocalAddress, UNKNOWN_LOCAL_IP};
pub use config::{InterceptorConfig, ProjectName, PROJECT_NAME_KEY};
pub use connection::{CallerCommentExt, CommentedConnection};
pub use dispatch::{CallKind, Dispatch, Surface};
pub use driver::{PlainStatement, PreparedSql};
pub use error::{Error, Result};
pub use interceptor::{
    CallerCommentInterceptor, ConnectionInterceptor, InterceptedStatement, StatementInterceptor,
};
pub use rewrite::SqlCommenter;
pub use surface::{SqlConnection, SqlStatement};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CallerCommentExt, CallerCommentInterceptor, CommentedConnection, InterceptorConfig,
        LocalAddress, SqlConnection, SqlStatement,
    };
}
