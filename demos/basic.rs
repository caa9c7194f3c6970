//! Basic example showing how to use sea-orm-caller-comment.
//!
//! Run with: cargo run --example basic

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{ConnectionTrait, Database, Value};
use sea_orm_caller_comment::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,sea_orm_caller_comment=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Properties as the pool would hand them over
    let properties = HashMap::from([("projectName".to_string(), "billing api".to_string())]);
    let interceptor = CallerCommentInterceptor::from_properties(&properties)?;

    tracing::info!(
        project_name = %interceptor.project_name(),
        local_address = %interceptor.local_address(),
        "Interceptor configured"
    );

    // Connect to database
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/test".into());

    tracing::info!("Connecting to database...");

    let db = Database::connect(&database_url).await?;

    // Option 1: Drop-in replacement for DatabaseConnection
    let commented = db.with_caller_comments(&interceptor);
    commented.execute_unprepared("SELECT 1").await?;
    let db = Arc::new(commented.into_inner());

    // Option 2: Only prepared and callable statements are commented
    // let conn = interceptor.connection(db);

    // Option 3: Prepared statements plus every query on a plain statement
    let conn = interceptor.statement(db);

    let prepared = conn.prepare_statement("SELECT $1::int AS answer").await?;
    tracing::info!(sql = %prepared.sql(), "Prepared statement");
    prepared.query_all([Value::from(42i32)]).await?;

    let stmt = conn.create_statement().await?;
    stmt.execute_query("SELECT now()").await?;
    stmt.close().await?;
    conn.close().await?;

    // Statements hold handles to the pool; close it once they are gone
    drop((prepared, stmt));
    if let Ok(db) = Arc::try_unwrap(conn.into_inner()) {
        db.close().await?;
    }

    Ok(())
}
