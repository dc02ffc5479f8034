/// Database layer for Teamboard
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: schema migrations for the document table
///
/// The document store that uses this pool lives in [`crate::store::postgres`].

pub mod pool;
pub mod migrations;
