//! Database Module
//!
//! Embedded SurrealDB handle and repositories. The handle is opened once at
//! process start and passed into every repository (no ambient singleton).

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "lubri";
const DATABASE: &str = "cloud";

/// Open the persistent store under `data_dir`
pub async fn open(data_dir: &str) -> Result<Surreal<Db>, surrealdb::Error> {
    let db = Surreal::new::<RocksDb>(data_dir).await?;
    db.use_ns(NAMESPACE).use_db(DATABASE).await?;
    tracing::info!("Database opened at {data_dir} (SurrealDB/RocksDB)");
    Ok(db)
}

/// Open a throwaway in-memory store (tests, local experiments)
pub async fn open_memory() -> Result<Surreal<Db>, surrealdb::Error> {
    let db = Surreal::new::<Mem>(()).await?;
    db.use_ns(NAMESPACE).use_db(DATABASE).await?;
    Ok(db)
}
