//! Ingestion: header-tolerant column resolution and row → record mapping

pub mod columns;
pub mod mapper;
pub mod schema;
pub mod stores;

pub use columns::{ClaimPolicy, ColumnMap, resolve};
pub use mapper::{coerce_int, map_intake, map_sales};
pub use schema::{FieldKeywords, IntakeSheet, Schema, StoreAlias};
pub use stores::normalize_store;
