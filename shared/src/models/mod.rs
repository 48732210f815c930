//! Data models
//!
//! Wire types served by `ledger-server`. Records are produced by the
//! ingestion layer; sessions and credentials by the auth layer.

pub mod credentials;
pub mod customer;
pub mod sales;
pub mod session;

// Re-exports
pub use credentials::*;
pub use customer::*;
pub use sales::*;
pub use session::*;
