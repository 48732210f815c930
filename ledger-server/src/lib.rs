//! Ledger Server - store sales and customer intake gateway
//!
//! Serves the sales ledger, customer intake sheets, goals, settings and
//! page passwords of a small chain of stores. The data lives in a workbook
//! of named sheets; responses are cached in an embedded redb database next
//! to the login sessions.
//!
//! # Module layout
//!
//! ```text
//! ledger-server/src/
//! ├── core/       # config, state, errors, server
//! ├── api/        # actions, routing, HTTP handlers, wire shapes
//! ├── source/     # tabular workbook access
//! ├── ingest/     # header resolution and row mapping
//! ├── services/   # sales, customers, settings
//! ├── cache/      # TTL read-through cache
//! ├── auth/       # password hashing, sessions
//! ├── kv/         # key-value state store
//! └── utils/      # logging, clocks, dates
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod core;
pub mod ingest;
pub mod kv;
pub mod services;
pub mod source;
pub mod utils;

pub use api::{Outcome, RequestRouter};
pub use core::{Config, Server, ServerState};
pub use shared::{AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and start logging according to the environment
pub fn setup_environment() -> Config {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger_with_file(Some(config.log_json), config.log_dir.as_deref());
    config
}
