//! Server state
//!
//! Cloned into every handler. All fields are cheap `Arc` clones.

use std::sync::Arc;
use std::time::Duration;

use crate::api::{RequestRouter, RouterOptions};
use crate::auth::SessionStore;
use crate::cache::Cache;
use crate::core::{Config, Result, ServerError};
use crate::ingest::Schema;
use crate::kv::{KvStore, RedbKv};
use crate::services::{BlobSheet, CustomerService, SalesService, SettingsService};
use crate::source::{TabularSource, WorkbookFile};
use crate::utils::{Clock, SystemClock};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub router: Arc<RequestRouter>,
}

impl ServerState {
    /// Open the workbook, state database and schema named by `config`
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let schema = match &config.schema_path {
            Some(path) => Schema::load(path).map_err(ServerError::Schema)?,
            None => Schema::default(),
        };
        let source: Arc<dyn TabularSource> = Arc::new(WorkbookFile::open(&config.workbook_path)?);
        let kv: Arc<dyn KvStore> = Arc::new(RedbKv::open(&config.state_db_path)?);

        tracing::info!(
            workbook = %config.workbook_path,
            state_db = %config.state_db_path,
            schema = config.schema_path.as_deref().unwrap_or("built-in"),
            "Server state initialized"
        );
        Ok(Self::from_parts(
            config.clone(),
            source,
            kv,
            schema,
            Arc::new(SystemClock),
        ))
    }

    /// Assemble state from already-open collaborators
    pub fn from_parts(
        config: Config,
        source: Arc<dyn TabularSource>,
        kv: Arc<dyn KvStore>,
        schema: Schema,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let schema = Arc::new(schema);
        let settings = SettingsService::new(
            BlobSheet::new(source.clone(), schema.config_sheet.clone()),
            BlobSheet::new(source.clone(), schema.auth_sheet.clone()),
        );

        let router = RequestRouter {
            sales: SalesService::new(source.clone(), schema.clone()),
            customers: CustomerService::new(source, schema.clone()),
            settings,
            cache: Cache::new(kv.clone(), clock.clone(), config.cache_max_payload_chars),
            sessions: SessionStore::new(kv, clock.clone(), config.session_ttl()),
            schema,
            clock,
            options: RouterOptions {
                require_write_session: config.require_write_session,
            },
        };

        Self {
            config,
            router: Arc::new(router),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.router.sessions
    }

    /// Periodic session purge
    pub fn start_background_tasks(&self) {
        let sessions = self.sessions().clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
            loop {
                interval.tick().await;
                let sessions = sessions.clone();
                match tokio::task::spawn_blocking(move || sessions.purge_expired()).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => tracing::warn!(error = %e, "Session purge failed"),
                    Err(e) => tracing::error!("spawn_blocking join error: {e}"),
                }
            }
        });
    }
}
