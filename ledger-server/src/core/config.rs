use std::path::PathBuf;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_PORT | 3000 | HTTP port |
/// | WORK_DIR | ./data | Working directory |
/// | WORKBOOK_PATH | {WORK_DIR}/workbook.json | Workbook file |
/// | STATE_DB_PATH | {WORK_DIR}/state.redb | Cache and session database |
/// | SCHEMA_PATH | (built-in schema) | Schema JSON file |
/// | SESSION_TTL_HOURS | 24 | Session validity window, at most one year |
/// | CACHE_MAX_PAYLOAD_CHARS | 100000 | Largest cacheable payload |
/// | REQUIRE_WRITE_SESSION | false | Demand a session token on writes |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_DIR | (stdout) | Daily rolling log directory |
/// | LOG_JSON | false | JSON log lines |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/srv/ledger HTTP_PORT=8080 cargo run -p ledger-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub workbook_path: String,
    pub state_db_path: String,
    pub schema_path: Option<String>,
    pub session_ttl_hours: u64,
    pub cache_max_payload_chars: usize,
    pub require_write_session: bool,
    /// development | staging | production
    pub environment: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Longest session validity window accepted from the environment
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 366;

fn in_work_dir(work_dir: &str, file: &str) -> String {
    PathBuf::from(work_dir).join(file).to_string_lossy().into_owned()
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let work_dir = env_opt("WORK_DIR").unwrap_or_else(|| "./data".into());
        Self {
            http_port: env_parse("HTTP_PORT", 3000),
            workbook_path: env_opt("WORKBOOK_PATH")
                .unwrap_or_else(|| in_work_dir(&work_dir, "workbook.json")),
            state_db_path: env_opt("STATE_DB_PATH")
                .unwrap_or_else(|| in_work_dir(&work_dir, "state.redb")),
            schema_path: env_opt("SCHEMA_PATH"),
            session_ttl_hours: env_parse("SESSION_TTL_HOURS", 24_u64).min(MAX_SESSION_TTL_HOURS),
            cache_max_payload_chars: env_parse("CACHE_MAX_PAYLOAD_CHARS", 100_000),
            require_write_session: env_parse("REQUIRE_WRITE_SESSION", false),
            environment: env_opt("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            log_dir: env_opt("LOG_DIR"),
            log_json: env_parse("LOG_JSON", false),
            work_dir,
        }
    }

    /// Environment config rooted at another working directory
    ///
    /// Mostly for tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.workbook_path = in_work_dir(&config.work_dir, "workbook.json");
        config.state_db_path = in_work_dir(&config.work_dir, "state.redb");
        config
    }

    pub fn session_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_ttl_hours.saturating_mul(60 * 60))
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
