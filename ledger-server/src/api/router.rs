//! Request routing
//!
//! Reads go through the cache; writes run the mutation and then invalidate
//! every cache key the mutation could have made stale. Nothing here knows
//! about HTTP: the handlers hand over parsed requests and get an [`Outcome`].

use serde_json::{Value, json};
use shared::models::{CredentialSet, Role, SalesRecordInput, Session};
use shared::{AppError, AppResult, ErrorCode};
use std::sync::Arc;

use super::actions::{ReadAction, ReadRequest, WriteAction, WriteRequest};
use super::envelope::Outcome;
use crate::auth::{self, LoginScope, SessionStore};
use crate::cache::{Cache, CacheKey};
use crate::ingest::Schema;
use crate::services::{CustomerService, SalesService, SettingsService};
use crate::utils::Clock;
use crate::utils::time::local_ymd;

#[derive(Debug, Clone, Copy, Default)]
pub struct RouterOptions {
    /// Require a live session token on mutating write actions
    pub require_write_session: bool,
}

#[derive(Clone)]
pub struct RequestRouter {
    pub sales: SalesService,
    pub customers: CustomerService,
    pub settings: SettingsService,
    pub cache: Cache,
    pub sessions: SessionStore,
    pub schema: Arc<Schema>,
    pub clock: Arc<dyn Clock>,
    pub options: RouterOptions,
}

fn session_payload(session: &Session) -> Value {
    json!({
        "token": session.token,
        "expiresAt": session.expires_at,
        "role": session.role,
        "store": session.store,
        "staff": session.staff,
    })
}

impl RequestRouter {
    pub fn read(&self, request: &ReadRequest) -> Outcome {
        tracing::debug!(action = request.action.as_str(), nocache = request.nocache, "Read");
        Outcome::from_result(self.dispatch_read(request))
    }

    pub fn write(&self, request: &WriteRequest) -> Outcome {
        let action = request.action;
        let result = self.dispatch_write(request);
        if result.is_ok() {
            tracing::info!(action = action.as_str(), "Write completed");
        }
        Outcome::from_result(result)
    }

    /// Parse and run a raw write body
    pub fn write_raw(&self, body: &[u8]) -> Outcome {
        match WriteRequest::parse(body) {
            Ok(request) => self.write(&request),
            Err(err) => Outcome::from_error(err),
        }
    }

    fn dispatch_read(&self, req: &ReadRequest) -> AppResult<Value> {
        let bypass = req.nocache;
        let value = match req.action {
            ReadAction::ListSales => {
                let entries = self.cache.cached(&CacheKey::Sales, bypass, || self.sales.list())?;
                serde_json::to_value(entries)?
            }
            ReadAction::ListCustomers => {
                let entries = self
                    .cache
                    .cached(&CacheKey::Customers, bypass, || self.customers.list_all())?;
                serde_json::to_value(entries)?
            }
            ReadAction::ListCustomersByStore => {
                let store = self.customers.canonical_store(&req.store);
                if store.is_empty() {
                    return Err(AppError::with_message(ErrorCode::RequiredField, "store is required"));
                }
                let key = CacheKey::CustomersByStore(store.clone());
                let entries = self
                    .cache
                    .cached(&key, bypass, || self.customers.list_by_store(&store))?;
                serde_json::to_value(entries)?
            }
            ReadAction::ListCustomersForToday => {
                let today = local_ymd(self.clock.now(), self.schema.time_zone);
                let key = CacheKey::CustomersToday(today.clone());
                let entries = self
                    .cache
                    .cached(&key, bypass, || self.customers.list_for_day(&today))?;
                serde_json::to_value(entries)?
            }
            ReadAction::LoadGoals => {
                let view = self.cache.cached(&CacheKey::Goals, bypass, || self.settings.load_goals())?;
                serde_json::to_value(view)?
            }
            ReadAction::LoadSettings => {
                let view = self
                    .cache
                    .cached(&CacheKey::Settings, bypass, || self.settings.load_settings())?;
                serde_json::to_value(view)?
            }
            ReadAction::LoadPasswords => {
                let view = self
                    .cache
                    .cached(&CacheKey::Passwords, bypass, || self.settings.load_passwords())?;
                serde_json::to_value(view)?
            }
            ReadAction::GetAll => self.cache.cached(&CacheKey::All, bypass, || self.load_all())?,
            ReadAction::VerifyPassword => self.verify_password(req)?,
            ReadAction::VerifySession => {
                let role = Self::page_role(&req.page_type)?;
                let session = self.sessions.verify(&req.token, role)?;
                let mut payload = session_payload(&session);
                payload["valid"] = Value::Bool(true);
                payload
            }
        };
        Ok(value)
    }

    fn page_role(page_type: &str) -> AppResult<Role> {
        Role::from_page_type(page_type).ok_or_else(|| {
            AppError::with_message(
                ErrorCode::UnknownPageType,
                format!("Unknown page type: {page_type}"),
            )
        })
    }

    fn verify_password(&self, req: &ReadRequest) -> AppResult<Value> {
        let role = Self::page_role(&req.page_type)?;
        let scope = LoginScope {
            store: self.customers.canonical_store(&req.store),
            staff: req.staff.trim().to_lowercase(),
        };
        let credentials = self.settings.load_credentials()?;
        let session =
            auth::verify_password(&credentials, &self.sessions, role, &scope, &req.password)?;
        Ok(session_payload(&session))
    }

    fn load_all(&self) -> AppResult<Value> {
        let sales = self.sales.list()?;
        let goals = self.settings.load_goals()?;
        let settings = self.settings.load_settings()?;
        Ok(json!({
            "sales": sales,
            "goals": goals.goals,
            "salaries": goals.salaries,
            "settings": settings.settings,
            "staff": settings.staff,
        }))
    }

    fn dispatch_write(&self, req: &WriteRequest) -> AppResult<Value> {
        let action = req.action;
        if self.options.require_write_session
            && let Some(role) = action.required_role()
        {
            let token = req.token().unwrap_or_default();
            self.sessions.verify(&token, role)?;
        }

        let result = self.mutate(action, req);

        // A failed mutation may still have written part way
        self.cache
            .invalidate_all(action.invalidates().iter().map(CacheKey::key));
        result
    }

    fn mutate(&self, action: WriteAction, req: &WriteRequest) -> AppResult<Value> {
        let payload = match action {
            WriteAction::UpdateSalesRows => {
                let rows: Vec<SalesRecordInput> = req.field("rows")?;
                serde_json::to_value(self.sales.update_rows(&rows)?)?
            }
            WriteAction::AddSalesRecord => {
                let record: SalesRecordInput = req.field("record")?;
                json!({ "id": self.sales.add_record(&record)? })
            }
            WriteAction::SaveGoals => {
                let goals: Value = req.field("goals")?;
                let salaries: Value = req.optional("salaries")?.unwrap_or_else(|| json!({}));
                self.settings.save_goals(&goals, &salaries)?;
                json!({})
            }
            WriteAction::SaveSettings => {
                let settings: Value = req.field("settings")?;
                let staff: Option<Value> = req.optional("staff")?;
                self.settings.save_settings(&settings, staff.as_ref())?;
                json!({})
            }
            WriteAction::SavePasswords => {
                let passwords: CredentialSet = req.field("passwords")?;
                self.settings.save_passwords(passwords)?;
                json!({})
            }
            WriteAction::ClearCache => {
                let cleared = self.cache.clear();
                tracing::info!(cleared, "Cache cleared");
                json!({ "cleared": cleared })
            }
            WriteAction::Logout => {
                let token: String = req.field("token")?;
                json!({ "revoked": self.sessions.revoke(&token)? })
            }
        };
        Ok(payload)
    }
}
