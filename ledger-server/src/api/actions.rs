//! Action catalogue and request parsing

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shared::models::Role;
use shared::{AppError, AppResult, ErrorCode};
use std::collections::HashMap;

use crate::cache::CacheKey;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadAction {
    #[default]
    ListSales,
    ListCustomers,
    ListCustomersForToday,
    ListCustomersByStore,
    LoadGoals,
    LoadPasswords,
    LoadSettings,
    VerifyPassword,
    VerifySession,
    GetAll,
}

impl ReadAction {
    /// Unknown or missing names fall back to the sales listing
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "list-customers" => Self::ListCustomers,
            "list-customers-for-today" => Self::ListCustomersForToday,
            "list-customers-by-store" => Self::ListCustomersByStore,
            "load-goals" => Self::LoadGoals,
            "load-passwords" => Self::LoadPasswords,
            "load-settings" => Self::LoadSettings,
            "verify-password" => Self::VerifyPassword,
            "verify-session" => Self::VerifySession,
            "get-all" => Self::GetAll,
            _ => Self::ListSales,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListSales => "list-sales",
            Self::ListCustomers => "list-customers",
            Self::ListCustomersForToday => "list-customers-for-today",
            Self::ListCustomersByStore => "list-customers-by-store",
            Self::LoadGoals => "load-goals",
            Self::LoadPasswords => "load-passwords",
            Self::LoadSettings => "load-settings",
            Self::VerifyPassword => "verify-password",
            Self::VerifySession => "verify-session",
            Self::GetAll => "get-all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    UpdateSalesRows,
    SaveGoals,
    AddSalesRecord,
    SavePasswords,
    SaveSettings,
    ClearCache,
    Logout,
}

impl WriteAction {
    pub fn parse(name: &str) -> AppResult<Self> {
        Ok(match name.trim() {
            "update-sales-rows" => Self::UpdateSalesRows,
            "save-goals" => Self::SaveGoals,
            "add-sales-record" => Self::AddSalesRecord,
            "save-passwords" => Self::SavePasswords,
            "save-settings" => Self::SaveSettings,
            "clear-cache" => Self::ClearCache,
            "logout" => Self::Logout,
            other => return Err(AppError::unrecognized_action(other)),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpdateSalesRows => "update-sales-rows",
            Self::SaveGoals => "save-goals",
            Self::AddSalesRecord => "add-sales-record",
            Self::SavePasswords => "save-passwords",
            Self::SaveSettings => "save-settings",
            Self::ClearCache => "clear-cache",
            Self::Logout => "logout",
        }
    }

    /// Cache entries that may hold data derived from what this action mutates
    pub fn invalidates(&self) -> Vec<CacheKey> {
        match self {
            Self::UpdateSalesRows | Self::AddSalesRecord => vec![CacheKey::Sales, CacheKey::All],
            Self::SaveGoals => vec![CacheKey::Goals, CacheKey::All],
            Self::SaveSettings => vec![CacheKey::Settings, CacheKey::All],
            Self::SavePasswords => vec![CacheKey::Passwords],
            Self::ClearCache | Self::Logout => Vec::new(),
        }
    }

    /// Session role needed when write sessions are enforced
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Self::UpdateSalesRows | Self::AddSalesRecord => Some(Role::Staff),
            Self::SaveGoals | Self::SavePasswords | Self::SaveSettings | Self::ClearCache => {
                Some(Role::Admin)
            }
            Self::Logout => None,
        }
    }
}

/// Query parameters of a read request
#[derive(Debug, Clone, Default)]
pub struct ReadRequest {
    pub action: ReadAction,
    pub store: String,
    pub staff: String,
    pub page_type: String,
    pub password: String,
    pub token: String,
    pub nocache: bool,
}

impl ReadRequest {
    pub fn from_params(mut params: HashMap<String, String>) -> Self {
        let mut take = |key: &str| params.remove(key).unwrap_or_default();
        let action = ReadAction::parse(&take("action"));
        let nocache = matches!(take("nocache").trim().to_lowercase().as_str(), "true" | "1");
        Self {
            action,
            store: take("store"),
            staff: take("staff"),
            page_type: take("pageType"),
            password: take("password"),
            token: take("token"),
            nocache,
        }
    }
}

/// Parsed write body: the action plus the rest of the JSON object
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub action: WriteAction,
    fields: Map<String, Value>,
}

impl WriteRequest {
    pub fn parse(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::with_message(ErrorCode::InvalidRequest, "Empty request body"));
        }
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidFormat, format!("Malformed JSON body: {e}"))
        })?;
        let Value::Object(mut fields) = value else {
            return Err(AppError::with_message(
                ErrorCode::InvalidFormat,
                "Request body must be a JSON object",
            ));
        };

        let action = match fields.remove("action") {
            Some(Value::String(name)) => WriteAction::parse(&name)?,
            _ => {
                return Err(AppError::with_message(
                    ErrorCode::RequiredField,
                    "action is required",
                ));
            }
        };
        Ok(Self { action, fields })
    }

    /// Required field decoded as `T`
    pub fn field<T: DeserializeOwned>(&self, name: &str) -> AppResult<T> {
        let value = self.fields.get(name).cloned().ok_or_else(|| {
            AppError::with_message(ErrorCode::RequiredField, format!("{name} is required"))
        })?;
        Self::decode(name, value)
    }

    /// Optional field; `null` counts as absent
    pub fn optional<T: DeserializeOwned>(&self, name: &str) -> AppResult<Option<T>> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Self::decode(name, value.clone()).map(Some),
        }
    }

    fn decode<T: DeserializeOwned>(name: &str, value: Value) -> AppResult<T> {
        serde_json::from_value(value).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid {name}: {e}"))
                .with_detail("field", name)
        })
    }

    pub fn token(&self) -> Option<String> {
        self.fields
            .get("token")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}
