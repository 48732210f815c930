//! Persisted configuration: goals, salaries, settings, staff roster and the
//! credential set

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::AppResult;
use shared::models::CredentialSet;

use super::blobs::BlobSheet;
use crate::auth::hash_plain_secrets;

const GOALS_KEY: &str = "goals";
const SALARIES_KEY: &str = "salaries";
const SETTINGS_KEY: &str = "settings";
const STAFF_KEY: &str = "staff";
const PASSWORDS_KEY: &str = "passwords";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalsView {
    pub goals: Value,
    pub salaries: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsView {
    pub settings: Value,
    pub staff: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordsView {
    pub passwords: CredentialSet,
}

/// Absent blobs read as an empty object
fn or_empty(value: Value) -> Value {
    if value.is_null() {
        Value::Object(Map::new())
    } else {
        value
    }
}

#[derive(Clone)]
pub struct SettingsService {
    config: BlobSheet,
    auth: BlobSheet,
}

impl SettingsService {
    pub fn new(config: BlobSheet, auth: BlobSheet) -> Self {
        Self { config, auth }
    }

    pub fn load_goals(&self) -> AppResult<GoalsView> {
        Ok(GoalsView {
            goals: or_empty(self.config.read_json(GOALS_KEY)?),
            salaries: or_empty(self.config.read_json(SALARIES_KEY)?),
        })
    }

    pub fn save_goals(&self, goals: &Value, salaries: &Value) -> AppResult<()> {
        self.config.write_json(GOALS_KEY, goals)?;
        self.config.write_json(SALARIES_KEY, salaries)?;
        tracing::info!("Goals saved");
        Ok(())
    }

    pub fn load_settings(&self) -> AppResult<SettingsView> {
        Ok(SettingsView {
            settings: or_empty(self.config.read_json(SETTINGS_KEY)?),
            staff: or_empty(self.config.read_json(STAFF_KEY)?),
        })
    }

    /// Save settings; the staff roster is only replaced when given
    pub fn save_settings(&self, settings: &Value, staff: Option<&Value>) -> AppResult<()> {
        self.config.write_json(SETTINGS_KEY, settings)?;
        if let Some(staff) = staff {
            self.config.write_json(STAFF_KEY, staff)?;
        }
        tracing::info!(staff_updated = staff.is_some(), "Settings saved");
        Ok(())
    }

    /// Stored credential set, with legacy plain-text secrets upgraded to
    /// hashes (and persisted) on the way out
    pub fn load_credentials(&self) -> AppResult<CredentialSet> {
        let mut credentials: CredentialSet = self.auth.read_json(PASSWORDS_KEY)?;
        if hash_plain_secrets(&mut credentials)? {
            self.auth.write_json(PASSWORDS_KEY, &credentials)?;
            tracing::info!("Upgraded plain-text passwords to hashes");
        }
        Ok(credentials)
    }

    /// Client view of the credential set; no secret ever leaves the server
    pub fn load_passwords(&self) -> AppResult<PasswordsView> {
        Ok(PasswordsView {
            passwords: self.load_credentials()?.redacted(),
        })
    }

    /// Replace the credential set
    ///
    /// Masked slots keep the stored hash, empty slots clear the password and
    /// anything else is hashed before it is written.
    pub fn save_passwords(&self, mut incoming: CredentialSet) -> AppResult<()> {
        let existing = self.load_credentials()?;
        incoming.restore_redacted(&existing);
        hash_plain_secrets(&mut incoming)?;
        self.auth.write_json(PASSWORDS_KEY, &incoming)?;
        tracing::info!("Passwords saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{is_hashed, verify_password};
    use crate::source::{MemorySource, TabularSource};
    use serde_json::json;
    use shared::models::REDACTED;
    use std::sync::Arc;

    fn service() -> (SettingsService, Arc<MemorySource>) {
        let source = Arc::new(MemorySource::new());
        let svc = SettingsService::new(
            BlobSheet::new(source.clone(), "config"),
            BlobSheet::new(source.clone(), "auth"),
        );
        (svc, source)
    }

    #[test]
    fn test_empty_defaults() {
        let (svc, _) = service();
        let goals = svc.load_goals().unwrap();
        assert_eq!(goals.goals, json!({}));
        assert_eq!(goals.salaries, json!({}));
        assert_eq!(svc.load_passwords().unwrap().passwords, CredentialSet::default());
    }

    #[test]
    fn test_save_settings_keeps_staff_when_omitted() {
        let (svc, _) = service();
        svc.save_settings(&json!({"theme": "dark"}), Some(&json!({"chiba": ["yui"]})))
            .unwrap();
        svc.save_settings(&json!({"theme": "light"}), None).unwrap();

        let view = svc.load_settings().unwrap();
        assert_eq!(view.settings, json!({"theme": "light"}));
        assert_eq!(view.staff, json!({"chiba": ["yui"]}));
    }

    #[test]
    fn test_legacy_plain_passwords_upgraded_on_load() {
        let (svc, source) = service();
        source.create_sheet("auth", vec!["key".into(), "value".into()]).unwrap();
        source
            .append_row(
                "auth",
                vec!["passwords".into(), r#"{"admin":"root","stores":{"chiba":"shop"}}"#.into()],
            )
            .unwrap();

        let creds = svc.load_credentials().unwrap();
        assert!(verify_password("root", &creds.admin));

        // Persisted: the sheet no longer holds plain text
        let stored = source.read_all("auth").unwrap()[1][1].to_text();
        assert!(!stored.contains("\"root\""));
        assert!(is_hashed(&creds.stores["chiba"]));
    }

    #[test]
    fn test_save_passwords_round_trip_through_mask() {
        let (svc, _) = service();
        let mut initial = CredentialSet::default();
        initial.admin = "root".into();
        initial.stores.insert("chiba".into(), "shop".into());
        svc.save_passwords(initial).unwrap();

        let mut view = svc.load_passwords().unwrap().passwords;
        assert_eq!(view.admin, REDACTED);
        view.stores.insert("chiba".into(), "new-shop".into());
        svc.save_passwords(view).unwrap();

        let creds = svc.load_credentials().unwrap();
        assert!(verify_password("root", &creds.admin));
        assert!(verify_password("new-shop", &creds.stores["chiba"]));
    }

    #[test]
    fn test_malformed_passwords_blob_is_empty() {
        let (svc, source) = service();
        source.create_sheet("auth", vec!["key".into(), "value".into()]).unwrap();
        source.append_row("auth", vec!["passwords".into(), "[oops".into()]).unwrap();
        assert_eq!(svc.load_credentials().unwrap(), CredentialSet::default());
    }
}
