//! Startup configuration.
//!
//! Everything here is read once when the process starts. The presence of both an API key and a
//! project id selects [`PersistenceMode::RemoteBacked`]; the mode never changes afterwards.

pub mod constants;
pub mod error;

use std::fmt;
use std::time::Duration;

use constants::{
    ENV_API_KEY, ENV_APP_ID, ENV_AUTH_DOMAIN, ENV_FIRESTORE_EMULATOR_HOST,
    ENV_MESSAGING_SENDER_ID, ENV_PROJECT_ID, ENV_SECURITY_PIN, ENV_STORAGE_BUCKET,
    ENV_STORAGE_EMULATOR_HOST, FIRESTORE_COLLECTION, FIRESTORE_DOC_ID, LOCAL_STORAGE_KEY,
    PIN_LENGTH, REMOTE_WATCH_INTERVAL, STORAGE_NAMESPACE, SYNC_INTERVAL, THEME_STORAGE_KEY,
};
pub use error::{ConfigError, ConfigErrorCode, ConfigResult};

/// Connection identifiers of the hosted backend project.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FirebaseOptions {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
}

impl FirebaseOptions {
    /// True when both the API key and the project id are set, which is what remote mode needs.
    pub fn is_configured(&self) -> bool {
        non_empty(self.api_key.as_deref()).is_some()
            && non_empty(self.project_id.as_deref()).is_some()
    }

    pub fn api_key(&self) -> Option<&str> {
        non_empty(self.api_key.as_deref())
    }

    pub fn project_id(&self) -> Option<&str> {
        non_empty(self.project_id.as_deref())
    }

    pub fn storage_bucket(&self) -> Option<&str> {
        non_empty(self.storage_bucket.as_deref())
    }
}

/// Where the aggregate document lives for the lifetime of the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PersistenceMode {
    /// Hosted document database and object store first, local storage as cache and fallback.
    RemoteBacked,
    /// Local key-value storage only; callers poll for external changes.
    LocalOnly,
}

impl PersistenceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersistenceMode::RemoteBacked => "remote-backed",
            PersistenceMode::LocalOnly => "local-only",
        }
    }
}

impl fmt::Display for PersistenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated numeric PIN of exactly [`PIN_LENGTH`] digits.
#[derive(Clone, PartialEq, Eq)]
pub struct SecurityPin(String);

impl SecurityPin {
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        let trimmed = raw.trim();
        if trimmed.len() != PIN_LENGTH || !trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(error::invalid_security_pin(format!(
                "security PIN must be exactly {PIN_LENGTH} digits"
            )));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl fmt::Debug for SecurityPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecurityPin(****)")
    }
}

/// Coordinates of the shared remote document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentLocation {
    pub collection: String,
    pub document_id: String,
}

impl Default for DocumentLocation {
    fn default() -> Self {
        Self {
            collection: FIRESTORE_COLLECTION.to_owned(),
            document_id: FIRESTORE_DOC_ID.to_owned(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StudyMateConfig {
    pub firebase: FirebaseOptions,
    pub security_pin: Option<SecurityPin>,
    pub document: DocumentLocation,
    pub local_storage_key: String,
    pub theme_storage_key: String,
    pub storage_namespace: String,
    pub sync_interval: Duration,
    pub remote_watch_interval: Duration,
    pub firestore_emulator_host: Option<String>,
    pub storage_emulator_host: Option<String>,
}

impl Default for StudyMateConfig {
    fn default() -> Self {
        Self {
            firebase: FirebaseOptions::default(),
            security_pin: None,
            document: DocumentLocation::default(),
            local_storage_key: LOCAL_STORAGE_KEY.to_owned(),
            theme_storage_key: THEME_STORAGE_KEY.to_owned(),
            storage_namespace: STORAGE_NAMESPACE.to_owned(),
            sync_interval: SYNC_INTERVAL,
            remote_watch_interval: REMOTE_WATCH_INTERVAL,
            firestore_emulator_host: None,
            storage_emulator_host: None,
        }
    }
}

impl StudyMateConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, treating empty values as absent.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let firebase = FirebaseOptions {
            api_key: read(ENV_API_KEY),
            auth_domain: read(ENV_AUTH_DOMAIN),
            project_id: read(ENV_PROJECT_ID),
            storage_bucket: read(ENV_STORAGE_BUCKET),
            messaging_sender_id: read(ENV_MESSAGING_SENDER_ID),
            app_id: read(ENV_APP_ID),
        };
        let security_pin = read(ENV_SECURITY_PIN)
            .map(|raw| SecurityPin::parse(&raw))
            .transpose()?;

        Ok(Self {
            firebase,
            security_pin,
            firestore_emulator_host: read(ENV_FIRESTORE_EMULATOR_HOST),
            storage_emulator_host: read(ENV_STORAGE_EMULATOR_HOST),
            ..Self::default()
        })
    }

    pub fn with_firebase(mut self, firebase: FirebaseOptions) -> Self {
        self.firebase = firebase;
        self
    }

    pub fn with_security_pin(mut self, pin: Option<SecurityPin>) -> Self {
        self.security_pin = pin;
        self
    }

    pub fn with_sync_interval(mut self, interval: Duration) -> ConfigResult<Self> {
        if interval.is_zero() {
            return Err(error::invalid_value("sync interval must be greater than zero"));
        }
        self.sync_interval = interval;
        Ok(self)
    }

    pub fn with_remote_watch_interval(mut self, interval: Duration) -> ConfigResult<Self> {
        if interval.is_zero() {
            return Err(error::invalid_value(
                "remote watch interval must be greater than zero",
            ));
        }
        self.remote_watch_interval = interval;
        Ok(self)
    }

    pub fn persistence_mode(&self) -> PersistenceMode {
        if self.firebase.is_configured() {
            PersistenceMode::RemoteBacked
        } else {
            PersistenceMode::LocalOnly
        }
    }

    pub fn is_pin_configured(&self) -> bool {
        self.security_pin.is_some()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn key_and_project_select_remote_mode() {
        let config = StudyMateConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "api-key"),
            (ENV_PROJECT_ID, "study-project"),
            (ENV_STORAGE_BUCKET, "study-project.appspot.com"),
        ]))
        .unwrap();

        assert_eq!(config.persistence_mode(), PersistenceMode::RemoteBacked);
        assert_eq!(config.firebase.storage_bucket(), Some("study-project.appspot.com"));
        assert!(!config.is_pin_configured());
    }

    #[test]
    fn empty_values_fall_back_to_local_mode() {
        let config = StudyMateConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, ""),
            (ENV_PROJECT_ID, "study-project"),
        ]))
        .unwrap();

        assert_eq!(config.persistence_mode(), PersistenceMode::LocalOnly);
        assert_eq!(config.firebase.api_key, None);
    }

    #[test]
    fn project_without_key_is_local_only() {
        let config =
            StudyMateConfig::from_lookup(lookup_from(&[(ENV_PROJECT_ID, "p")])).unwrap();
        assert_eq!(config.persistence_mode(), PersistenceMode::LocalOnly);
    }

    #[test]
    fn security_pin_must_have_four_digits() {
        let config =
            StudyMateConfig::from_lookup(lookup_from(&[(ENV_SECURITY_PIN, "1234")])).unwrap();
        assert!(config.security_pin.as_ref().unwrap().matches("1234"));

        let err = StudyMateConfig::from_lookup(lookup_from(&[(ENV_SECURITY_PIN, "12a4")]))
            .unwrap_err();
        assert_eq!(err.code, ConfigErrorCode::InvalidSecurityPin);
        assert!(SecurityPin::parse("12345").is_err());
    }

    #[test]
    fn pin_debug_output_is_redacted() {
        let pin = SecurityPin::parse("9876").unwrap();
        assert_eq!(format!("{pin:?}"), "SecurityPin(****)");
    }

    #[test]
    fn defaults_match_shared_document_coordinates() {
        let config = StudyMateConfig::default();
        assert_eq!(config.document.collection, "studymate");
        assert_eq!(config.document.document_id, "shared_data");
        assert_eq!(config.local_storage_key, "studymate_shared_data");
        assert_eq!(config.sync_interval, Duration::from_millis(3000));
        assert!(config.with_sync_interval(Duration::ZERO).is_err());
    }
}
