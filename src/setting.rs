//! Declarative setting descriptors and the typed accessors built on them.
//!
//! Each first-class setting is described once, as a [`Setting`] in the
//! [`SETTINGS`] table: its name, its default (or lack of one), and its doc
//! string. A descriptor is a pure name/default binder over the generic
//! [`Config::get`]/[`Config::set`] surface; it performs no coercion of its
//! own. The typed accessors on [`Config`] delegate through the table and do
//! the fallible value conversion at the boundary.
//!
//! Three settings are declared:
//!
//! - `cert_file` — optional, defaults to absent. Path to a PEM certificate
//!   used to verify TLS connections to the appliance; required in practice
//!   when the appliance serves a self-signed certificate.
//! - `account` — the organizational account identifier, defaults to
//!   `"conjur"`.
//! - `url` — the appliance endpoint. No default: unresolved reads fail with
//!   [`ConfigError::RequiredSetting`].

use std::path::PathBuf;

use serde_yaml::Value;

use crate::error::ConfigError;
use crate::store::Config;

/// A named, optionally-defaulted setting bound at the type level.
///
/// Reading delegates to [`Config::get`] with this descriptor's default;
/// writing delegates to [`Config::set`]. The `doc` string is informational
/// only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    pub name: &'static str,
    pub default: SettingDefault,
    pub doc: &'static str,
}

/// A setting's default, const-constructible for the descriptor table.
///
/// `Required` and `Null` are deliberately distinct: `cert_file`'s legitimate
/// default IS absent, while `url` has no default at all. Conflating the two
/// would break the required-vs-optional distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingDefault {
    /// No default; an unresolved read is an error.
    Required,
    /// Defaults to an absent value.
    Null,
    /// Defaults to a literal string.
    Str(&'static str),
}

impl Setting {
    /// The default as the sentinel form [`Config::get`] expects:
    /// `None` for required, `Some(..)` otherwise.
    pub fn default_value(&self) -> Option<Value> {
        match self.default {
            SettingDefault::Required => None,
            SettingDefault::Null => Some(Value::Null),
            SettingDefault::Str(s) => Some(Value::String(s.to_string())),
        }
    }

    /// Resolve this setting on `store` through the layered lookup.
    pub fn get(&self, store: &mut Config) -> Result<Value, ConfigError> {
        store.get(self.name, self.default_value())
    }

    /// Write this setting on `store`.
    pub fn set(&self, store: &mut Config, value: impl Into<Value>) {
        store.set(self.name, value);
    }
}

/// Path to a certificate used to verify TLS requests to the appliance.
pub const CERT_FILE: Setting = Setting {
    name: "cert_file",
    default: SettingDefault::Null,
    doc: "Path to certificate to verify ssl requests to appliance",
};

/// Conjur account identifier.
pub const ACCOUNT: Setting = Setting {
    name: "account",
    default: SettingDefault::Str("conjur"),
    doc: "Conjur account identifier",
};

/// Appliance endpoint URL.
pub const URL: Setting = Setting {
    name: "url",
    default: SettingDefault::Required,
    doc: "URL for the Conjur appliance",
};

/// All declared settings. This table is the single registry of first-class
/// accessors; there is no reflection anywhere.
pub const SETTINGS: &[&Setting] = &[&CERT_FILE, &ACCOUNT, &URL];

/// The TLS verification argument derived from `cert_file`, in the shape an
/// HTTP client's `verify` knob consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsVerify {
    /// Verify against the standard system trust store.
    SystemRoots,
    /// Verify against the certificate at this path.
    CertFile(PathBuf),
}

/// Typed accessors over the [`SETTINGS`] table.
///
/// Each getter resolves through the full layered lookup and converts the
/// dynamically-typed stored value at the boundary, failing with
/// [`ConfigError::UnexpectedType`] when a file supplied something else for
/// the key.
impl Config {
    /// Path to the certificate used to verify TLS requests, if configured.
    pub fn cert_file(&mut self) -> Result<Option<PathBuf>, ConfigError> {
        match CERT_FILE.get(self)? {
            Value::Null => Ok(None),
            Value::String(path) => Ok(Some(PathBuf::from(path))),
            other => Err(unexpected(CERT_FILE.name, "string or null", &other)),
        }
    }

    /// Set the certificate path.
    ///
    /// Takes a string rather than a `PathBuf`: stored values are YAML
    /// scalars, so a non-UTF-8 path cannot be represented. Callers holding a
    /// `Path` convert it explicitly and own the choice of how.
    pub fn set_cert_file(&mut self, path: impl Into<String>) {
        CERT_FILE.set(self, path.into());
    }

    /// The organizational account identifier (default `"conjur"`).
    pub fn account(&mut self) -> Result<String, ConfigError> {
        match ACCOUNT.get(self)? {
            Value::String(account) => Ok(account),
            other => Err(unexpected(ACCOUNT.name, "string", &other)),
        }
    }

    pub fn set_account(&mut self, account: impl Into<String>) {
        ACCOUNT.set(self, account.into());
    }

    /// The appliance endpoint URL. Required: errors if unresolved from every
    /// layer.
    pub fn url(&mut self) -> Result<String, ConfigError> {
        match URL.get(self)? {
            Value::String(url) => Ok(url),
            other => Err(unexpected(URL.name, "string", &other)),
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        URL.set(self, url.into());
    }

    /// The TLS verification argument derived from `cert_file`.
    ///
    /// Recomputed on every access; the only caching involved is the layered
    /// lookup's own environment memoization.
    pub fn verify(&mut self) -> Result<TlsVerify, ConfigError> {
        Ok(match self.cert_file()? {
            Some(path) => TlsVerify::CertFile(path),
            None => TlsVerify::SystemRoots,
        })
    }
}

fn unexpected(key: &str, expected: &'static str, found: &Value) -> ConfigError {
    ConfigError::UnexpectedType {
        key: key.to_string(),
        expected,
        found: value_type(found),
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A store that never consults the environment (every variable is unset).
    fn config() -> Config {
        Config::with_env(|_: &str| -> Option<String> { None })
    }

    fn config_with_env(vars: &[(&str, &str)]) -> Config {
        let vars: std::collections::HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::with_env(move |name: &str| vars.get(name).cloned())
    }

    #[test]
    fn settings_table_lists_all_three() {
        let names: Vec<&str> = SETTINGS.iter().map(|s| s.name).collect();
        assert_eq!(names, ["cert_file", "account", "url"]);
    }

    #[test]
    fn descriptor_get_applies_default() {
        let mut config = config();
        assert_eq!(
            ACCOUNT.get(&mut config).unwrap(),
            Value::String("conjur".into())
        );
        assert_eq!(CERT_FILE.get(&mut config).unwrap(), Value::Null);
    }

    #[test]
    fn descriptor_set_writes_through() {
        let mut config = config();
        URL.set(&mut config, "https://conjur.example");
        assert_eq!(
            config.entry("url"),
            Some(&Value::String("https://conjur.example".into()))
        );
    }

    #[test]
    fn account_defaults_to_conjur() {
        assert_eq!(config().account().unwrap(), "conjur");
    }

    #[test]
    fn account_from_file_overrides_default() {
        let mut config = config();
        config.load_from("account: acme\n".as_bytes()).unwrap();
        assert_eq!(config.account().unwrap(), "acme");
    }

    #[test]
    fn url_is_required() {
        let err = config().url().unwrap_err();
        assert!(matches!(err, ConfigError::RequiredSetting(ref key) if key == "url"));
    }

    #[test]
    fn url_resolves_from_environment() {
        let mut config = config_with_env(&[("CONJUR_URL", "https://conjur.example")]);
        assert_eq!(config.url().unwrap(), "https://conjur.example");
    }

    #[test]
    fn cert_file_defaults_to_none() {
        assert_eq!(config().cert_file().unwrap(), None);
    }

    #[test]
    fn cert_file_setter_and_getter() {
        let mut config = config();
        config.set_cert_file("/etc/certs/ca.pem");
        assert_eq!(
            config.cert_file().unwrap(),
            Some(PathBuf::from("/etc/certs/ca.pem"))
        );
    }

    #[test]
    fn cert_file_setter_stores_string_verbatim() {
        let mut config = config();
        config.set_cert_file(String::from("/etc/certs/självsignerad.pem"));
        assert_eq!(
            config.entry("cert_file"),
            Some(&Value::String("/etc/certs/självsignerad.pem".into()))
        );
        assert_eq!(
            config.cert_file().unwrap(),
            Some(PathBuf::from("/etc/certs/självsignerad.pem"))
        );
    }

    #[test]
    fn typed_accessor_rejects_wrong_type() {
        let mut config = config();
        config.load_from("account: [not, a, string]\n".as_bytes()).unwrap();
        let err = config.account().unwrap_err();
        match err {
            ConfigError::UnexpectedType { key, expected, found } => {
                assert_eq!(key, "account");
                assert_eq!(expected, "string");
                assert_eq!(found, "sequence");
            }
            other => panic!("expected UnexpectedType, got {other:?}"),
        }
    }

    #[test]
    fn verify_is_system_roots_when_cert_file_unset() {
        assert_eq!(config().verify().unwrap(), TlsVerify::SystemRoots);
    }

    #[test]
    fn verify_is_cert_path_when_set() {
        let mut config = config();
        config.set_cert_file("/etc/certs/ca.pem");
        assert_eq!(
            config.verify().unwrap(),
            TlsVerify::CertFile(PathBuf::from("/etc/certs/ca.pem"))
        );
    }

    #[test]
    fn verify_tracks_cert_file_changes() {
        let mut config = config();
        config.set_cert_file("/tmp/a.pem");
        assert_eq!(
            config.verify().unwrap(),
            TlsVerify::CertFile(PathBuf::from("/tmp/a.pem"))
        );
        config.set("cert_file", Value::Null);
        assert_eq!(config.verify().unwrap(), TlsVerify::SystemRoots);
    }

    #[test]
    fn explicit_null_cert_file_from_file_is_none() {
        let mut config = config();
        config.load_from("cert_file: null\n".as_bytes()).unwrap();
        assert_eq!(config.cert_file().unwrap(), None);
        assert_eq!(config.verify().unwrap(), TlsVerify::SystemRoots);
    }
}
