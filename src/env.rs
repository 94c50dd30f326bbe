//! Environment variable lookup for the fallback layer of the store.
//!
//! Setting names map to environment variables by uppercasing and prepending
//! the `CONJUR_` namespace prefix:
//!
//! | Setting | Env var |
//! |---------|---------|
//! | `url` | `CONJUR_URL` |
//! | `account` | `CONJUR_ACCOUNT` |
//! | `cert_file` | `CONJUR_CERT_FILE` |
//!
//! Reads go through the [`EnvReader`] trait so tests can substitute synthetic
//! variables instead of touching the real process environment.

/// Namespace prefix for all environment-variable lookups.
pub const ENV_PREFIX: &str = "CONJUR_";

/// Map a setting name to its environment-variable counterpart.
pub fn env_key(key: &str) -> String {
    format!("{ENV_PREFIX}{}", key.to_uppercase())
}

/// Read-only access to environment variables.
///
/// Implemented for any `Fn(&str) -> Option<String>`, so a test can pass a
/// closure over a fixed map. The store never writes environment variables.
pub trait EnvReader: Send {
    fn var(&self, name: &str) -> Option<String>;
}

impl<F> EnvReader for F
where
    F: Fn(&str) -> Option<String> + Send,
{
    fn var(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvReader for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}
