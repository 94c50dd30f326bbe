//! Connection settings for a Conjur appliance, resolved through layered
//! lookup. Set values in code, load them from YAML, or let them fall back to
//! `CONJUR_*` environment variables.
//!
//! The three first-class settings:
//!
//! - **`url`** points the client at your Conjur instance. Required — reading
//!   it with no value configured anywhere is an error.
//! - **`account`** is the organizational account name. Defaults to
//!   `"conjur"`.
//! - **`cert_file`** is the path to a PEM certificate used to make a secure
//!   connection to the appliance. Needed when the appliance serves a
//!   self-signed certificate; absent by default.
//!
//! ```ignore
//! use conjur_config::Config;
//!
//! let mut config = Config::new();
//! config.load("/etc/conjur.yml")?;
//! let url = config.url()?;
//! let verify = config.verify()?;
//! ```
//!
//! # Layer precedence
//!
//! ```text
//! Defaults              from the setting descriptor table
//!        ↑ overridden by
//! Environment vars      CONJUR_URL, CONJUR_ACCOUNT, CONJUR_CERT_FILE
//!        ↑ overridden by
//! In-memory values      set() / update() / load()
//! ```
//!
//! Every layer is sparse — a loaded file only needs the keys it overrides.
//! The first environment read of a key is cached into the in-memory mapping,
//! so the environment is consulted at most once per key (see
//! [`Config::get`]).
//!
//! # Environment variables
//!
//! | Setting | Env var |
//! |---------|---------|
//! | `url` | `CONJUR_URL` |
//! | `account` | `CONJUR_ACCOUNT` |
//! | `cert_file` | `CONJUR_CERT_FILE` |
//!
//! # The default store
//!
//! [`default_store`] hands out a process-wide [`Config`] behind a `Mutex`,
//! for API clients constructed without an explicit store. A [`Config`] itself
//! carries no internal synchronization; share one across threads only behind
//! a lock like this one, or keep one store per thread.
//!
//! # Error handling
//!
//! All fallible operations return [`ConfigError`]. Nothing is retried,
//! recovered, or logged internally — a missing required setting, an
//! unreadable path, and a malformed file all surface directly to the caller.

use std::sync::{Mutex, OnceLock};

pub mod env;
pub mod error;
pub mod setting;

mod store;

pub use env::{EnvReader, ProcessEnv};
pub use error::ConfigError;
pub use serde_yaml::Value;
pub use setting::{ACCOUNT, CERT_FILE, SETTINGS, Setting, SettingDefault, TlsVerify, URL};
pub use store::Config;

static DEFAULT_STORE: OnceLock<Mutex<Config>> = OnceLock::new();

/// The process-wide default configuration store.
///
/// Constructed empty on first access and shared for the life of the process.
/// Intended to be populated once at startup (a `load` plus any explicit
/// `set`s) and read thereafter; the mutex serializes the memoizing reads.
pub fn default_store() -> &'static Mutex<Config> {
    DEFAULT_STORE.get_or_init(|| Mutex::new(Config::new()))
}
