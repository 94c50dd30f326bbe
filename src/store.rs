//! The configuration store and its layered lookup.
//!
//! A [`Config`] owns a flat name → value mapping. Reads resolve through three
//! layers, highest priority first:
//!
//! 1. The in-memory mapping — values placed by `set`, `update`, `load`, or a
//!    previous environment hit.
//! 2. The process environment — `CONJUR_<NAME_UPPERCASED>`. A hit is written
//!    back into the mapping, so the environment is consulted at most once per
//!    key.
//! 3. The caller-supplied default, if any.
//!
//! Every layer is sparse: a config file only needs the keys it overrides, an
//! environment variable can target a single setting.
//!
//! Values keep the type their source produced. File-loaded values carry the
//! full decoded YAML type (booleans, numbers, nested mappings); environment
//! hits are always strings. The store does not normalize across sources.
//!
//! The store provides no internal synchronization. Concurrent callers must
//! wrap it (the crate-level [`default_store`](crate::default_store) hands out
//! a `Mutex`) or keep one store per thread.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use serde_yaml::Value;

use crate::env::{self, EnvReader, ProcessEnv};
use crate::error::ConfigError;

/// Connection settings for a Conjur appliance, resolved through the layered
/// lookup described at the [module level](self).
///
/// The first-class settings are `url`, `account`, and `cert_file`; see the
/// typed accessors in [`setting`](crate::setting). The generic `get`/`set`
/// surface accepts any key, so deployment-specific extras loaded from a file
/// remain reachable.
pub struct Config {
    entries: BTreeMap<String, Value>,
    env: Box<dyn EnvReader>,
}

impl Config {
    /// An empty store reading fallbacks from the process environment.
    pub fn new() -> Self {
        Self::with_env(ProcessEnv)
    }

    /// An empty store with a custom environment source.
    ///
    /// Tests pass a closure over a fixed map; embedders can plug in whatever
    /// stands in for the process environment.
    pub fn with_env(env: impl EnvReader + 'static) -> Self {
        Config {
            entries: BTreeMap::new(),
            env: Box::new(env),
        }
    }

    /// A store seeded with initial values, applied as one [`update`](Self::update).
    pub fn with_values<K, V, I>(values: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut config = Self::new();
        config.update(values);
        config
    }

    /// Resolve `key` through the layered lookup.
    ///
    /// Checks the in-memory mapping, then the environment variable
    /// `CONJUR_<KEY_UPPERCASED>`, then `default`. An environment hit is cached
    /// into the mapping before returning, so later reads of the same key
    /// never re-touch the environment — hence `&mut self` even though this is
    /// conceptually a read.
    ///
    /// `default` is a tagged optional: `None` means the setting is required
    /// and an unresolved lookup is [`ConfigError::RequiredSetting`];
    /// `Some(Value::Null)` is a legitimate "absent" fallback. Defaults are
    /// returned as-is and never cached.
    pub fn get(&mut self, key: &str, default: Option<Value>) -> Result<Value, ConfigError> {
        if let Some(value) = self.entries.get(key) {
            return Ok(value.clone());
        }
        if let Some(raw) = self.env.var(&env::env_key(key)) {
            let value = Value::String(raw);
            self.entries.insert(key.to_string(), value.clone());
            return Ok(value);
        }
        default.ok_or_else(|| ConfigError::RequiredSetting(key.to_string()))
    }

    /// Unconditionally set `key` in the in-memory mapping.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Merge a batch of key-value pairs into the mapping.
    ///
    /// Pairs are applied in iteration order; later pairs override earlier
    /// ones and any existing entries. This is the primitive under both the
    /// seeded constructor and [`load`](Self::load).
    pub fn update<K, V, I>(&mut self, entries: I)
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.entries.insert(key.into(), value.into());
        }
    }

    /// Load a YAML file and merge its top-level mapping into the store.
    ///
    /// The file handle is scoped to this call and released on every path,
    /// including decode failure. Open failures surface as
    /// [`ConfigError::Io`]; malformed content as [`ConfigError::Parse`] with
    /// the offending path. Decoding completes before any merge, so a failed
    /// load leaves the store untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_from(BufReader::new(file))
            .map_err(|err| match err {
                ConfigError::Load(source) => ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                },
                other => other,
            })
    }

    /// Load from an already-open reader instead of a path.
    ///
    /// The stream must decode to a flat mapping with string keys. Decode uses
    /// `serde_yaml`'s safe deserializer; no tags are resolved, no code runs.
    pub fn load_from(&mut self, reader: impl io::Read) -> Result<(), ConfigError> {
        let decoded: BTreeMap<String, Value> =
            serde_yaml::from_reader(reader).map_err(ConfigError::Load)?;
        self.update(decoded);
        Ok(())
    }

    /// Look up `key` in the in-memory mapping only.
    ///
    /// No environment fallback, no default, no side effect. Useful for
    /// inspecting what has actually been resolved or cached so far.
    pub fn entry(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}
