// Copyright (c) 2024, Nick Stevens <nick@bitcurry.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/license/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key configuration.
//!
//! Keys are supplied either through the environment:
//!
//! ```sh
//! SODIUM_PUBLIC_KEY=...
//! SODIUM_PRIVATE_KEY=...
//! ```
//!
//! or a TOML file:
//!
//! ```toml
//! public_key = "..."
//! private_key = "..."
//! ```
//!
//! The public key is required. Without a private key the configured box can
//! only encrypt anonymously.

use std::{env, fmt, fs, path::Path};

use serde::Deserialize;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    crypto_box::CryptoBox,
    error::{ConfigError, SodiumError},
    registry::AlgorithmRegistry,
};

/// Environment variable holding the base64 public key.
pub const PUBLIC_KEY_ENV: &str = "SODIUM_PUBLIC_KEY";

/// Environment variable holding the base64 private key.
pub const PRIVATE_KEY_ENV: &str = "SODIUM_PRIVATE_KEY";

/// Alias under which the configured box is registered.
pub const DEFAULT_ALIAS: &str = "box";

/// Base64-encoded keys for the configured box.
#[derive(Clone, Default, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub private_key: Option<String>,
}

impl Config {
    pub fn new(public_key: impl Into<String>, private_key: Option<String>) -> Config {
        Config {
            public_key: public_key.into(),
            private_key,
        }
    }

    /// Read keys from `SODIUM_PUBLIC_KEY` and `SODIUM_PRIVATE_KEY`.
    pub fn from_env() -> Result<Config, ConfigError> {
        let public_key = env::var(PUBLIC_KEY_ENV).unwrap_or_default();
        let private_key = env::var(PRIVATE_KEY_ENV).ok();
        let config = Config::new(public_key, private_key);
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load keys from a TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading key configuration");
        let contents = zeroize::Zeroizing::new(fs::read_to_string(path)?);
        Config::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.public_key.trim().is_empty() {
            return Err(ConfigError::MissingPublicKey);
        }
        Ok(())
    }

    /// The private key, if one is configured and not empty.
    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref().filter(|key| !key.is_empty())
    }

    pub fn build_box(&self) -> Result<CryptoBox, SodiumError> {
        CryptoBox::new(&self.public_key, self.private_key())
    }

    /// Registry with the configured box as the default under
    /// [`DEFAULT_ALIAS`].
    pub fn build_registry(&self) -> Result<AlgorithmRegistry, ConfigError> {
        self.validate()?;
        let mut registry = AlgorithmRegistry::new();
        registry.add_algorithm(self.build_box()?, DEFAULT_ALIAS, true);
        Ok(registry)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key().map(|_| "****"))
            .finish()
    }
}
