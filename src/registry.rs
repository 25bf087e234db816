// Copyright (c) 2024, Nick Stevens <nick@bitcurry.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/license/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Alias registry for encryption backends.
//!
//! The registry is built once at startup and then shared by reference.
//! Registration needs `&mut self`; lookup and delegation only need `&self`,
//! so a finished registry can be shared across threads.
//!
//! # Example
//!
//! ```
//! use sodiumbox::{build_registry, Algorithm, CryptoBox, Registration};
//!
//! let registry = build_registry(vec![
//!     Registration::new(CryptoBox::generate(), "box", true),
//!     Registration::new(CryptoBox::generate(), "archive", false),
//! ]);
//!
//! // Uses the default backend
//! let cipher = registry.encrypt(b"Hello World!", None, None).unwrap();
//! assert_eq!(b"Hello World!".to_vec(), registry.decrypt(&cipher, None, None).unwrap());
//!
//! // Selects a backend by alias
//! let archive = registry.with("archive").unwrap();
//! let cipher = archive.encrypt(b"Hello World!", None, None).unwrap();
//! assert!(registry.decrypt(&cipher, None, None).is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::iter::FromIterator;

use tracing::debug;

use crate::{algorithm::Algorithm, error::SodiumError, key::Nonce};

/// A backend waiting to be added to a registry.
pub struct Registration {
    backend: Box<dyn Algorithm>,
    alias: String,
    is_default: bool,
}

impl Registration {
    pub fn new(
        backend: impl Algorithm + 'static,
        alias: impl Into<String>,
        is_default: bool,
    ) -> Registration {
        Registration {
            backend: Box::new(backend),
            alias: alias.into(),
            is_default,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Registration")
            .field("alias", &self.alias)
            .field("is_default", &self.is_default)
            .finish_non_exhaustive()
    }
}

/// Build a registry by applying `registrations` in order.
pub fn build_registry<I>(registrations: I) -> AlgorithmRegistry
where
    I: IntoIterator<Item = Registration>,
{
    registrations.into_iter().collect()
}

/// Maps aliases to encryption backends and delegates to a default one.
#[derive(Default)]
pub struct AlgorithmRegistry {
    backends: HashMap<String, Box<dyn Algorithm>>,
    default_alias: Option<String>,
}

impl AlgorithmRegistry {
    /// Create an empty registry with no default.
    pub fn new() -> AlgorithmRegistry {
        AlgorithmRegistry::default()
    }

    /// Register `backend` under `alias`, replacing any backend already there.
    ///
    /// If `is_default` is set, `alias` becomes the default even if another
    /// alias was the default before.
    pub fn add_algorithm(
        &mut self,
        backend: impl Algorithm + 'static,
        alias: impl Into<String>,
        is_default: bool,
    ) {
        self.register(Registration::new(backend, alias, is_default));
    }

    pub fn register(&mut self, registration: Registration) {
        let Registration {
            backend,
            alias,
            is_default,
        } = registration;
        let replaced = self.backends.insert(alias.clone(), backend).is_some();
        debug!(alias = alias.as_str(), is_default, replaced, "registered algorithm");
        if is_default {
            if let Some(previous) = self.default_alias.as_deref().filter(|prev| *prev != alias) {
                debug!(previous, alias = alias.as_str(), "replacing default algorithm");
            }
            self.default_alias = Some(alias);
        }
    }

    /// Look up the backend registered under `alias`.
    pub fn with(&self, alias: &str) -> Result<&dyn Algorithm, SodiumError> {
        self.backends
            .get(alias)
            .map(|backend| &**backend)
            .ok_or_else(|| SodiumError::AlgorithmNotFound(alias.to_string()))
    }

    pub fn default_alias(&self) -> Option<&str> {
        self.default_alias.as_deref()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.backends.contains_key(alias)
    }

    /// Registered aliases, in no particular order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    fn default_backend(&self) -> Result<&dyn Algorithm, SodiumError> {
        let alias = self
            .default_alias
            .as_deref()
            .ok_or(SodiumError::NoDefaultAlgorithm)?;
        self.with(alias)
    }
}

impl fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut aliases: Vec<&str> = self.aliases().collect();
        aliases.sort_unstable();
        f.debug_struct("AlgorithmRegistry")
            .field("aliases", &aliases)
            .field("default_alias", &self.default_alias)
            .finish()
    }
}

impl Extend<Registration> for AlgorithmRegistry {
    fn extend<I: IntoIterator<Item = Registration>>(&mut self, registrations: I) {
        for registration in registrations {
            self.register(registration);
        }
    }
}

impl FromIterator<Registration> for AlgorithmRegistry {
    fn from_iter<I: IntoIterator<Item = Registration>>(registrations: I) -> AlgorithmRegistry {
        let mut registry = AlgorithmRegistry::new();
        registry.extend(registrations);
        registry
    }
}

impl Algorithm for AlgorithmRegistry {
    fn encrypt(
        &self,
        message: &[u8],
        nonce: Option<&Nonce>,
        additional_data: Option<&[u8]>,
    ) -> Result<String, SodiumError> {
        self.default_backend()?
            .encrypt(message, nonce, additional_data)
    }

    fn decrypt(
        &self,
        cipher: &str,
        nonce: Option<&Nonce>,
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, SodiumError> {
        self.default_backend()?
            .decrypt(cipher, nonce, additional_data)
    }
}
