// Copyright (c) 2024, Nick Stevens <nick@bitcurry.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/license/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pluggable public-key encryption backends built on libsodium.
//!
//! This library exposes libsodium's NaCl box primitives behind a small
//! [`Algorithm`] trait, and an [`AlgorithmRegistry`] that maps aliases to
//! backends and delegates to a default one. All cryptography is done by
//! libsodium; this crate handles keys, mode selection and wiring.
//!
//! A box encrypts in one of two modes:
//!
//! * **anonymous**: without a nonce, the message is sealed to the box's
//!   public key. Anyone with the public key can encrypt, only the private key
//!   holder can decrypt, and the sender stays anonymous.
//! * **authenticated**: with a nonce, the message is encrypted with the shared
//!   secret of the sender's private key and the recipient's public key.
//!
//! Cipher text and keys are exchanged as standard base64 strings.
//!
//! # Usage
//!
//! First, add this to your Cargo.toml:
//!
//! ```toml
//! [dependencies]
//! sodiumbox = "0.1"
//! ```
//!
//! Next:
//!
//! ```
//! use std::error::Error;
//!
//! use sodiumbox::{Algorithm, AlgorithmRegistry, CryptoBox};
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     sodiumbox::init()?;
//!
//!     // Generate a new public/private keypair
//!     let generated = CryptoBox::generate();
//!     let public_key = generated.public_key().to_base64();
//!     let private_key = generated.private_key().unwrap().to_base64();
//!
//!     // Build a box from the keys, e.g. as read from configuration
//!     let crypto_box = CryptoBox::new(&public_key, Some(private_key.as_str()))?;
//!
//!     let mut registry = AlgorithmRegistry::new();
//!     registry.add_algorithm(crypto_box, "box", true);
//!
//!     let cipher = registry.encrypt(b"Hello World!", None, None)?;
//!     assert_ne!("Hello World!", cipher);
//!     assert_eq!(b"Hello World!".to_vec(), registry.decrypt(&cipher, None, None)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Generating Keys
//!
//! The `sodiumbox` binary prints a fresh keypair ready to paste into an
//! environment file:
//!
//! ```sh
//! sodiumbox generate-keys
//! ```

mod algorithm;
mod config;
mod crypto_box;
mod error;
mod key;
mod registry;

#[cfg(test)]
mod testutils;

pub use self::algorithm::Algorithm;
pub use self::config::{Config, DEFAULT_ALIAS, PRIVATE_KEY_ENV, PUBLIC_KEY_ENV};
pub use self::crypto_box::{CryptoBox, KeyPairHandle, KeyedBox, SealedBox};
pub use self::error::{ConfigError, ErrorKind, Operation, SodiumError};
pub use self::key::{
    gen_keypair, Nonce, PublicKey, SecretKey, NONCEBYTES, PUBLICKEYBYTES, SECRETKEYBYTES,
};
pub use self::registry::{build_registry, AlgorithmRegistry, Registration};

/// Initialize libsodium.
///
/// Safe to call more than once. Fails if libsodium is unusable on this
/// system.
pub fn init() -> Result<(), SodiumError> {
    sodiumoxide::init().map_err(|()| SodiumError::InitFailure)
}
