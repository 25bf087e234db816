// Copyright (c) 2024, Nick Stevens <nick@bitcurry.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/license/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io;

use pem::PemError;
use simple_asn1::{ASN1DecodeErr, ASN1EncodeErr};
use strum_macros::{Display, EnumIter};
use thiserror::Error;

use crate::key::NONCEBYTES;

/// Operation that was refused because the box holds no private key.
#[derive(Clone, Copy, Debug, Display, EnumIter, Hash, Eq, PartialEq)]
pub enum Operation {
    #[strum(serialize = "authenticated encryption")]
    AuthenticatedEncryption,
    #[strum(serialize = "authenticated decryption")]
    AuthenticatedDecryption,
    #[strum(serialize = "decryption")]
    Decryption,
}

/// Sodiumbox errors
#[derive(Clone, Debug, Error, Hash, Eq, PartialEq)]
pub enum SodiumError {
    #[error("libsodium could not be initialized.")]
    InitFailure,
    #[error("Value is not valid base64.")]
    InvalidBase64,
    #[error("Key is the incorrect length.")]
    IncorrectKeyLength,
    #[error("Nonce is the incorrect length, must be {} bytes.", NONCEBYTES)]
    IncorrectNonceLength,
    #[error("Key is invalid, must be PEM encoded ASN.1")]
    InvalidKeyFormat,
    #[error("Key algorithm is unknown or unsupported.")]
    UnsupportedKeyAlgorithm,
    #[error("Private key needed for {0}.")]
    PrivateKeyRequired(Operation),
    #[error("Invalid cipher text.")]
    InvalidCipher,
    #[error("Algorithm \"{0}\" not found.")]
    AlgorithmNotFound(String),
    #[error("No default algorithm set.")]
    NoDefaultAlgorithm,
}

/// Broad classification of a [`SodiumError`].
#[derive(Clone, Copy, Debug, Display, EnumIter, Hash, Eq, PartialEq)]
pub enum ErrorKind {
    /// Malformed key, nonce or base64 input, or the provider is unusable.
    Crypto,
    /// An operation needed a private key the box does not hold.
    Precomposition,
    /// Cipher text failed authentication or could not be parsed.
    InvalidCipher,
    /// No backend registered under the requested alias.
    NotFound,
    /// The registry has no default backend.
    NoDefault,
}

impl SodiumError {
    pub fn kind(&self) -> ErrorKind {
        use self::SodiumError::*;
        match self {
            InitFailure
            | InvalidBase64
            | IncorrectKeyLength
            | IncorrectNonceLength
            | InvalidKeyFormat
            | UnsupportedKeyAlgorithm => ErrorKind::Crypto,
            PrivateKeyRequired(_) => ErrorKind::Precomposition,
            InvalidCipher => ErrorKind::InvalidCipher,
            AlgorithmNotFound(_) => ErrorKind::NotFound,
            NoDefaultAlgorithm => ErrorKind::NoDefault,
        }
    }
}

impl From<base64::DecodeError> for SodiumError {
    fn from(_: base64::DecodeError) -> SodiumError {
        SodiumError::InvalidBase64
    }
}

impl From<PemError> for SodiumError {
    fn from(_: PemError) -> SodiumError {
        SodiumError::InvalidKeyFormat
    }
}

impl From<ASN1EncodeErr> for SodiumError {
    fn from(_: ASN1EncodeErr) -> SodiumError {
        SodiumError::InvalidKeyFormat
    }
}

impl From<ASN1DecodeErr> for SodiumError {
    fn from(_: ASN1DecodeErr) -> SodiumError {
        SodiumError::InvalidKeyFormat
    }
}

/// Errors when loading configuration.
///
/// Kept apart from `SodiumError` because `std::io::Error` and the TOML parse
/// error do not implement `Clone`, `Hash`, or `Eq`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("config file parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("public key is required and cannot be empty")]
    MissingPublicKey,
    #[error("configured key is invalid: {0}")]
    Key(#[from] SodiumError),
}
