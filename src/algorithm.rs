// Copyright (c) 2024, Nick Stevens <nick@bitcurry.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/license/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;

use crate::{error::SodiumError, key::Nonce};

/// An encryption backend.
///
/// Cipher text is exchanged as a standard base64 string. Whether a nonce is
/// required, and what it means, is up to the implementation; implementations
/// that have no use for `additional_data` ignore it.
pub trait Algorithm: Send + Sync {
    /// Encrypt `message` and return the base64-encoded cipher text.
    fn encrypt(
        &self,
        message: &[u8],
        nonce: Option<&Nonce>,
        additional_data: Option<&[u8]>,
    ) -> Result<String, SodiumError>;

    /// Decrypt base64-encoded `cipher` and return the plaintext.
    fn decrypt(
        &self,
        cipher: &str,
        nonce: Option<&Nonce>,
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, SodiumError>;
}

impl<'a, T: Algorithm + ?Sized> Algorithm for &'a T {
    fn encrypt(
        &self,
        message: &[u8],
        nonce: Option<&Nonce>,
        additional_data: Option<&[u8]>,
    ) -> Result<String, SodiumError> {
        (**self).encrypt(message, nonce, additional_data)
    }

    fn decrypt(
        &self,
        cipher: &str,
        nonce: Option<&Nonce>,
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, SodiumError> {
        (**self).decrypt(cipher, nonce, additional_data)
    }
}

impl<T: Algorithm + ?Sized> Algorithm for Box<T> {
    fn encrypt(
        &self,
        message: &[u8],
        nonce: Option<&Nonce>,
        additional_data: Option<&[u8]>,
    ) -> Result<String, SodiumError> {
        (**self).encrypt(message, nonce, additional_data)
    }

    fn decrypt(
        &self,
        cipher: &str,
        nonce: Option<&Nonce>,
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, SodiumError> {
        (**self).decrypt(cipher, nonce, additional_data)
    }
}

impl<T: Algorithm + ?Sized> Algorithm for Arc<T> {
    fn encrypt(
        &self,
        message: &[u8],
        nonce: Option<&Nonce>,
        additional_data: Option<&[u8]>,
    ) -> Result<String, SodiumError> {
        (**self).encrypt(message, nonce, additional_data)
    }

    fn decrypt(
        &self,
        cipher: &str,
        nonce: Option<&Nonce>,
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, SodiumError> {
        (**self).decrypt(cipher, nonce, additional_data)
    }
}
