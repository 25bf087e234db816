// Copyright (c) 2024, Nick Stevens <nick@bitcurry.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/license/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! NaCl box backends.
//!
//! Two modes are supported, selected by the presence of a nonce:
//!
//! * **Anonymous** (no nonce): the message is sealed to the box's public key
//!   with an ephemeral sender key. Only the public key is needed to encrypt;
//!   decrypting needs the matching private key.
//! * **Authenticated** (nonce given): the message is encrypted with the
//!   shared secret of our private key and the peer's public key. Use
//!   [`KeyedBox::for_recipient`] to encrypt to a peer and
//!   [`KeyedBox::from_sender`] to decrypt from one.
//!
//! # Example
//!
//! ```
//! use sodiumbox::{Algorithm, CryptoBox, Nonce};
//!
//! let alice = CryptoBox::generate();
//! let bob = CryptoBox::generate();
//!
//! // Anonymous
//! let cipher = alice.encrypt(b"Hello World!", None, None).unwrap();
//! assert_eq!(b"Hello World!".to_vec(), alice.decrypt(&cipher, None, None).unwrap());
//!
//! // Authenticated
//! let alice_public = alice.public_key().to_base64();
//! let bob_public = bob.public_key().to_base64();
//! let nonce = Nonce::gen();
//! let cipher = alice
//!     .for_recipient(&bob_public)
//!     .unwrap()
//!     .encrypt(b"Hello Bob!", Some(&nonce), None)
//!     .unwrap();
//! let message = bob
//!     .from_sender(&alice_public)
//!     .unwrap()
//!     .decrypt(&cipher, Some(&nonce), None)
//!     .unwrap();
//! assert_eq!(b"Hello Bob!".to_vec(), message);
//! ```

use std::fmt;

use sodiumoxide::crypto::{
    box_::{self, PrecomputedKey},
    sealedbox,
};
use strum_macros::{AsRefStr, Display};
use tracing::debug;
use zeroize::Zeroizing;

use crate::{
    algorithm::Algorithm,
    error::{Operation, SodiumError},
    key::{self, decode_base64, encode_base64, Nonce, PublicKey, SecretKey},
};

#[derive(Clone, Copy, Debug, Display)]
#[strum(serialize_all = "lowercase")]
enum Mode {
    Anonymous,
    Authenticated,
}

impl Mode {
    fn of(nonce: Option<&Nonce>) -> Mode {
        match nonce {
            Some(_) => Mode::Authenticated,
            None => Mode::Anonymous,
        }
    }
}

fn seal_anonymous(message: &[u8], public_key: &PublicKey) -> String {
    encode_base64(sealedbox::seal(message, &public_key.inner))
}

/// Key material derived from a public key and a private key.
///
/// The public half is whatever key the box was built with, which after
/// [`KeyedBox::for_recipient`] or [`KeyedBox::from_sender`] is the peer's
/// key. No check is made that the two halves belong together.
#[derive(Clone)]
pub struct KeyPairHandle {
    public_key: PublicKey,
    secret_key: SecretKey,
    precomputed: PrecomputedKey,
}

impl KeyPairHandle {
    fn new(public_key: PublicKey, secret_key: SecretKey) -> KeyPairHandle {
        let precomputed = box_::precompute(&public_key.inner, &secret_key.inner);
        KeyPairHandle {
            public_key,
            secret_key,
            precomputed,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Export in libsodium's combined keypair layout, secret key followed by
    /// public key.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        let mut bytes = Zeroizing::new(Vec::with_capacity(
            key::SECRETKEYBYTES + key::PUBLICKEYBYTES,
        ));
        bytes.extend_from_slice(&self.secret_key.inner[..]);
        bytes.extend_from_slice(&self.public_key.inner[..]);
        bytes
    }
}

impl fmt::Debug for KeyPairHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("KeyPairHandle")
            .field("public_key", &self.public_key.to_base64())
            .finish_non_exhaustive()
    }
}

/// Box holding only a public key.
///
/// Can encrypt anonymously to the key's owner and nothing else.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct SealedBox {
    public_key: PublicKey,
}

impl SealedBox {
    /// Create a box from a base64-encoded public key.
    pub fn new(public_key: &str) -> Result<SealedBox, SodiumError> {
        Ok(SealedBox::from_key(PublicKey::from_base64(public_key)?))
    }

    pub fn from_key(public_key: PublicKey) -> SealedBox {
        SealedBox { public_key }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl fmt::Debug for SealedBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SealedBox")
            .field("public_key", &self.public_key.to_base64())
            .finish()
    }
}

impl Algorithm for SealedBox {
    fn encrypt(
        &self,
        message: &[u8],
        nonce: Option<&Nonce>,
        _additional_data: Option<&[u8]>,
    ) -> Result<String, SodiumError> {
        match nonce {
            None => Ok(seal_anonymous(message, &self.public_key)),
            Some(_) => Err(SodiumError::PrivateKeyRequired(
                Operation::AuthenticatedEncryption,
            )),
        }
    }

    fn decrypt(
        &self,
        _cipher: &str,
        _nonce: Option<&Nonce>,
        _additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, SodiumError> {
        Err(SodiumError::PrivateKeyRequired(Operation::Decryption))
    }
}

/// Box holding a public key and a private key.
///
/// Every operation is available. The keypair handle is derived when the box
/// is built.
#[derive(Clone)]
pub struct KeyedBox {
    handle: KeyPairHandle,
}

impl KeyedBox {
    /// Create a box from base64-encoded public and private keys.
    pub fn new(public_key: &str, private_key: &str) -> Result<KeyedBox, SodiumError> {
        let public_key = PublicKey::from_base64(public_key)?;
        let secret_key = SecretKey::from_base64(private_key)?;
        Ok(KeyedBox::from_keys(public_key, secret_key))
    }

    pub fn from_keys(public_key: PublicKey, secret_key: SecretKey) -> KeyedBox {
        KeyedBox {
            handle: KeyPairHandle::new(public_key, secret_key),
        }
    }

    /// Create a box from PEM-encoded X25519 keys.
    pub fn from_pem(public_pem: &str, secret_pem: &str) -> Result<KeyedBox, SodiumError> {
        let public_key = PublicKey::from_pem(public_pem)?;
        let secret_key = SecretKey::from_pem(secret_pem)?;
        Ok(KeyedBox::from_keys(public_key, secret_key))
    }

    /// Create a box from a freshly generated random keypair.
    pub fn generate() -> KeyedBox {
        let (public_key, secret_key) = key::gen_keypair();
        KeyedBox::from_keys(public_key, secret_key)
    }

    /// Box that encrypts to `recipient_public_key`, authenticated as us.
    pub fn for_recipient(&self, recipient_public_key: &str) -> Result<KeyedBox, SodiumError> {
        let recipient = PublicKey::from_base64(recipient_public_key)?;
        Ok(self.for_recipient_key(&recipient))
    }

    /// Box that decrypts messages sent by `sender_public_key` to us.
    pub fn from_sender(&self, sender_public_key: &str) -> Result<KeyedBox, SodiumError> {
        let sender = PublicKey::from_base64(sender_public_key)?;
        Ok(self.from_sender_key(&sender))
    }

    pub fn for_recipient_key(&self, recipient: &PublicKey) -> KeyedBox {
        KeyedBox::from_keys(recipient.clone(), self.handle.secret_key.clone())
    }

    pub fn from_sender_key(&self, sender: &PublicKey) -> KeyedBox {
        KeyedBox::from_keys(sender.clone(), self.handle.secret_key.clone())
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.handle.public_key
    }

    pub fn private_key(&self) -> &SecretKey {
        &self.handle.secret_key
    }

    pub fn keypair_handle(&self) -> &KeyPairHandle {
        &self.handle
    }
}

impl fmt::Debug for KeyedBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("KeyedBox")
            .field("public_key", &self.handle.public_key.to_base64())
            .finish_non_exhaustive()
    }
}

impl Algorithm for KeyedBox {
    fn encrypt(
        &self,
        message: &[u8],
        nonce: Option<&Nonce>,
        _additional_data: Option<&[u8]>,
    ) -> Result<String, SodiumError> {
        match nonce {
            None => Ok(seal_anonymous(message, &self.handle.public_key)),
            Some(nonce) => Ok(encode_base64(box_::seal_precomputed(
                message,
                &nonce.inner,
                &self.handle.precomputed,
            ))),
        }
    }

    fn decrypt(
        &self,
        cipher: &str,
        nonce: Option<&Nonce>,
        _additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, SodiumError> {
        let mode = Mode::of(nonce);
        let ciphertext = decode_base64(cipher).map_err(|_| {
            debug!(%mode, "cipher text is not valid base64");
            SodiumError::InvalidCipher
        })?;
        let opened = match nonce {
            None => sealedbox::open(
                &ciphertext,
                &self.handle.public_key.inner,
                &self.handle.secret_key.inner,
            ),
            Some(nonce) => {
                box_::open_precomputed(&ciphertext, &nonce.inner, &self.handle.precomputed)
            }
        };
        opened.map_err(|()| {
            debug!(%mode, "failed to open cipher text");
            SodiumError::InvalidCipher
        })
    }
}

/// A box whose private key may or may not be present.
///
/// This is what configuration produces: the public key is always known, the
/// private key only on hosts that need to decrypt. Operations that need the
/// private key fail with [`SodiumError::PrivateKeyRequired`] on the `Sealed`
/// variant.
#[derive(Clone, AsRefStr)]
pub enum CryptoBox {
    Sealed(SealedBox),
    Keyed(KeyedBox),
}

impl CryptoBox {
    /// Create a box from a base64 public key and optional base64 private
    /// key. An empty private key counts as absent.
    pub fn new(public_key: &str, private_key: Option<&str>) -> Result<CryptoBox, SodiumError> {
        let crypto_box = match private_key.filter(|key| !key.is_empty()) {
            Some(private_key) => CryptoBox::Keyed(KeyedBox::new(public_key, private_key)?),
            None => CryptoBox::Sealed(SealedBox::new(public_key)?),
        };
        let variant: &str = crypto_box.as_ref();
        debug!(variant, "constructed box");
        Ok(crypto_box)
    }

    /// Create a box from a freshly generated random keypair.
    pub fn generate() -> CryptoBox {
        CryptoBox::Keyed(KeyedBox::generate())
    }

    /// Box that encrypts to `recipient_public_key`, authenticated as us.
    ///
    /// Fails if this box has no private key.
    pub fn for_recipient(&self, recipient_public_key: &str) -> Result<KeyedBox, SodiumError> {
        match self {
            CryptoBox::Keyed(keyed) => keyed.for_recipient(recipient_public_key),
            CryptoBox::Sealed(_) => Err(SodiumError::PrivateKeyRequired(
                Operation::AuthenticatedEncryption,
            )),
        }
    }

    /// Box that decrypts messages sent by `sender_public_key` to us.
    ///
    /// Fails if this box has no private key.
    pub fn from_sender(&self, sender_public_key: &str) -> Result<KeyedBox, SodiumError> {
        match self {
            CryptoBox::Keyed(keyed) => keyed.from_sender(sender_public_key),
            CryptoBox::Sealed(_) => Err(SodiumError::PrivateKeyRequired(
                Operation::AuthenticatedDecryption,
            )),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        match self {
            CryptoBox::Sealed(sealed) => sealed.public_key(),
            CryptoBox::Keyed(keyed) => keyed.public_key(),
        }
    }

    pub fn private_key(&self) -> Option<&SecretKey> {
        match self {
            CryptoBox::Sealed(_) => None,
            CryptoBox::Keyed(keyed) => Some(keyed.private_key()),
        }
    }

    pub fn keypair_handle(&self) -> Option<&KeyPairHandle> {
        match self {
            CryptoBox::Sealed(_) => None,
            CryptoBox::Keyed(keyed) => Some(keyed.keypair_handle()),
        }
    }
}

impl From<SealedBox> for CryptoBox {
    fn from(sealed: SealedBox) -> CryptoBox {
        CryptoBox::Sealed(sealed)
    }
}

impl From<KeyedBox> for CryptoBox {
    fn from(keyed: KeyedBox) -> CryptoBox {
        CryptoBox::Keyed(keyed)
    }
}

impl fmt::Debug for CryptoBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CryptoBox::Sealed(sealed) => f.debug_tuple("Sealed").field(sealed).finish(),
            CryptoBox::Keyed(keyed) => f.debug_tuple("Keyed").field(keyed).finish(),
        }
    }
}

impl Algorithm for CryptoBox {
    fn encrypt(
        &self,
        message: &[u8],
        nonce: Option<&Nonce>,
        additional_data: Option<&[u8]>,
    ) -> Result<String, SodiumError> {
        match self {
            CryptoBox::Sealed(sealed) => sealed.encrypt(message, nonce, additional_data),
            CryptoBox::Keyed(keyed) => keyed.encrypt(message, nonce, additional_data),
        }
    }

    fn decrypt(
        &self,
        cipher: &str,
        nonce: Option<&Nonce>,
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, SodiumError> {
        match self {
            CryptoBox::Sealed(sealed) => sealed.decrypt(cipher, nonce, additional_data),
            CryptoBox::Keyed(keyed) => keyed.decrypt(cipher, nonce, additional_data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CryptoBox, KeyedBox, SealedBox};
    use crate::{
        algorithm::Algorithm,
        error::{ErrorKind, Operation, SodiumError},
        key::{self, Nonce, PUBLICKEYBYTES, SECRETKEYBYTES},
        testutils::random_bytes,
    };

    const MESSAGE: &[u8] = b"This is a test message";

    fn base64_keypair() -> (String, String) {
        let (public, secret) = key::gen_keypair();
        (public.to_base64(), secret.to_base64().to_string())
    }

    #[test]
    fn generate_test() {
        let crypto_box = CryptoBox::generate();
        assert!(crypto_box.private_key().is_some());
        assert!(crypto_box.keypair_handle().is_some());
        assert_eq!(
            crypto_box.public_key(),
            &crypto_box.private_key().unwrap().public_key()
        );
    }

    #[test]
    fn keys_match_handle_test() {
        let (public, secret) = base64_keypair();
        let crypto_box = CryptoBox::new(&public, Some(secret.as_str())).unwrap();
        let handle = crypto_box.keypair_handle().unwrap();
        assert_eq!(public, crypto_box.public_key().to_base64());
        assert_eq!(public, handle.public_key().to_base64());
        assert_eq!(
            secret.as_str(),
            crypto_box.private_key().unwrap().to_base64().as_str()
        );
        assert_eq!(
            secret.as_str(),
            handle.secret_key().to_base64().as_str()
        );
    }

    #[test]
    fn handle_bytes_layout_test() {
        let keyed = KeyedBox::generate();
        let bytes = keyed.keypair_handle().to_bytes();
        assert_eq!(SECRETKEYBYTES + PUBLICKEYBYTES, bytes.len());
        assert_eq!(&keyed.private_key().inner[..], &bytes[..SECRETKEYBYTES]);
        assert_eq!(keyed.public_key().as_bytes(), &bytes[SECRETKEYBYTES..]);
    }

    #[test]
    fn public_only_test() {
        let (public, _secret) = base64_keypair();
        let crypto_box = CryptoBox::new(&public, None).unwrap();
        assert!(crypto_box.private_key().is_none());
        assert!(crypto_box.keypair_handle().is_none());

        // Empty private key from configuration counts as absent
        let crypto_box = CryptoBox::new(&public, Some("")).unwrap();
        assert!(crypto_box.private_key().is_none());
    }

    #[test]
    fn malformed_keys_test() {
        let (public, secret) = base64_keypair();
        let err = CryptoBox::new("not base64!", Some(secret.as_str())).unwrap_err();
        assert_eq!(ErrorKind::Crypto, err.kind());
        let err = CryptoBox::new(&public, Some("aGVsbG8=")).unwrap_err();
        assert_eq!(SodiumError::IncorrectKeyLength, err);
        let err = CryptoBox::new("aGVsbG8=", None).unwrap_err();
        assert_eq!(SodiumError::IncorrectKeyLength, err);
    }

    #[test]
    fn anonymous_encrypt_decrypt_test() {
        let (public, secret) = base64_keypair();
        let crypto_box = CryptoBox::new(&public, Some(secret.as_str())).unwrap();

        let encrypted = crypto_box.encrypt(MESSAGE, None, None).unwrap();
        let decrypted = crypto_box.decrypt(&encrypted, None, None).unwrap();

        assert_ne!(MESSAGE, encrypted.as_bytes());
        assert_eq!(MESSAGE, &decrypted[..]);
    }

    #[test]
    fn anonymous_encrypt_without_private_key_test() {
        let (public, secret) = base64_keypair();
        let sender = CryptoBox::new(&public, None).unwrap();
        let encrypted = sender.encrypt(MESSAGE, None, None).unwrap();
        assert_ne!(MESSAGE, encrypted.as_bytes());

        // Only the owner of the private key can open it
        let owner = CryptoBox::new(&public, Some(secret.as_str())).unwrap();
        assert_eq!(MESSAGE, &owner.decrypt(&encrypted, None, None).unwrap()[..]);
    }

    #[test]
    fn decrypt_without_private_key_test() {
        let (public, _secret) = base64_keypair();
        let crypto_box = CryptoBox::new(&public, None).unwrap();
        assert_eq!(
            SodiumError::PrivateKeyRequired(Operation::Decryption),
            crypto_box.decrypt("does-not-matter", None, None).unwrap_err()
        );
        let nonce = Nonce::gen();
        assert_eq!(
            SodiumError::PrivateKeyRequired(Operation::Decryption),
            crypto_box
                .decrypt("does-not-matter", Some(&nonce), None)
                .unwrap_err()
        );
    }

    #[test]
    fn authenticated_encrypt_decrypt_test() {
        let (sender_public, sender_secret) = base64_keypair();
        let (recipient_public, recipient_secret) = base64_keypair();

        let sender = CryptoBox::new(&recipient_public, Some(sender_secret.as_str())).unwrap();
        let recipient = CryptoBox::new(&sender_public, Some(recipient_secret.as_str())).unwrap();
        let nonce = Nonce::gen();

        let cipher = sender
            .for_recipient(&recipient_public)
            .unwrap()
            .encrypt(MESSAGE, Some(&nonce), None)
            .unwrap();
        let message = recipient
            .from_sender(&sender_public)
            .unwrap()
            .decrypt(&cipher, Some(&nonce), None)
            .unwrap();

        assert_ne!(MESSAGE, cipher.as_bytes());
        assert_eq!(MESSAGE, &message[..]);
    }

    #[test]
    fn authenticated_encrypt_without_private_key_test() {
        let (sender_public, _secret) = base64_keypair();
        let sender = CryptoBox::new(&sender_public, None).unwrap();
        let nonce = Nonce::gen();

        assert_eq!(
            SodiumError::PrivateKeyRequired(Operation::AuthenticatedEncryption),
            sender.for_recipient("does-not-matter").unwrap_err()
        );
        assert_eq!(
            SodiumError::PrivateKeyRequired(Operation::AuthenticatedEncryption),
            sender.encrypt(MESSAGE, Some(&nonce), None).unwrap_err()
        );
    }

    #[test]
    fn authenticated_decrypt_without_private_key_test() {
        let (recipient_public, _secret) = base64_keypair();
        let recipient = CryptoBox::new(&recipient_public, None).unwrap();
        let err = recipient.from_sender("does-not-matter").unwrap_err();
        assert_eq!(
            SodiumError::PrivateKeyRequired(Operation::AuthenticatedDecryption),
            err
        );
        assert_eq!(ErrorKind::Precomposition, err.kind());
    }

    #[test]
    fn wrong_nonce_test() {
        let sender = KeyedBox::generate();
        let recipient = KeyedBox::generate();
        let nonce = Nonce::gen();

        let cipher = sender
            .for_recipient_key(recipient.public_key())
            .encrypt(MESSAGE, Some(&nonce), None)
            .unwrap();
        let opener = recipient.from_sender_key(sender.public_key());
        assert_eq!(
            SodiumError::InvalidCipher,
            opener.decrypt(&cipher, Some(&Nonce::gen()), None).unwrap_err()
        );
        // An authenticated cipher is not a sealed box
        assert_eq!(
            SodiumError::InvalidCipher,
            opener.decrypt(&cipher, None, None).unwrap_err()
        );
    }

    #[test]
    fn wrong_recipient_test() {
        let sender = KeyedBox::generate();
        let recipient = KeyedBox::generate();
        let eavesdropper = KeyedBox::generate();
        let nonce = Nonce::gen();

        let cipher = sender
            .for_recipient_key(recipient.public_key())
            .encrypt(MESSAGE, Some(&nonce), None)
            .unwrap();
        assert_eq!(
            SodiumError::InvalidCipher,
            eavesdropper
                .from_sender_key(sender.public_key())
                .decrypt(&cipher, Some(&nonce), None)
                .unwrap_err()
        );

        let sealed = recipient.encrypt(MESSAGE, None, None).unwrap();
        assert_eq!(
            SodiumError::InvalidCipher,
            eavesdropper.decrypt(&sealed, None, None).unwrap_err()
        );
    }

    #[test]
    fn invalid_cipher_text_test() {
        let keyed = KeyedBox::generate();
        assert_eq!(
            SodiumError::InvalidCipher,
            keyed.decrypt("does-not-matter", None, None).unwrap_err()
        );
        // Valid base64 but too short to be a sealed box
        assert_eq!(
            SodiumError::InvalidCipher,
            keyed.decrypt("aGVsbG8=", None, None).unwrap_err()
        );
    }

    #[test]
    fn additional_data_ignored_test() {
        let keyed = KeyedBox::generate();
        let cipher = keyed.encrypt(MESSAGE, None, Some(b"context")).unwrap();
        assert_eq!(
            MESSAGE,
            &keyed.decrypt(&cipher, None, Some(b"other context")).unwrap()[..]
        );
    }

    #[test]
    fn large_message_test() {
        let message = random_bytes(11, 256 * 1024);
        let keyed = KeyedBox::generate();
        let cipher = keyed.encrypt(&message, None, None).unwrap();
        assert_eq!(&message[..], &keyed.decrypt(&cipher, None, None).unwrap()[..]);
    }

    #[test]
    fn sealed_box_test() {
        let keyed = KeyedBox::generate();
        let sealed = SealedBox::from_key(keyed.public_key().clone());
        let cipher = sealed.encrypt(MESSAGE, None, None).unwrap();
        assert_eq!(MESSAGE, &keyed.decrypt(&cipher, None, None).unwrap()[..]);
        assert_eq!(
            SodiumError::PrivateKeyRequired(Operation::AuthenticatedEncryption),
            sealed.encrypt(MESSAGE, Some(&Nonce::gen()), None).unwrap_err()
        );
    }

    #[test]
    fn debug_hides_private_key_test() {
        let (public, secret) = base64_keypair();
        let crypto_box = CryptoBox::new(&public, Some(secret.as_str())).unwrap();
        let debug = format!("{:?}", crypto_box);
        assert!(debug.starts_with("Keyed(KeyedBox"));
        assert!(debug.contains(&public));
        assert!(!debug.contains(&secret));
        assert_eq!("Keyed", AsRef::<str>::as_ref(&crypto_box));
    }
}
