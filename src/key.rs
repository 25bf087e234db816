// Copyright (c) 2024, Nick Stevens <nick@bitcurry.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/license/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key and nonce types for NaCl box encryption.
//!
//! Keys travel as standard base64 (with padding), the same encoding libsodium
//! calls `SODIUM_BASE64_VARIANT_ORIGINAL`. X25519 keys produced by OpenSSL can
//! also be loaded from PEM:
//!
//! ```sh
//! openssl genpkey -algorithm x25519 > secret.pem
//! openssl pkey -in secret.pem -pubout > public.pem
//! ```

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sodiumoxide::crypto::{
    box_::{self, Nonce as SodiumNonce, PublicKey as SodiumPublicKey, SecretKey as SodiumSecretKey},
    scalarmult::curve25519::{self, Scalar},
};
use zeroize::Zeroizing;

use crate::error::SodiumError;

pub use sodiumoxide::crypto::box_::{NONCEBYTES, PUBLICKEYBYTES, SECRETKEYBYTES};

pub(crate) fn encode_base64(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

pub(crate) fn decode_base64(encoded: impl AsRef<[u8]>) -> Result<Vec<u8>, SodiumError> {
    Ok(STANDARD.decode(encoded)?)
}

/// Wrapper over libsodium-provided public key type.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct PublicKey {
    pub(crate) inner: SodiumPublicKey,
}

impl PublicKey {
    /// Load public key from raw Curve25519 bytes.
    ///
    /// This must be `PUBLICKEYBYTES` long.
    pub fn from_raw_curve25519(bytes: &[u8]) -> Result<PublicKey, SodiumError> {
        let sodium_key =
            SodiumPublicKey::from_slice(bytes).ok_or(SodiumError::IncorrectKeyLength)?;
        Ok(PublicKey { inner: sodium_key })
    }

    /// Load public key from its base64 encoding.
    pub fn from_base64(encoded: &str) -> Result<PublicKey, SodiumError> {
        PublicKey::from_raw_curve25519(&decode_base64(encoded)?)
    }

    /// Export public key as a base64 string.
    pub fn to_base64(&self) -> String {
        encode_base64(&self.inner[..])
    }

    /// Load public key from a PEM `PUBLIC KEY` block.
    pub fn from_pem(pem: &str) -> Result<PublicKey, SodiumError> {
        let parsed = pem::parse(pem)?;
        let raw = der::decode_public_key(parsed.contents())?;
        PublicKey::from_raw_curve25519(&raw)
    }

    /// Export public key as PEM-encoded string.
    pub fn to_pem(&self) -> String {
        let der = der::encode_public_key(&self.inner[..]);
        pem::encode(&pem::Pem::new("PUBLIC KEY", der))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.inner[..]
    }
}

/// Wrapper over libsodium-provided secret key type.
///
/// The key bytes are wiped when the value is dropped.
#[derive(Clone, Eq, PartialEq)]
pub struct SecretKey {
    pub(crate) inner: SodiumSecretKey,
}

impl SecretKey {
    /// Load secret key from raw Curve25519 bytes.
    ///
    /// This must be `SECRETKEYBYTES` long.
    pub fn from_raw_curve25519(bytes: &[u8]) -> Result<SecretKey, SodiumError> {
        let sodium_key =
            SodiumSecretKey::from_slice(bytes).ok_or(SodiumError::IncorrectKeyLength)?;
        Ok(SecretKey { inner: sodium_key })
    }

    /// Load secret key from its base64 encoding.
    pub fn from_base64(encoded: &str) -> Result<SecretKey, SodiumError> {
        let raw = Zeroizing::new(decode_base64(encoded)?);
        SecretKey::from_raw_curve25519(&raw)
    }

    /// Export secret key as a base64 string.
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(encode_base64(&self.inner[..]))
    }

    /// Load secret key from a PEM `PRIVATE KEY` block.
    pub fn from_pem(pem: &str) -> Result<SecretKey, SodiumError> {
        let parsed = pem::parse(pem)?;
        let raw = der::decode_secret_key(parsed.contents())?;
        SecretKey::from_raw_curve25519(&raw)
    }

    /// Export secret key as PEM-encoded string.
    pub fn to_pem(&self) -> Zeroizing<String> {
        let der = der::encode_secret_key(&self.inner[..]);
        Zeroizing::new(pem::encode(&pem::Pem::new("PRIVATE KEY", der.to_vec())))
    }

    /// Compute the public key belonging to this secret key.
    pub fn public_key(&self) -> PublicKey {
        let scalar = Scalar(self.inner.0);
        let point = curve25519::scalarmult_base(&scalar);
        PublicKey {
            inner: SodiumPublicKey(point.0),
        }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SecretKey(****)")
    }
}

/// Nonce for authenticated box encryption.
///
/// A nonce must never be reused with the same pair of keys. Use
/// [`Nonce::gen`] for every message unless the nonce is derived from a
/// counter the caller controls.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Nonce {
    pub(crate) inner: SodiumNonce,
}

impl Nonce {
    /// Generate a random nonce.
    pub fn gen() -> Nonce {
        Nonce {
            inner: box_::gen_nonce(),
        }
    }

    /// Load nonce from raw bytes, which must be `NONCEBYTES` long.
    pub fn from_slice(bytes: &[u8]) -> Result<Nonce, SodiumError> {
        let inner = SodiumNonce::from_slice(bytes).ok_or(SodiumError::IncorrectNonceLength)?;
        Ok(Nonce { inner })
    }

    pub fn from_base64(encoded: &str) -> Result<Nonce, SodiumError> {
        Nonce::from_slice(&decode_base64(encoded)?)
    }

    pub fn to_base64(&self) -> String {
        encode_base64(&self.inner[..])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.inner[..]
    }
}

/// Create a new random box keypair.
pub fn gen_keypair() -> (PublicKey, SecretKey) {
    let (raw_public, raw_secret) = box_::gen_keypair();
    (
        PublicKey { inner: raw_public },
        SecretKey { inner: raw_secret },
    )
}

/// DER encodings of X25519 keys as written by OpenSSL: SubjectPublicKeyInfo
/// for public keys, PKCS#8 version 0 for secret keys.
mod der {
    use lazy_static::lazy_static;
    use simple_asn1::{self, ASN1Block, BigInt, OID};
    use zeroize::Zeroizing;

    use super::{PUBLICKEYBYTES, SECRETKEYBYTES};
    use crate::error::SodiumError;

    lazy_static! {
        static ref X25519_OID: OID = simple_asn1::oid!(1, 3, 101, 110);
    }

    fn algorithm_identifier() -> ASN1Block {
        ASN1Block::Sequence(0, vec![ASN1Block::ObjectIdentifier(0, X25519_OID.clone())])
    }

    fn check_algorithm(block: Option<&ASN1Block>) -> Result<(), SodiumError> {
        let oid = match block {
            Some(ASN1Block::Sequence(_, items)) => match items.get(0) {
                Some(ASN1Block::ObjectIdentifier(_, oid)) => oid,
                _ => return Err(SodiumError::InvalidKeyFormat),
            },
            _ => return Err(SodiumError::InvalidKeyFormat),
        };
        if *oid == *X25519_OID {
            Ok(())
        } else {
            Err(SodiumError::UnsupportedKeyAlgorithm)
        }
    }

    fn outer_sequence(der: &[u8]) -> Result<Vec<ASN1Block>, SodiumError> {
        let mut blocks = simple_asn1::from_der(der)?;
        if blocks.len() != 1 {
            return Err(SodiumError::InvalidKeyFormat);
        }
        match blocks.remove(0) {
            ASN1Block::Sequence(_, items) => Ok(items),
            _ => Err(SodiumError::InvalidKeyFormat),
        }
    }

    pub fn encode_public_key(raw: &[u8]) -> Vec<u8> {
        let spki = ASN1Block::Sequence(
            0,
            vec![
                algorithm_identifier(),
                ASN1Block::BitString(0, raw.len() * 8, raw.to_vec()),
            ],
        );
        simple_asn1::to_der(&spki).expect("DER-encoding of PublicKey cannot fail")
    }

    pub fn decode_public_key(der: &[u8]) -> Result<Vec<u8>, SodiumError> {
        let items = outer_sequence(der)?;
        check_algorithm(items.get(0))?;
        match items.get(1) {
            Some(ASN1Block::BitString(_, nbits, bits)) if *nbits == PUBLICKEYBYTES * 8 => {
                Ok(bits.clone())
            }
            Some(ASN1Block::BitString(_, _, _)) => Err(SodiumError::IncorrectKeyLength),
            _ => Err(SodiumError::InvalidKeyFormat),
        }
    }

    pub fn encode_secret_key(raw: &[u8]) -> Zeroizing<Vec<u8>> {
        // The key itself is an OCTET STRING nested inside the privateKey
        // OCTET STRING.
        let inner = Zeroizing::new(
            simple_asn1::to_der(&ASN1Block::OctetString(0, raw.to_vec()))
                .expect("DER-encoding of SecretKey cannot fail"),
        );
        let pkcs8 = ASN1Block::Sequence(
            0,
            vec![
                ASN1Block::Integer(0, BigInt::from(0u8)),
                algorithm_identifier(),
                ASN1Block::OctetString(0, inner.to_vec()),
            ],
        );
        Zeroizing::new(simple_asn1::to_der(&pkcs8).expect("DER-encoding of SecretKey cannot fail"))
    }

    pub fn decode_secret_key(der: &[u8]) -> Result<Zeroizing<Vec<u8>>, SodiumError> {
        let items = outer_sequence(der)?;
        match items.get(0) {
            Some(ASN1Block::Integer(_, version)) if *version == BigInt::from(0u8) => {}
            _ => return Err(SodiumError::InvalidKeyFormat),
        }
        check_algorithm(items.get(1))?;
        let wrapped = match items.get(2) {
            Some(ASN1Block::OctetString(_, wrapped)) => wrapped,
            _ => return Err(SodiumError::InvalidKeyFormat),
        };
        match simple_asn1::from_der(wrapped)?.get(0) {
            Some(ASN1Block::OctetString(_, raw)) if raw.len() == SECRETKEYBYTES => {
                Ok(Zeroizing::new(raw.clone()))
            }
            Some(ASN1Block::OctetString(_, _)) => Err(SodiumError::IncorrectKeyLength),
            _ => Err(SodiumError::InvalidKeyFormat),
        }
    }
}
