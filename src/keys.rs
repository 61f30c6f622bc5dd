//! RSA key parsing
//!
//! Keys are parsed once with `rsa` and handed to `jsonwebtoken` as PKCS#1
//! DER, which accepts PKCS#1 and PKCS#8 input alike. When a private key is
//! configured the verification key is derived from it.

use crate::config::KeyMaterial;
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};

/// Parse an RSA private key from PKCS#8 or PKCS#1, PEM or DER
pub fn parse_private_key(material: &KeyMaterial) -> Option<RsaPrivateKey> {
    match material {
        KeyMaterial::Pem(pem) => RsaPrivateKey::from_pkcs8_pem(pem)
            .ok()
            .or_else(|| RsaPrivateKey::from_pkcs1_pem(pem).ok()),
        KeyMaterial::Der(der) => RsaPrivateKey::from_pkcs1_der(der)
            .ok()
            .or_else(|| RsaPrivateKey::from_pkcs8_der(der).ok()),
    }
}

/// Parse an RSA public key from SubjectPublicKeyInfo or PKCS#1, PEM or DER
pub fn parse_public_key(material: &KeyMaterial) -> Option<RsaPublicKey> {
    match material {
        KeyMaterial::Pem(pem) => RsaPublicKey::from_public_key_pem(pem)
            .ok()
            .or_else(|| RsaPublicKey::from_pkcs1_pem(pem).ok()),
        KeyMaterial::Der(der) => RsaPublicKey::from_pkcs1_der(der)
            .ok()
            .or_else(|| RsaPublicKey::from_public_key_der(der).ok()),
    }
}

/// Build the signing key, or `None` when the material is not an RSA private key
pub fn signing_key(material: &KeyMaterial) -> Option<EncodingKey> {
    let private_key = parse_private_key(material)?;
    let der = private_key.to_pkcs1_der().ok()?;
    Some(EncodingKey::from_rsa_der(der.as_bytes()))
}

/// Build the verification key
///
/// A configured private key takes precedence: its public half is used even
/// if a public key is also configured.
pub fn verification_key(
    private: Option<&KeyMaterial>,
    public: Option<&KeyMaterial>,
) -> Option<DecodingKey> {
    let public_key = private
        .and_then(parse_private_key)
        .map(|private_key| RsaPublicKey::from(&private_key))
        .or_else(|| public.and_then(parse_public_key))?;

    let der = public_key.to_pkcs1_der().ok()?;
    Some(DecodingKey::from_rsa_der(der.as_bytes()))
}
