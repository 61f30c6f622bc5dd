//! Common test utilities and fixtures
//!
//! RSA key generation is slow, so each test binary generates its keypairs
//! once and shares the PEM strings.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use jsonwebtoken::EncodingKey;
use keystamp::{Codec, Config, KeyMaterial, SigningAlgorithm, keys::signing_key};
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// PEM encodings of one RSA keypair
pub struct TestKeys {
    pub private_pem: String,
    pub public_pem: String,
    pub public_pkcs1_pem: String,
}

fn generate() -> TestKeys {
    let mut rng = rand::thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("Failed to generate RSA key");
    let public_key = RsaPublicKey::from(&private_key);

    TestKeys {
        private_pem: private_key
            .to_pkcs8_pem(LineEnding::LF)
            .expect("Failed to encode private key")
            .to_string(),
        public_pem: public_key
            .to_public_key_pem(LineEnding::LF)
            .expect("Failed to encode public key"),
        public_pkcs1_pem: public_key
            .to_pkcs1_pem(LineEnding::LF)
            .expect("Failed to encode public key"),
    }
}

/// The keypair the codecs under test are configured with
pub fn keys() -> &'static TestKeys {
    static KEYS: OnceLock<TestKeys> = OnceLock::new();
    KEYS.get_or_init(generate)
}

/// An unrelated keypair, for forged tokens
pub fn other_keys() -> &'static TestKeys {
    static KEYS: OnceLock<TestKeys> = OnceLock::new();
    KEYS.get_or_init(generate)
}

/// Raw signing key for hand-built tokens
pub fn encoding_key() -> EncodingKey {
    signing_key(&KeyMaterial::from(keys().private_pem.clone())).expect("Test key is valid")
}

/// Config able to sign and verify
pub fn signing_config() -> Config {
    Config::default().with_private_key(keys().private_pem.clone())
}

/// Config that can only verify
pub fn verifying_config() -> Config {
    Config::default().with_public_key(keys().public_pem.clone())
}

pub fn signing_codec() -> Codec {
    Codec::new(&signing_config())
}

pub fn codec_with(algorithm: SigningAlgorithm) -> Codec {
    Codec::new(&signing_config().with_algorithm(algorithm))
}

/// `now + seconds`, truncated to whole seconds like a wire `exp`
pub fn in_seconds(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(Utc::now().timestamp() + seconds, 0).expect("Timestamp in range")
}

/// Write a config file referencing key files and return its path
pub fn create_test_config(
    dir: &Path,
    private_key: Option<&Path>,
    public_key: Option<&Path>,
) -> std::io::Result<PathBuf> {
    let config_path = dir.join("config.toml");
    let mut content = String::from("signing_algorithm = \"RS512\"\n");

    if let Some(path) = private_key {
        content.push_str(&format!("private_key_path = {:?}\n", path.display().to_string()));
    }
    if let Some(path) = public_key {
        content.push_str(&format!("public_key_path = {:?}\n", path.display().to_string()));
    }

    std::fs::write(&config_path, content)?;
    Ok(config_path)
}
