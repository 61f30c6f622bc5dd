//! RSA keypair generation

use anyhow::{Context, Result};
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fs;
use std::path::{Path, PathBuf};

/// Default RSA modulus size
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Smallest modulus accepted for signing keys
pub const MIN_KEY_BITS: usize = 1024;

/// Where a generated keypair was written
#[derive(Debug, Clone)]
pub struct KeyPaths {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

/// Generate an RSA keypair as PKCS#8 / SPKI PEM files in `dir`
pub fn generate_keypair(dir: &Path, bits: usize, force: bool) -> Result<KeyPaths> {
    if bits < MIN_KEY_BITS {
        anyhow::bail!("Key size {bits} is too small; use at least {MIN_KEY_BITS} bits");
    }

    let private_key_path = dir.join("private.pem");
    let public_key_path = dir.join("public.pem");

    // Check if keys already exist
    if (private_key_path.exists() || public_key_path.exists()) && !force {
        anyhow::bail!(
            "Keypair already exists in {}.\nUse --force to overwrite.",
            dir.display()
        );
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    tracing::info!("Generating RSA-{bits} keypair");
    let mut rng = rand::thread_rng();
    let private_key =
        RsaPrivateKey::new(&mut rng, bits).context("Failed to generate private key")?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .context("Failed to encode private key to PEM")?;
    let public_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .context("Failed to encode public key to PEM")?;

    fs::write(&private_key_path, private_pem.as_bytes()).with_context(|| {
        format!(
            "Failed to write private key to {}",
            private_key_path.display()
        )
    })?;
    fs::write(&public_key_path, public_pem.as_bytes()).with_context(|| {
        format!(
            "Failed to write public key to {}",
            public_key_path.display()
        )
    })?;

    // Private key readable by the owner only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&private_key_path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&private_key_path, perms)?;
    }

    #[cfg(not(unix))]
    tracing::warn!("Cannot restrict private key permissions on this platform");

    Ok(KeyPaths {
        private_key: private_key_path,
        public_key: public_key_path,
    })
}
