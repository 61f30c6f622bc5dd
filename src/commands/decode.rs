//! Token decoding and display

use crate::codec::Codec;
use crate::error::TokenError;
use crate::token::claims;
use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose};
use chrono::Utc;
use jsonwebtoken::decode_header;
use serde_json::{Map, Value};

use super::format_timestamp;

/// Outcome of decoding a token for display
#[derive(Debug)]
pub struct DecodedToken {
    pub algorithm: String,
    pub claims: Map<String, Value>,
    pub status: String,
}

/// Verify a token with the codec and collect its wire claims
pub fn decode_token(codec: &Codec, raw: &str) -> Result<DecodedToken> {
    let header = decode_header(raw).context("Failed to decode token header")?;

    let token = match codec.decode_and_verify(raw) {
        Ok(token) => token,
        Err(TokenError::ExpiredToken) => anyhow::bail!("Token has expired"),
        Err(e) => return Err(e).context("Token verification failed"),
    };

    let claims = claims::to_wire(&token);
    let status = validation_status(claims.get("exp").and_then(Value::as_i64));

    Ok(DecodedToken {
        algorithm: format!("{:?}", header.alg),
        claims,
        status,
    })
}

/// Read the payload without checking the signature
///
/// Only for inspecting tokens signed with a key that is not configured.
pub fn inspect_token(raw: &str) -> Result<DecodedToken> {
    let header = decode_header(raw).context("Failed to decode token header")?;

    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() != 3 {
        anyhow::bail!(
            "Invalid token format - expected 3 parts separated by dots, got {} parts",
            parts.len()
        );
    }

    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .context("Failed to decode token payload")?;
    let claims: Map<String, Value> =
        serde_json::from_slice(&payload_bytes).context("Failed to parse token claims")?;

    let status = format!(
        "UNVERIFIED ({})",
        validation_status(claims.get("exp").and_then(Value::as_i64))
    );

    Ok(DecodedToken {
        algorithm: format!("{:?}", header.alg),
        claims,
        status,
    })
}

/// Print a decoded token
pub fn print_decoded(decoded: &DecodedToken) -> Result<()> {
    println!("Algorithm: {}", decoded.algorithm);
    println!();
    println!("Claims:");
    println!(
        "{}",
        serde_json::to_string_pretty(&decoded.claims).context("Failed to render claims")?
    );

    if let Some(exp) = decoded.claims.get("exp").and_then(Value::as_i64) {
        println!();
        println!("Expires: {}", format_timestamp(exp));
    }

    println!();
    println!("Status: {}", decoded.status);
    Ok(())
}

fn validation_status(exp: Option<i64>) -> String {
    let Some(exp) = exp else {
        return "NO EXPIRY (rejected by the default validator)".to_string();
    };

    let now = Utc::now().timestamp();
    if exp <= now {
        return "EXPIRED".to_string();
    }

    let remaining = exp - now;
    let hours = remaining / 3600;
    let minutes = (remaining % 3600) / 60;

    if hours > 0 {
        format!(
            "VALID (expires in {} hour{} {} minute{})",
            hours,
            if hours == 1 { "" } else { "s" },
            minutes,
            if minutes == 1 { "" } else { "s" }
        )
    } else if minutes > 0 {
        format!(
            "VALID (expires in {} minute{})",
            minutes,
            if minutes == 1 { "" } else { "s" }
        )
    } else {
        format!(
            "VALID (expires in {} second{})",
            remaining,
            if remaining == 1 { "" } else { "s" }
        )
    }
}
