//! Token minting from the command line

use crate::codec::Codec;
use crate::token::AccessToken;
use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use serde_json::Value;

/// Inputs for minting a token
#[derive(Debug, Clone, Default)]
pub struct MintTokenConfig {
    pub subject: String,
    pub issuer: Option<String>,
    pub id: Option<String>,
    pub scope: Option<String>,
    pub expires_in: u64,
    pub claim_strings: Vec<String>,
    pub actor_subject: Option<String>,
}

/// Parse custom claims from key=value strings
///
/// Integers and booleans keep their JSON type; anything else is a string.
pub fn parse_custom_claims(claim_strings: &[String]) -> Result<Vec<(String, Value)>> {
    claim_strings
        .iter()
        .map(|claim_str| {
            let Some((key, value)) = claim_str.split_once('=') else {
                anyhow::bail!(
                    "Invalid claim format '{}'.\nExpected format: key=value",
                    claim_str
                );
            };

            let json_value = if let Ok(num) = value.parse::<i64>() {
                Value::Number(num.into())
            } else if let Ok(b) = value.parse::<bool>() {
                Value::Bool(b)
            } else {
                Value::String(value.to_string())
            };

            Ok((key.to_string(), json_value))
        })
        .collect()
}

/// Build the token described by `config`
pub fn build_token(config: &MintTokenConfig) -> Result<AccessToken> {
    let expires_at = i64::try_from(config.expires_in)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .with_context(|| format!("--expires-in {} is too large", config.expires_in))?;
    let mut token = AccessToken::new(config.subject.clone(), expires_at);

    token.set_id(config.id.clone());
    token.set_issuer(config.issuer.clone());
    token.set_scope(config.scope.clone());

    for (key, value) in parse_custom_claims(&config.claim_strings)? {
        token
            .set_attribute(key, value)
            .context("Custom claims cannot replace reserved claims")?;
    }

    if let Some(actor) = &config.actor_subject {
        token.set_actor(Some(AccessToken::default().with_subject(actor.clone())));
    }

    Ok(token)
}

/// Mint and sign a token
pub fn mint_token(codec: &Codec, config: &MintTokenConfig) -> Result<String> {
    let token = build_token(config)?;
    codec
        .serialize(&token)
        .context("Failed to sign token (is a private key configured?)")
}
