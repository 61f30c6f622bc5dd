//! Claim-name translation between `AccessToken` fields and claim maps
//!
//! The same routine serves two vocabularies: wire claims (`iss`, `sub`,
//! `exp`, `act`, ...) used inside signed tokens, and field names (`issuer`,
//! `subject`, `expires_at`, `actor`, ...) used when a token is built from a
//! loose map. Actors recurse through the same routine.

use super::AccessToken;
use crate::error::{InvalidTokenKind, Result, TokenError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Deepest actor chain accepted when reading untrusted claims
pub const MAX_ACTOR_DEPTH: usize = 16;

/// Names of the six reserved claims in one vocabulary
pub(crate) struct ClaimNames {
    pub id: &'static str,
    pub issuer: &'static str,
    pub subject: &'static str,
    pub scope: &'static str,
    pub expires_at: &'static str,
    pub actor: &'static str,
}

impl ClaimNames {
    fn contains(&self, name: &str) -> bool {
        [
            self.id,
            self.issuer,
            self.subject,
            self.scope,
            self.expires_at,
            self.actor,
        ]
        .contains(&name)
    }
}

/// Claim names as they appear on the wire
pub(crate) const WIRE: ClaimNames = ClaimNames {
    id: "id",
    issuer: "iss",
    subject: "sub",
    scope: "scope",
    expires_at: "exp",
    actor: "act",
};

/// Claim names as they appear on `AccessToken`
pub(crate) const FIELDS: ClaimNames = ClaimNames {
    id: "id",
    issuer: "issuer",
    subject: "subject",
    scope: "scope",
    expires_at: "expires_at",
    actor: "actor",
};

/// True when `name` may not live in the extra attribute bag
pub(crate) fn is_reserved(name: &str) -> bool {
    WIRE.contains(name) || FIELDS.contains(name)
}

/// Build the outbound wire claim set for a token
///
/// Reserved claims go in first and extras are only added under names not
/// already taken, so an extra attribute never shadows a reserved claim.
pub(crate) fn to_wire(token: &AccessToken) -> Map<String, Value> {
    to_map(token, &WIRE)
}

pub(crate) fn to_map(token: &AccessToken, names: &ClaimNames) -> Map<String, Value> {
    let mut claims = Map::new();

    if let Some(id) = &token.id {
        claims.insert(names.id.to_string(), Value::String(id.clone()));
    }
    if let Some(issuer) = &token.issuer {
        claims.insert(names.issuer.to_string(), Value::String(issuer.clone()));
    }
    if let Some(subject) = &token.subject {
        claims.insert(names.subject.to_string(), Value::String(subject.clone()));
    }
    if let Some(scope) = &token.scope {
        claims.insert(names.scope.to_string(), Value::String(scope.clone()));
    }
    // A missing expiry stays missing; it never becomes 0
    if let Some(expires_at) = token.expires_at {
        claims.insert(
            names.expires_at.to_string(),
            Value::from(expires_at.timestamp()),
        );
    }
    if let Some(actor) = &token.actor {
        claims.insert(names.actor.to_string(), Value::Object(to_map(actor, names)));
    }

    for (key, value) in &token.attributes {
        claims
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }

    claims
}

/// Rebuild a token from decoded wire claims
pub(crate) fn from_wire(claims: Map<String, Value>) -> Result<AccessToken> {
    from_map(claims, &WIRE, 0)
}

pub(crate) fn from_map(
    mut claims: Map<String, Value>,
    names: &ClaimNames,
    depth: usize,
) -> Result<AccessToken> {
    if depth > MAX_ACTOR_DEPTH {
        return Err(TokenError::InvalidToken(InvalidTokenKind::ActorDepth));
    }

    let id = take_string(&mut claims, names.id)?;
    let issuer = take_string(&mut claims, names.issuer)?;
    let subject = take_string(&mut claims, names.subject)?;
    let scope = take_string(&mut claims, names.scope)?;
    let expires_at = take_timestamp(&mut claims, names.expires_at)?;

    let actor = match claims.remove(names.actor) {
        None | Some(Value::Null) => None,
        Some(Value::Object(nested)) => Some(Box::new(from_map(nested, names, depth + 1)?)),
        Some(_) => {
            return Err(TokenError::malformed(format!(
                "'{}' claim must be an object",
                names.actor
            )));
        }
    };

    // Whatever is left is an extra attribute; nulls carry no information
    let attributes: BTreeMap<String, Value> = claims
        .into_iter()
        .filter(|(key, value)| !value.is_null() && !is_reserved(key))
        .collect();

    Ok(AccessToken {
        id,
        issuer,
        subject,
        scope,
        expires_at,
        actor,
        attributes,
        raw: None,
    })
}

fn take_string(claims: &mut Map<String, Value>, name: &str) -> Result<Option<String>> {
    match claims.remove(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(TokenError::malformed(format!(
            "'{name}' claim must be a string, got {other}"
        ))),
    }
}

/// Read an expiry as whole seconds since the epoch
///
/// Numbers are accepted in both vocabularies. RFC 3339 strings only ever
/// arrive through `AccessToken::from_fields`: on the wire, a non-numeric
/// `exp` is already rejected by signature validation.
fn take_timestamp(claims: &mut Map<String, Value>, name: &str) -> Result<Option<DateTime<Utc>>> {
    let value = match claims.remove(name) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let parsed = match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.floor() as i64))
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    };

    parsed.map(Some).ok_or_else(|| {
        TokenError::malformed(format!("'{name}' claim is not a valid timestamp: {value}"))
    })
}
