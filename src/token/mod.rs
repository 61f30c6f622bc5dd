//! The access token model
//!
//! An `AccessToken` is either decoded from a signed compact string (and then
//! remembers that string in `raw`) or built field by field to be signed later.
//! Every setter drops `raw`, so a mutated token is always re-encoded.

pub mod claims;

use crate::codec::Codec;
use crate::error::{Result, TokenError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Claims-based access token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessToken {
    pub(crate) id: Option<String>,
    pub(crate) issuer: Option<String>,
    pub(crate) subject: Option<String>,
    pub(crate) scope: Option<String>,
    pub(crate) expires_at: Option<DateTime<Utc>>,
    pub(crate) actor: Option<Box<AccessToken>>,
    pub(crate) attributes: BTreeMap<String, Value>,
    pub(crate) raw: Option<String>,
}

impl AccessToken {
    /// Token with the two fields required for signing
    pub fn new(subject: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self::default()
            .with_subject(subject)
            .with_expires_at(expires_at)
    }

    /// Build a token from a loose map keyed by field name
    ///
    /// Recognizes `id`, `issuer`, `subject`, `scope`, `expires_at` (integer
    /// seconds or RFC 3339) and `actor` (a nested map); every other non-null
    /// entry becomes an extra attribute.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self> {
        claims::from_map(fields, &claims::FIELDS, 0)
    }

    /// Decode and verify a signed compact string
    pub fn decode(raw: &str, codec: &Codec) -> Result<Self> {
        codec.decode_and_verify(raw)
    }

    /// Signed compact form of this token
    ///
    /// Returns the original string untouched for an unmodified decoded token.
    pub fn serialize(&self, codec: &Codec) -> Result<String> {
        codec.serialize(self)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Identity acting on behalf of the subject, if any
    pub fn actor(&self) -> Option<&AccessToken> {
        self.actor.as_deref()
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// The signed string this token was decoded from, while unmodified
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Look up a declared field or an extra attribute by name
    ///
    /// Declared fields that are unset read as `Value::Null`. A name that is
    /// neither declared nor present among the extras is an error.
    pub fn attribute(&self, name: &str) -> Result<Value> {
        let declared = match name {
            "id" => self.id.clone().map(Value::String),
            "issuer" => self.issuer.clone().map(Value::String),
            "subject" => self.subject.clone().map(Value::String),
            "scope" => self.scope.clone().map(Value::String),
            "expires_at" => self.expires_at.map(|t| Value::from(t.timestamp())),
            "actor" => self
                .actor
                .as_deref()
                .map(|actor| Value::Object(claims::to_map(actor, &claims::FIELDS))),
            _ => {
                return self
                    .attributes
                    .get(name)
                    .cloned()
                    .ok_or_else(|| TokenError::UnknownAttribute(name.to_string()));
            }
        };
        Ok(declared.unwrap_or(Value::Null))
    }

    /// True if the token carries no expiry or the expiry has passed
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at < Utc::now(),
            None => true,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.raw = None;
        self.id = id;
    }

    pub fn set_issuer(&mut self, issuer: Option<String>) {
        self.raw = None;
        self.issuer = issuer;
    }

    pub fn set_subject(&mut self, subject: Option<String>) {
        self.raw = None;
        self.subject = subject;
    }

    pub fn set_scope(&mut self, scope: Option<String>) {
        self.raw = None;
        self.scope = scope;
    }

    pub fn set_expires_at(&mut self, expires_at: Option<DateTime<Utc>>) {
        self.raw = None;
        self.expires_at = expires_at;
    }

    pub fn set_actor(&mut self, actor: Option<AccessToken>) {
        self.raw = None;
        self.actor = actor.map(|mut actor| {
            // Only the outermost token may cache a signed string
            actor.raw = None;
            Box::new(actor)
        });
    }

    /// Mutable access to the actor; the signed cache is dropped up front
    pub fn actor_mut(&mut self) -> Option<&mut AccessToken> {
        self.raw = None;
        self.actor.as_deref_mut()
    }

    /// Set an extra claim; `Value::Null` removes it
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let name = name.into();
        if claims::is_reserved(&name) {
            return Err(TokenError::ReservedAttribute(name));
        }

        self.raw = None;
        let value = value.into();
        if value.is_null() {
            self.attributes.remove(&name);
        } else {
            self.attributes.insert(name, value);
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        let removed = self.attributes.remove(name);
        if removed.is_some() {
            self.raw = None;
        }
        removed
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.set_id(Some(id.into()));
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.set_issuer(Some(issuer.into()));
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.set_subject(Some(subject.into()));
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.set_scope(Some(scope.into()));
        self
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.set_expires_at(Some(expires_at));
        self
    }

    pub fn with_actor(mut self, actor: AccessToken) -> Self {
        self.set_actor(Some(actor));
        self
    }

    /// Builder form of `set_attribute`
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        self.set_attribute(name, value)?;
        Ok(self)
    }
}
