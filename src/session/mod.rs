//! Session adapter for a host web framework
//!
//! `Authenticator` is built once per process and holds the codec, the
//! validator and cookie settings. For each request the host creates a
//! `RequestSession` over the request headers and its cookie jar; decoded
//! tokens are cached there and dropped with it.
//!
//! Tokens from the `Authorization` header report every failure to the
//! caller. Tokens from the session cookie never do: any failure clears the
//! cookie and the session reads as absent. Cookie tokens are always
//! downgraded to the read-only scope.

pub mod cookies;

use crate::codec::Codec;
use crate::config::{Config, CookieOptions};
use crate::error::{InvalidTokenKind, Result, TokenError};
use crate::token::AccessToken;
use crate::validator::{ExpiryValidator, Validator};
use cookie::{Cookie, CookieJar};
use http::HeaderMap;
use http::header::AUTHORIZATION;
use std::sync::Arc;
use time::OffsetDateTime;

pub use cookies::CookieOverrides;

/// Scope forced onto every token persisted in or read from the session cookie
pub const READ_ONLY_SCOPE: &str = "read";

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header
///
/// Returns `None` when the header is absent, not valid text, uses another
/// scheme, or carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

/// Process-wide token services for the host framework
#[derive(Clone)]
pub struct Authenticator {
    codec: Codec,
    validator: Arc<dyn Validator>,
    cookie: CookieOptions,
}

impl Authenticator {
    /// Build from configuration with the default expiry validator
    pub fn new(config: &Config) -> Self {
        Self {
            codec: Codec::new(config),
            validator: Arc::new(ExpiryValidator),
            cookie: config.cookie.clone(),
        }
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie.name
    }

    pub fn cookie_options(&self) -> &CookieOptions {
        &self.cookie
    }

    /// Run the validator, turning both `false` and errors into `InvalidToken`
    pub fn validate_token<'t>(&self, token: &'t AccessToken) -> Result<&'t AccessToken> {
        match self.validator.evaluate(token) {
            Ok(true) => Ok(token),
            Ok(false) => Err(TokenError::InvalidToken(
                InvalidTokenKind::RejectedByValidator,
            )),
            Err(e) => {
                tracing::debug!("Validator failed: {e:#}");
                Err(TokenError::InvalidToken(
                    InvalidTokenKind::RejectedByValidator,
                ))
            }
        }
    }

    /// Non-failing probe: the token if the validator accepts it, else `None`
    pub fn check_token<'t>(&self, token: &'t AccessToken) -> Option<&'t AccessToken> {
        self.validate_token(token).ok()
    }

    /// Downgrade, sign and wrap a token into the session cookie
    ///
    /// The caller's token is left downgraded. The cookie expires with the token.
    pub fn sessionize_token(&self, token: &mut AccessToken) -> Result<Cookie<'static>> {
        token.set_scope(Some(READ_ONLY_SCOPE.to_string()));
        let value = self.codec.serialize(token)?;

        let mut overrides = CookieOverrides::default();
        if let Some(expires_at) = token.expires_at() {
            overrides.expires = OffsetDateTime::from_unix_timestamp(expires_at.timestamp()).ok();
        }

        Ok(cookies::build_cookie(
            &self.cookie.name,
            &value,
            &self.cookie,
            &overrides,
        ))
    }

    /// Start the per-request view over headers and cookies
    pub fn request<'a>(&'a self, headers: &'a HeaderMap, jar: &'a mut CookieJar) -> RequestSession<'a> {
        RequestSession {
            auth: self,
            headers,
            jar,
            current: None,
            session: SessionState::Unresolved,
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("codec", &self.codec)
            .field("cookie", &self.cookie)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
enum SessionState {
    Unresolved,
    Absent,
    Present(AccessToken),
}

/// Request-scoped token state
pub struct RequestSession<'a> {
    auth: &'a Authenticator,
    headers: &'a HeaderMap,
    jar: &'a mut CookieJar,
    current: Option<AccessToken>,
    session: SessionState,
}

impl<'a> RequestSession<'a> {
    pub fn bearer_token(&self) -> Option<&'a str> {
        bearer_token(self.headers)
    }

    /// The validated bearer token, decoded once per request
    ///
    /// `Ok(None)` when no bearer token was sent. Decode, expiry and
    /// validator failures are returned to the caller.
    pub fn current_token(&mut self) -> Result<Option<&AccessToken>> {
        if self.current.is_none() {
            let Some(raw) = self.bearer_token() else {
                return Ok(None);
            };
            let token = self.auth.codec.decode_and_verify(raw)?;
            self.auth.validate_token(&token)?;
            self.current = Some(token);
        }
        Ok(self.current.as_ref())
    }

    pub fn token_scope(&mut self) -> Result<Option<&str>> {
        Ok(self.current_token()?.and_then(AccessToken::scope))
    }

    pub fn token_subject(&mut self) -> Result<Option<&str>> {
        Ok(self.current_token()?.and_then(AccessToken::subject))
    }

    /// The downgraded session token, or `None`
    ///
    /// A cookie that fails to decode or validate is removed from the jar.
    pub fn session_token(&mut self) -> Option<&AccessToken> {
        if matches!(self.session, SessionState::Unresolved) {
            self.session = match self.load_session_token() {
                Ok(Some(token)) => SessionState::Present(token),
                Ok(None) => SessionState::Absent,
                Err(e) => {
                    tracing::debug!("Discarding session cookie: {e}");
                    self.clear_session_token();
                    SessionState::Absent
                }
            };
        }

        match &self.session {
            SessionState::Present(token) => Some(token),
            _ => None,
        }
    }

    pub fn session_subject(&mut self) -> Option<&str> {
        self.session_token().and_then(AccessToken::subject)
    }

    fn load_session_token(&self) -> Result<Option<AccessToken>> {
        let Some(cookie) = self.jar.get(self.auth.cookie_name()) else {
            return Ok(None);
        };

        let mut token = self.auth.codec.decode_and_verify(cookie.value())?;
        self.auth.validate_token(&token)?;
        token.set_scope(Some(READ_ONLY_SCOPE.to_string()));
        Ok(Some(token))
    }

    /// Sessionize `token` and write it into the jar
    pub fn store_session_token(&mut self, token: &mut AccessToken) -> Result<()> {
        let cookie = self.auth.sessionize_token(token)?;
        self.jar.add(cookie);
        self.session = SessionState::Unresolved;
        Ok(())
    }

    pub fn clear_session_token(&mut self) {
        cookies::remove_cookie(&mut *self.jar, &self.auth.cookie.name, &self.auth.cookie);
        self.session = SessionState::Absent;
    }

    pub fn write_shared_cookie(&mut self, name: &str, value: &str, overrides: &CookieOverrides) {
        cookies::write_shared_cookie(&mut *self.jar, &self.auth.cookie, name, value, overrides);
    }

    pub fn read_shared_cookie(&self, name: &str) -> Option<&str> {
        cookies::read_shared_cookie(&*self.jar, name)
    }

    pub fn fetch_shared_cookie<F>(&mut self, name: &str, overrides: &CookieOverrides, default: F) -> String
    where
        F: FnOnce() -> String,
    {
        cookies::fetch_shared_cookie(&mut *self.jar, &self.auth.cookie, name, overrides, default)
    }

    pub fn delete_shared_cookie(&mut self, name: &str) {
        cookies::delete_shared_cookie(&mut *self.jar, &self.auth.cookie, name);
    }

    /// The jar as modified so far; its delta is what the host sends back
    pub fn jar(&self) -> &CookieJar {
        &*self.jar
    }
}
