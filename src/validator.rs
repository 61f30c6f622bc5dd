//! Pluggable token validation
//!
//! A validator decides whether a verified token may be used. Returning
//! `Ok(false)` and returning an error both mean "reject"; the two call sites
//! in the session adapter differ only in how they report that.

use crate::token::AccessToken;

/// Policy check run after signature and expiry verification
pub trait Validator: Send + Sync {
    fn evaluate(&self, token: &AccessToken) -> anyhow::Result<bool>;
}

/// Accepts tokens that carry an expiry in the future
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpiryValidator;

impl Validator for ExpiryValidator {
    fn evaluate(&self, token: &AccessToken) -> anyhow::Result<bool> {
        Ok(token.is_valid())
    }
}

impl<F> Validator for F
where
    F: Fn(&AccessToken) -> anyhow::Result<bool> + Send + Sync,
{
    fn evaluate(&self, token: &AccessToken) -> anyhow::Result<bool> {
        self(token)
    }
}
