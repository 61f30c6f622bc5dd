//! Cookie construction and the shared-cookie helpers
//!
//! Every cookie written here starts from the configured `CookieOptions` and
//! then applies per-call `CookieOverrides`. Values are opaque strings.

use crate::config::{CookieOptions, SameSitePolicy};
use cookie::{Cookie, CookieJar};
use time::OffsetDateTime;

/// Per-call adjustments layered over the configured cookie attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookieOverrides {
    pub domain: Option<String>,
    pub secure: Option<bool>,
    pub http_only: Option<bool>,
    pub path: Option<String>,
    pub same_site: Option<SameSitePolicy>,
    pub expires: Option<OffsetDateTime>,
    pub max_age: Option<time::Duration>,
}

impl CookieOverrides {
    pub fn expiring_at(expires: OffsetDateTime) -> Self {
        Self {
            expires: Some(expires),
            ..Self::default()
        }
    }
}

/// Merge configured attributes with overrides; overrides win field by field
pub fn merge_options(options: &CookieOptions, overrides: &CookieOverrides) -> CookieOptions {
    CookieOptions {
        name: options.name.clone(),
        domain: overrides.domain.clone().or_else(|| options.domain.clone()),
        secure: overrides.secure.unwrap_or(options.secure),
        http_only: overrides.http_only.unwrap_or(options.http_only),
        path: overrides.path.clone().unwrap_or_else(|| options.path.clone()),
        same_site: overrides.same_site.or(options.same_site),
    }
}

/// Build a cookie carrying the merged attributes
pub fn build_cookie(
    name: &str,
    value: &str,
    options: &CookieOptions,
    overrides: &CookieOverrides,
) -> Cookie<'static> {
    let merged = merge_options(options, overrides);

    let mut builder = Cookie::build((name.to_string(), value.to_string()))
        .path(merged.path)
        .secure(merged.secure)
        .http_only(merged.http_only);

    if let Some(domain) = merged.domain {
        builder = builder.domain(domain);
    }
    if let Some(same_site) = merged.same_site {
        builder = builder.same_site(same_site.into());
    }
    if let Some(expires) = overrides.expires {
        builder = builder.expires(expires);
    }
    if let Some(max_age) = overrides.max_age {
        builder = builder.max_age(max_age);
    }

    builder.build()
}

/// Removal needs the same path and domain the cookie was written with
pub(crate) fn remove_cookie(jar: &mut CookieJar, name: &str, options: &CookieOptions) {
    let mut builder = Cookie::build((name.to_string(), "")).path(options.path.clone());
    if let Some(domain) = &options.domain {
        builder = builder.domain(domain.clone());
    }
    jar.remove(builder.build());
}

pub fn write_shared_cookie(
    jar: &mut CookieJar,
    options: &CookieOptions,
    name: &str,
    value: &str,
    overrides: &CookieOverrides,
) {
    jar.add(build_cookie(name, value, options, overrides));
}

pub fn read_shared_cookie<'j>(jar: &'j CookieJar, name: &str) -> Option<&'j str> {
    jar.get(name).map(|cookie| cookie.value())
}

/// Read a shared cookie, writing `default()` first when it is absent
pub fn fetch_shared_cookie<F>(
    jar: &mut CookieJar,
    options: &CookieOptions,
    name: &str,
    overrides: &CookieOverrides,
    default: F,
) -> String
where
    F: FnOnce() -> String,
{
    if let Some(value) = read_shared_cookie(jar, name) {
        return value.to_string();
    }

    let value = default();
    write_shared_cookie(jar, options, name, &value, overrides);
    value
}

pub fn delete_shared_cookie(jar: &mut CookieJar, options: &CookieOptions, name: &str) {
    remove_cookie(jar, name, options);
}
