//! Refresh-token cookie construction and cookie header parsing.
//!
//! Logout only tells the browser to drop the cookie. The refresh token it
//! held stays cryptographically valid until its own `exp`.

use axum::http::header;
use chrono::{DateTime, Utc};

use crate::policy::AuthPolicy;

/// `Expires` attribute format (IMF-fixdate).
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub value: String,
    pub expires: DateTime<Utc>,
    /// Seconds; negative means "delete now"
    pub max_age: i64,
    pub same_site: SameSite,
    pub http_only: bool,
    pub secure: bool,
}

impl Cookie {
    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(domain) = &self.domain {
            out.push_str("; Domain=");
            out.push_str(domain);
        }
        out.push_str(&format!(
            "; Expires={}; Max-Age={}",
            self.expires.format(HTTP_DATE_FORMAT),
            self.max_age
        ));
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if self.secure {
            out.push_str("; Secure");
        }
        out.push_str("; SameSite=");
        out.push_str(self.same_site.as_str());
        out
    }
}

/// Cookie carrying a freshly issued refresh token.
pub fn encode_refresh_cookie(token: &str, policy: &AuthPolicy, now: DateTime<Utc>) -> Cookie {
    Cookie {
        name: policy.cookie_name.clone(),
        path: policy.cookie_path.clone(),
        domain: policy.cookie_domain.clone(),
        value: token.to_string(),
        expires: now
            .checked_add_signed(policy.refresh_lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
        max_age: policy.refresh_lifetime.num_seconds(),
        same_site: policy.cookie_same_site,
        http_only: true,
        secure: true,
    }
}

/// Sentinel cookie instructing the browser to forget the refresh cookie.
pub fn encode_expired_cookie(policy: &AuthPolicy) -> Cookie {
    Cookie {
        name: policy.cookie_name.clone(),
        path: policy.cookie_path.clone(),
        domain: policy.cookie_domain.clone(),
        value: String::new(),
        expires: DateTime::<Utc>::UNIX_EPOCH,
        max_age: -1,
        same_site: policy.cookie_same_site,
        http_only: true,
        secure: true,
    }
}

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}
