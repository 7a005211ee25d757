//! Cookie Management Infrastructure
//!
//! Builds and parses the cookie strings a page script exchanges with
//! `document.cookie`. Script-written cookies cannot be `HttpOnly`, so that
//! attribute is not modelled here.

use std::fmt;

/// `SameSite` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

/// Attributes of the credential cookie
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    /// Only sent over https
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    /// `None` makes a session cookie
    pub max_age_secs: Option<i64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "authToken".to_string(),
            secure: true,
            same_site: SameSite::Strict,
            path: "/".to_string(),
            max_age_secs: Some(7 * 24 * 3600), // 7 days
        }
    }
}

impl CookieConfig {
    /// Build the string assigned to `document.cookie` to store `value`
    pub fn build_set_cookie(&self, value: &str) -> String {
        self.assignment(&urlencoding::encode(value), self.max_age_secs)
    }

    /// Build the string that expires the cookie immediately
    ///
    /// Path and SameSite must match the original write or the browser
    /// treats it as a different cookie.
    pub fn build_delete_cookie(&self) -> String {
        self.assignment("", Some(0))
    }

    fn assignment(&self, encoded_value: &str, max_age_secs: Option<i64>) -> String {
        let mut parts = vec![
            format!("{}={}", self.name, encoded_value),
            format!("Path={}", self.path),
            format!("SameSite={}", self.same_site),
        ];
        if self.secure {
            parts.push("Secure".to_string());
        }
        if let Some(max_age) = max_age_secs {
            parts.push(format!("Max-Age={max_age}"));
        }
        parts.join("; ")
    }
}

/// Extract a cookie value from a `document.cookie` style string
///
/// Values are percent-decoded; a value that fails to decode is returned raw.
pub fn extract_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|cookie| {
        let (key, value) = cookie.trim().split_once('=')?;

        if key == name {
            Some(
                urlencoding::decode(value)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| value.to_string()),
            )
        } else {
            None
        }
    })
}

/// A parsed `name=value; Attr=...` assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAssignment {
    pub name: String,
    pub value: String,
    pub max_age_secs: Option<i64>,
}

impl CookieAssignment {
    /// Parse the string a script assigns to `document.cookie`
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(';');
        let (name, value) = parts.next()?.trim().split_once('=')?;
        if name.is_empty() {
            return None;
        }

        let max_age_secs = parts.find_map(|attr| {
            let (key, value) = attr.trim().split_once('=')?;
            if key.eq_ignore_ascii_case("max-age") {
                value.trim().parse::<i64>().ok()
            } else {
                None
            }
        });

        Some(Self {
            name: name.to_string(),
            value: value.to_string(),
            max_age_secs,
        })
    }

    /// Whether applying this assignment deletes the cookie
    pub fn is_expired(&self) -> bool {
        matches!(self.max_age_secs, Some(age) if age <= 0)
    }
}
