//! motionEye request signatures
//!
//! motionEye never receives the password itself. Every request carries the
//! username plus a SHA-1 signature computed over the method, the path and
//! query, the body and the SHA-1 of the password. The server recomputes the
//! same value and rejects the request with 403 on mismatch.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::{Digest, Sha1};
use url::Url;

/// Query parameter carrying the username
pub const USERNAME_PARAM: &str = "_username";
/// Query parameter carrying the signature
pub const SIGNATURE_PARAM: &str = "_signature";

/// Characters left untouched when quoting query values (JavaScript
/// `encodeURIComponent` semantics).
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Derive the signing key for a password.
pub fn password_key(password: &str) -> String {
    hex::encode(Sha1::digest(password.as_bytes()))
}

/// Compute the signature for a request.
///
/// `url` may already contain a `_signature` parameter; it is ignored.
/// Bodies starting with `---` are multipart attachments and are not signed.
pub fn compute_signature(method: &str, url: &Url, body: Option<&str>, key: &str) -> String {
    let mut query: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| *name != SIGNATURE_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    query.sort_by(|a, b| a.0.cmp(&b.0));

    let query = query
        .iter()
        .map(|(name, value)| format!("{}={}", name, utf8_percent_encode(value, QUERY_VALUE)))
        .collect::<Vec<_>>()
        .join("&");

    let mut path = url.path().to_string();
    if !query.is_empty() {
        path.push('?');
        path.push_str(&query);
    }

    let body = body
        .filter(|b| !b.starts_with("---"))
        .map(sanitize)
        .unwrap_or_default();

    let payload = format!(
        "{}:{}:{}:{}",
        method,
        sanitize(&path),
        body,
        sanitize(key)
    );
    hex::encode(Sha1::digest(payload.as_bytes()))
}

/// Replace every character the server does not sign with `-`.
fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| if is_signed_char(c) { c } else { '-' })
        .collect()
}

fn is_signed_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '/' | '?' | '_' | '.' | '=' | '&' | '{' | '}' | '[' | ']' | '"' | ':' | ',' | ' ' | '-'
        )
}
