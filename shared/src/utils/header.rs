//! Authorization header parsing

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// Returns `None` for a missing header, a different scheme, an empty token or
/// a value with trailing garbage. Never panics on malformed input.
pub fn extract_bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}
