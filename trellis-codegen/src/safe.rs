//! Injection-safe interpolation.
//!
//! Everything an emitter splices into generated source ultimately comes
//! from service metadata, which may not be trusted. Tokens and values are
//! validated against a deny-list of characters that could break out of the
//! surrounding syntax; a violation is fatal and rendering produces no
//! output at all.

use crate::error::Error;

/// Characters that can escape a token position: quotes, whitespace,
/// arithmetic and assignment operators, and the escape character.
const DENIED_IN_TOKENS: &[char] = &['"', ' ', '-', '+', '\\', '*', '=', '!'];

/// Validate an identifier-like token (type name, property name,
/// namespace segment).
pub fn safe_token(token: &str) -> Result<&str, Error> {
    if token.contains(DENIED_IN_TOKENS) {
        return Err(Error::UntrustedMetadata { value: token.to_string() });
    }
    Ok(token)
}

/// Validate a scalar value destined for a quoted literal.
pub fn safe_value(value: &str) -> Result<&str, Error> {
    if value.contains('"') {
        return Err(Error::UntrustedMetadata { value: value.to_string() });
    }
    Ok(value)
}

/// Validate and quote a string literal.
pub fn quoted_safe_value(value: &str) -> Result<String, Error> {
    Ok(format!("\"{}\"", safe_value(value)?))
}

/// Flatten a description into a single comment line. Comments cannot break
/// out of line-comment syntax, so newlines are stripped rather than
/// rejected.
pub fn safe_comment(comment: &str) -> String {
    comment.replace(['\r', '\n'], "")
}
