//! Published-sheet envelope handling.
//!
//! The sheet endpoint answers with a JavaScript callback wrapping the JSON
//! payload:
//!
//! ```text
//! /*O_o*/
//! google.visualization.Query.setResponse({...});
//! ```

use crate::error::FeedError;

use super::types::SHEET_FEED;

/// Callback marker preceding the JSON payload.
const CALLBACK_OPEN: &str = "setResponse(";

/// Removes the callback envelope and returns the JSON payload.
///
/// Bodies that are already bare JSON objects are returned unchanged.
///
/// # Errors
///
/// Returns `MalformedFeed` if the body has neither shape.
pub fn strip_wrapper(body: &str) -> Result<&str, FeedError> {
    let trimmed = body.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    let start = trimmed
        .find(CALLBACK_OPEN)
        .map(|pos| pos + CALLBACK_OPEN.len())
        .ok_or_else(|| FeedError::malformed(SHEET_FEED, "response is not a sheet callback"))?;

    let inner = trimmed[start..].trim_end();
    let inner = inner.strip_suffix(';').unwrap_or(inner).trim_end();
    let inner = inner
        .strip_suffix(')')
        .ok_or_else(|| FeedError::malformed(SHEET_FEED, "sheet callback is not closed"))?;

    Ok(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_standard_envelope() {
        let body = "/*O_o*/\ngoogle.visualization.Query.setResponse({\"version\":\"0.6\",\"table\":{}});";
        assert_eq!(
            strip_wrapper(body).unwrap(),
            "{\"version\":\"0.6\",\"table\":{}}"
        );
    }

    #[test]
    fn test_envelope_prefix_is_47_chars() {
        let prefix = "/*O_o*/\ngoogle.visualization.Query.setResponse(";
        assert_eq!(prefix.len(), 47);
        let body = format!("{prefix}{{}});");
        assert_eq!(strip_wrapper(&body).unwrap(), "{}");
    }

    #[test]
    fn test_bare_json_passthrough() {
        assert_eq!(strip_wrapper("  {\"table\":null}\n").unwrap(), "{\"table\":null}");
    }

    #[test]
    fn test_rejects_other_bodies() {
        assert!(strip_wrapper("").is_err());
        assert!(strip_wrapper("<html>Sign in</html>").is_err());
        assert!(strip_wrapper("google.visualization.Query.setResponse({}").is_err());
    }
}
