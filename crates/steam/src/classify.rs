//! Classification of store `appdetails` responses.
//!
//! The store answers "no" in two ways: with a 4xx status, or with a 200 whose
//! envelope says `{"<id>": {"success": false}}`. The latter is what a region
//! lock, a legal block and a delisted title all look like, in every
//! jurisdiction. Anything else that isn't a usable `data` object is assumed to
//! be a hiccup.

use derive_more::Display;
use serde_json::Value;
use sge_extract::models::TitleId;

/// A definitive refusal. Asking again will get the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TerminalReason {
    #[display("HTTP {_0}")]
    Status(u16),
    #[display("store reported no details")]
    Unlisted,
}

/// A failure worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TransientReason {
    #[display("HTTP {_0}")]
    Status(u16),
    #[display("rate limited")]
    RateLimited,
    #[display("request timed out")]
    Timeout,
    #[display("connection failed")]
    Connection,
    #[display("empty response body")]
    EmptyBody,
    #[display("response is not valid JSON")]
    InvalidJson,
    #[display("response does not mention the title")]
    MissingTitle,
    #[display("response has no details")]
    MissingData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The `data` object for the requested title.
    Details(Value),
    Terminal(TerminalReason),
    Transient(TransientReason),
}

/// Decide what an `appdetails` response means for `title_id`.
pub fn classify(title_id: TitleId, status: u16, body: &[u8]) -> Verdict {
    match status {
        200..=299 => {},
        429 => return Verdict::Transient(TransientReason::RateLimited),
        400..=499 => return Verdict::Terminal(TerminalReason::Status(status)),
        _ => return Verdict::Transient(TransientReason::Status(status)),
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Verdict::Transient(TransientReason::EmptyBody);
    }
    let Ok(mut envelope) = serde_json::from_slice::<Value>(body) else {
        return Verdict::Transient(TransientReason::InvalidJson);
    };
    let Some(entry) = envelope.get_mut(title_id.to_string().as_str()) else {
        return Verdict::Transient(TransientReason::MissingTitle);
    };
    if entry.get("success").and_then(Value::as_bool) == Some(false) {
        return Verdict::Terminal(TerminalReason::Unlisted);
    }
    match entry.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => Verdict::Details(data),
        _ => Verdict::Transient(TransientReason::MissingData),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const PORTAL: TitleId = TitleId::new(400);

    #[test]
    fn test_details() {
        let body = br#"{"400": {"success": true, "data": {"name": "Portal"}}}"#;
        assert_eq!(classify(PORTAL, 200, body), Verdict::Details(json!({"name": "Portal"})));
    }

    #[rstest]
    #[case(403)]
    #[case(404)]
    #[case(451)]
    fn test_client_errors_are_terminal(#[case] status: u16) {
        assert_eq!(
            classify(PORTAL, status, b"Access Denied"),
            Verdict::Terminal(TerminalReason::Status(status))
        );
    }

    #[test]
    fn test_unsuccessful_envelope_is_terminal() {
        let body = br#"{"400": {"success": false}}"#;
        assert_eq!(classify(PORTAL, 200, body), Verdict::Terminal(TerminalReason::Unlisted));
    }

    #[rstest]
    #[case(429, "", TransientReason::RateLimited)]
    #[case(500, "", TransientReason::Status(500))]
    #[case(503, "{}", TransientReason::Status(503))]
    #[case(200, "", TransientReason::EmptyBody)]
    #[case(200, "  \n", TransientReason::EmptyBody)]
    #[case(200, "<html>", TransientReason::InvalidJson)]
    #[case(200, "null", TransientReason::MissingTitle)]
    #[case(200, r#"{"620": {"success": true, "data": {}}}"#, TransientReason::MissingTitle)]
    #[case(200, r#"{"400": {"success": true}}"#, TransientReason::MissingData)]
    #[case(200, r#"{"400": {"success": true, "data": null}}"#, TransientReason::MissingData)]
    fn test_transient(#[case] status: u16, #[case] body: &str, #[case] reason: TransientReason) {
        assert_eq!(classify(PORTAL, status, body.as_bytes()), Verdict::Transient(reason));
    }
}
