use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// Session Key Extraction
// ============================================================================

static SESSION_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/sessions/(.*?)/contexts/").expect("session path pattern"));

/// Pulls the session id out of a Dialogflow context name such as
/// `projects/p/agent/sessions/abc123/contexts/ongoing-order`.
///
/// Returns an empty string when the name does not carry a session path; the
/// accumulator then keys the order under the empty session.
pub fn extract_session_id(context_name: &str) -> String {
    SESSION_PATH
        .captures(context_name)
        .and_then(|captures| captures.get(1))
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_default()
}
