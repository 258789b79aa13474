use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    /// Raw session cookie string, as copied from the browser. The `_xsrf`
    /// token is extracted from it for state-changing requests.
    #[serde(default)]
    pub cookie: Option<String>,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub user_agent: String,
}

/// Repository actions exposed by the web interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Run,
    Remove,
}

impl ActionKind {
    /// Convert the action to its path segment under `/api/action/`.
    pub fn as_path_str(self) -> &'static str {
        match self {
            ActionKind::Run => "run",
            ActionKind::Remove => "remove",
        }
    }
}

/// Response body of `GET /api/packages/autocomplete`.
///
/// `query` echoes the request's `q` argument; suggestion consumers compare it
/// against the query that is current at the time the response arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    pub query: String,
    pub packages: Vec<String>,
}

/// Outcome of a `run`/`remove` invocation, including the final state of the
/// affected row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReport {
    #[serde(default)]
    pub timestamp_utc: String,
    pub base_url: String,
    pub action: ActionKind,
    pub id: String,
    /// True when the server confirmed the action and the row was hidden.
    pub hidden: bool,
    /// Inline error kept on the row when the action failed.
    #[serde(default)]
    pub error: Option<String>,
}

/// Events emitted by the interactive typeahead session for display.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Fetching { query: String },
    Suggestions { query: String, packages: Vec<String> },
    Stale { query: String, current: String },
    FetchFailed { query: String, error: String },
}

impl SessionEvent {
    /// Render a human-readable line for the output writer.
    pub fn to_message(&self) -> String {
        match self {
            SessionEvent::Fetching { query } => format!("Fetching suggestions for '{}'...", query),
            SessionEvent::Suggestions { query, packages } => {
                if packages.is_empty() {
                    format!("'{}': no matches", query)
                } else {
                    format!("'{}': {}", query, packages.join(", "))
                }
            }
            SessionEvent::Stale { query, current } => {
                format!("Dropped stale response for '{}' (current query '{}')", query, current)
            }
            SessionEvent::FetchFailed { query, error } => {
                format!("Fetch for '{}' failed: {}", query, error)
            }
        }
    }
}
