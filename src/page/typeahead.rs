use crate::model::AutocompleteResponse;

/// Result of feeding a fetched response into the typeahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The response matched the current query and replaced the suggestions.
    Fresh,
    /// The response was superseded by a newer query and was discarded.
    Stale { current: String },
}

/// Input state of the package autocomplete widget.
///
/// Responses arrive out of order because every keystroke issues its own
/// request and nothing is cancelled. The guard in [`apply_response`] is a
/// logical discard, not a network abort: a reply is only applied when its
/// embedded query still equals the query current at callback time.
///
/// [`apply_response`]: TypeaheadState::apply_response
#[derive(Debug, Default)]
pub struct TypeaheadState {
    query: String,
    suggestions: Vec<String>,
}

impl TypeaheadState {
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn apply_response(&mut self, resp: AutocompleteResponse) -> Applied {
        if resp.query != self.query {
            return Applied::Stale {
                current: self.query.clone(),
            };
        }
        self.suggestions = resp.packages;
        Applied::Fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resp(query: &str, packages: &[&str]) -> AutocompleteResponse {
        AutocompleteResponse {
            query: query.to_string(),
            packages: packages.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn matching_response_replaces_suggestions() {
        let mut state = TypeaheadState::default();
        state.set_query("req");
        assert_eq!(state.apply_response(resp("req", &["reqwest"])), Applied::Fresh);
        assert_eq!(state.suggestions(), ["reqwest"]);
    }

    #[test]
    fn late_response_for_superseded_query_is_discarded() {
        let mut state = TypeaheadState::default();
        state.set_query("re");
        state.set_query("req");

        // The reply for "re" comes back after "req" was typed.
        let applied = state.apply_response(resp("re", &["readline", "redis"]));
        assert_eq!(
            applied,
            Applied::Stale {
                current: "req".to_string()
            }
        );
        assert!(state.suggestions().is_empty());

        assert_eq!(state.apply_response(resp("req", &["reqwest"])), Applied::Fresh);
        assert_eq!(state.suggestions(), ["reqwest"]);
    }

    #[test]
    fn stale_response_does_not_overwrite_fresh_suggestions() {
        let mut state = TypeaheadState::default();
        state.set_query("re");
        state.set_query("req");
        state.apply_response(resp("req", &["reqwest"]));

        state.apply_response(resp("re", &["readline"]));
        assert_eq!(state.suggestions(), ["reqwest"]);
    }
}
