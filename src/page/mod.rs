pub mod typeahead;

use anyhow::Result;
use std::collections::BTreeMap;

use typeahead::TypeaheadState;

/// Search input with placeholder semantics.
///
/// The page ships with the placeholder text as the input's initial value.
/// Focus clears the value only while it still equals the placeholder; blur
/// restores the placeholder exactly when the field was left empty.
#[derive(Debug)]
pub struct SearchBox {
    placeholder: String,
    value: String,
}

impl SearchBox {
    pub fn new(placeholder: &str) -> Self {
        Self {
            placeholder: placeholder.to_string(),
            value: placeholder.to_string(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    pub fn focus(&mut self) {
        if self.value == self.placeholder {
            self.value.clear();
        }
    }

    pub fn blur(&mut self) {
        if self.value.is_empty() {
            self.value = self.placeholder.clone();
        }
    }
}

/// One action row in the repository actions table.
#[derive(Debug, Clone)]
pub struct ActionRow {
    pub id: String,
    pub visible: bool,
    /// Inline error shown next to the row when the last action failed.
    pub error: Option<String>,
}

impl ActionRow {
    /// Element identity of the row, `action-<id>`.
    pub fn element_id(&self) -> String {
        format!("action-{}", self.id)
    }
}

/// Client-side page state, the stand-in for the DOM the original page
/// mutated directly.
#[derive(Debug)]
pub struct Page {
    pub search: SearchBox,
    pub typeahead: TypeaheadState,
    rows: BTreeMap<String, ActionRow>,
}

impl Page {
    /// Wire up the page widgets. Runs once per session.
    pub fn activate(placeholder: &str) -> Self {
        Self {
            search: SearchBox::new(placeholder),
            typeahead: TypeaheadState::default(),
            rows: BTreeMap::new(),
        }
    }

    pub fn insert_row(&mut self, id: &str) {
        self.rows.insert(
            id.to_string(),
            ActionRow {
                id: id.to_string(),
                visible: true,
                error: None,
            },
        );
    }

    pub fn row(&self, id: &str) -> Option<&ActionRow> {
        self.rows.get(id)
    }

    /// Apply the structured result of a run/remove action to its row.
    ///
    /// On success the row is hidden; on failure it keeps its current
    /// visibility and carries the error inline. A hidden row is never
    /// re-shown here.
    pub fn apply_action_outcome(&mut self, id: &str, outcome: &Result<serde_json::Value>) {
        if let Some(row) = self.rows.get_mut(id) {
            match outcome {
                Ok(_) => {
                    row.visible = false;
                    row.error = None;
                }
                Err(e) => {
                    row.error = Some(format!("{e:#}"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn successful_action_hides_the_row() {
        let mut page = Page::activate("Search...");
        page.insert_row("42");
        assert_eq!(page.row("42").map(|r| r.element_id()).as_deref(), Some("action-42"));

        page.apply_action_outcome("42", &Ok(serde_json::json!({})));
        let row = page.row("42").unwrap();
        assert!(!row.visible);
        assert!(row.error.is_none());
    }

    #[test]
    fn failed_action_keeps_the_row_visible_with_inline_error() {
        let mut page = Page::activate("Search...");
        page.insert_row("42");

        page.apply_action_outcome("42", &Err(anyhow!("POST /api/action/run returned 403")));
        let row = page.row("42").unwrap();
        assert!(row.visible);
        assert!(row.error.as_deref().unwrap().contains("403"));
    }

    #[test]
    fn hidden_row_is_not_reshown_by_a_later_failure() {
        let mut page = Page::activate("Search...");
        page.insert_row("42");
        page.apply_action_outcome("42", &Ok(serde_json::json!({})));
        page.apply_action_outcome("42", &Err(anyhow!("boom")));
        assert!(!page.row("42").unwrap().visible);
    }

    #[test]
    fn focus_clears_value_only_while_it_equals_the_placeholder() {
        let mut search = SearchBox::new("Search packages");
        assert_eq!(search.value(), "Search packages");

        search.focus();
        assert_eq!(search.value(), "");

        search.set_value("gcc");
        search.focus();
        assert_eq!(search.value(), "gcc");
    }

    #[test]
    fn blur_restores_placeholder_exactly_when_empty() {
        let mut search = SearchBox::new("Search packages");
        search.focus();
        search.blur();
        assert_eq!(search.value(), "Search packages");

        search.focus();
        search.set_value("gcc");
        search.blur();
        assert_eq!(search.value(), "gcc");
    }
}
