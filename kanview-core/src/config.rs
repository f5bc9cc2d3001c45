/// Host editor-panel configuration: which columns play which role, which
/// host variables and action trigger receive write-backs, plus feature
/// toggles. Shipped by the host as a flat JSON object keyed by panel entry
/// name.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementConfig {
    /// Source element identifier. Data and column metadata are keyed off it.
    pub source: Option<String>,
    /// Column holding the durable row identity.
    #[serde(rename = "ID")]
    pub id: Option<String>,
    /// Title column(s); the first one supplies the card title.
    pub card_title: Vec<String>,
    /// Columns rendered as card fields.
    pub card_fields: Vec<String>,
    /// Column whose value determines board placement.
    pub category: Option<String>,
    /// Optional date columns, shown as ordinary fields and editable through
    /// the date write-back path.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Host variables written on card selection / move.
    #[serde(rename = "selectedID")]
    pub selected_id: Option<String>,
    pub selected_category: Option<String>,
    /// Host variables written on date edits.
    pub start_date_variable: Option<String>,
    pub end_date_variable: Option<String>,
    /// Action trigger fired after each write-back.
    pub update_row: Option<String>,
    pub enable_drag_drop: bool,
    pub edit_mode: bool,
    /// Raw settings JSON as entered in the panel; parsed by the controller.
    #[serde(rename = "config")]
    pub settings_json: Option<String>,
}

impl ElementConfig {
    /// User-facing configuration problems, in panel order. Empty means the
    /// board can be built (column *presence* is still validated against the
    /// host metadata at build time).
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.source.is_none() {
            errors.push("Data source is required".to_string());
        }
        if self.card_fields.is_empty() {
            errors.push("At least one card field is required".to_string());
        }
        if self.category.is_none() {
            errors.push("Category column is required".to_string());
        }
        errors
    }

    pub fn is_configured(&self) -> bool {
        self.validation_errors().is_empty()
    }

    /// Every column key the configuration references, for presence
    /// validation. Category and card fields first, then the optional roles.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.card_fields.iter().map(String::as_str).collect();
        if let Some(category) = &self.category {
            keys.push(category);
        }
        if let Some(id) = &self.id {
            keys.push(id);
        }
        keys.extend(self.card_title.iter().map(String::as_str));
        if let Some(start) = &self.start_date {
            keys.push(start);
        }
        if let Some(end) = &self.end_date {
            keys.push(end);
        }
        keys
    }
}
