/// Board settings, entered in the host panel as a JSON text blob.
///
/// Missing keys fall back per-field to the defaults below; a JSON parse
/// failure (or an out-of-vocabulary enum value) falls back to full defaults
/// with a warning. Settings never abort rendering.
use serde::{Deserialize, Serialize};

/// Sentinel sort-column value meaning "sort by the card title".
pub const SORT_BY_TITLE: &str = "__card_title__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardLayout {
    Comfortable,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldLayout {
    Stacked,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardWidth {
    Auto,
    Fixed,
}

/// How boards are ordered left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardOrder {
    /// First-seen order from the data (or custom-category list order).
    Data,
    Alphabetical,
    /// Names listed in `custom_board_order` first, remainder in data order.
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSorting {
    None,
    Alphabetical,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Kanban,
    Detail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub card_layout: CardLayout,
    pub field_layout: FieldLayout,
    pub show_card_counts: bool,
    pub board_width: BoardWidth,
    pub board_order: BoardOrder,
    pub custom_board_order: Vec<String>,
    /// Fixed category list used instead of data discovery when
    /// `use_custom_categories` is on.
    pub custom_categories: Vec<String>,
    pub use_custom_categories: bool,
    pub card_sorting: CardSorting,
    /// Display name of the sort column, or [`SORT_BY_TITLE`].
    pub sort_column: String,
    pub sort_direction: SortDirection,
    pub view_mode: ViewMode,
    pub enable_card_animations: bool,
    pub compact_field_display: bool,
    pub highlight_empty_boards: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            card_layout: CardLayout::Comfortable,
            field_layout: FieldLayout::Stacked,
            show_card_counts: true,
            board_width: BoardWidth::Auto,
            board_order: BoardOrder::Data,
            custom_board_order: Vec::new(),
            custom_categories: Vec::new(),
            use_custom_categories: false,
            card_sorting: CardSorting::None,
            sort_column: SORT_BY_TITLE.to_string(),
            sort_direction: SortDirection::Asc,
            view_mode: ViewMode::Kanban,
            enable_card_animations: true,
            compact_field_display: false,
            highlight_empty_boards: true,
        }
    }
}

impl Settings {
    /// Parse the panel's settings JSON. Blank input and parse failures both
    /// yield full defaults; the board must render regardless.
    pub fn from_json(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        match serde_json::from_str(trimmed) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "[kanview.settings.parse] Invalid settings JSON, using defaults: {}",
                    e
                );
                Self::default()
            }
        }
    }

    /// The field column to sort by, if sorting targets a field rather than
    /// the card title.
    pub fn sort_key_column(&self) -> Option<&str> {
        if self.sort_column.is_empty() || self.sort_column == SORT_BY_TITLE {
            None
        } else {
            Some(self.sort_column.as_str())
        }
    }

    /// Whether the custom-category list replaces data discovery. The toggle
    /// alone is not enough; an empty list falls back to data categories.
    pub fn custom_categories_active(&self) -> bool {
        self.use_custom_categories && !self.custom_categories.is_empty()
    }
}
