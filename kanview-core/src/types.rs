/// Core model types for the kanban view.
///
/// A `KanbanModel` is rebuilt from scratch on every host data, config, or
/// settings change; nothing here is persisted. Board ids are stable only
/// within a single build, so anything that outlives one build (the
/// optimistic overlay) must resolve boards by name, never by id.
use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::columns::ColumnType;

/// A single cell as published by the host data feed.
///
/// Columns arrive as parallel arrays of these; `Null` marks absent values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// String coercion for display and field extraction. `None` for `Null`.
    /// Integral numbers print without a decimal point.
    pub fn as_display_string(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Text(s) => Some(s.clone()),
        }
    }
}

/// Columnar data from the host: column key -> cell array. All arrays share
/// one length (the row count).
pub type ElementData = HashMap<String, Vec<CellValue>>;

/// A named lane in the kanban view, one per category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
}

/// One displayed field on a card.
///
/// Fields are kept as an ordered list of typed entries rather than a string
/// map, so downstream formatters keep the column type without re-deriving it
/// from name lookups. Order is the configured field-column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardField {
    pub name: String,
    pub value: String,
    pub column_type: ColumnType,
}

/// A single data row rendered as a draggable unit.
///
/// `id` is the row's positional index at build time and is only meaningful
/// within that build. `row_id` is the durable identity (the configured ID
/// column's value, or the index when no ID column is set) and is what gets
/// written back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: usize,
    pub row_id: CellValue,
    pub board_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub fields: Vec<CardField>,
    pub original_index: usize,
}

impl Card {
    /// Look up a field value by display name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Stable render key derived from the durable row identity (8 hex chars
    /// of SHA-256). Unlike `id`, this survives row reordering between
    /// builds, so renderers can use it as a DOM key.
    pub fn render_key(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        let repr = self.row_id.as_display_string().unwrap_or_default();
        hasher.update(repr.as_bytes());
        let hash = hasher.finalize();
        hex::encode(&hash[..4])
    }
}

/// The full board/card model handed to presentation.
///
/// `updating_card_ids` marks cards whose authoritative state is pending
/// confirmation after an optimistic mutation; it is empty outside of an
/// in-flight move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanModel {
    pub boards: Vec<Board>,
    pub cards: Vec<Card>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub updating_card_ids: Vec<usize>,
}

impl KanbanModel {
    pub fn board_by_id(&self, id: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn board_by_name(&self, name: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.name == name)
    }

    pub fn card_by_id(&self, id: usize) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// The display name of the board a card currently sits on.
    pub fn board_name_of(&self, card: &Card) -> Option<&str> {
        self.board_by_id(&card.board_id).map(|b| b.name.as_str())
    }

    /// Cards on one board, in model order. Because the card list is sorted
    /// globally, the filtered subsequence is already in per-board order.
    pub fn cards_on_board<'a>(&'a self, board_id: &'a str) -> impl Iterator<Item = &'a Card> {
        self.cards.iter().filter(move |c| c.board_id == board_id)
    }
}

/// Summary statistics over a built model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanStats {
    pub total_boards: usize,
    pub total_cards: usize,
    pub cards_per_board: BTreeMap<String, usize>,
}

impl KanbanStats {
    /// Compute stats for a model; `None` yields all-zero stats.
    pub fn for_model(model: Option<&KanbanModel>) -> Self {
        let Some(model) = model else {
            return Self::default();
        };
        let mut cards_per_board = BTreeMap::new();
        for board in &model.boards {
            let count = model.cards_on_board(&board.id).count();
            cards_per_board.insert(board.name.clone(), count);
        }
        Self {
            total_boards: model.boards.len(),
            total_cards: model.cards.len(),
            cards_per_board,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: usize, board_id: &str) -> Card {
        Card {
            id,
            row_id: CellValue::Number(id as f64),
            board_id: board_id.to_string(),
            title: None,
            fields: vec![CardField {
                name: "Task".to_string(),
                value: format!("task-{id}"),
                column_type: ColumnType::Text,
            }],
            original_index: id,
        }
    }

    fn model() -> KanbanModel {
        KanbanModel {
            boards: vec![
                Board { id: "board-0".to_string(), name: "Todo".to_string() },
                Board { id: "board-1".to_string(), name: "Done".to_string() },
            ],
            cards: vec![card(0, "board-0"), card(1, "board-1"), card(2, "board-0")],
            updating_card_ids: Vec::new(),
        }
    }

    #[test]
    fn test_cell_display_string() {
        assert_eq!(CellValue::Text("x".into()).as_display_string(), Some("x".into()));
        assert_eq!(CellValue::Number(42.0).as_display_string(), Some("42".into()));
        assert_eq!(CellValue::Number(42.5).as_display_string(), Some("42.5".into()));
        assert_eq!(CellValue::Bool(true).as_display_string(), Some("true".into()));
        assert_eq!(CellValue::Null.as_display_string(), None);
    }

    #[test]
    fn test_cell_value_json_shapes() {
        let cells: Vec<CellValue> = serde_json::from_str(r#"[null, true, 3.5, "x"]"#).unwrap();
        assert_eq!(
            cells,
            vec![
                CellValue::Null,
                CellValue::Bool(true),
                CellValue::Number(3.5),
                CellValue::Text("x".into()),
            ]
        );
    }

    #[test]
    fn test_board_lookup_by_name_and_id() {
        let model = model();
        assert_eq!(model.board_by_name("Done").map(|b| b.id.as_str()), Some("board-1"));
        assert_eq!(model.board_by_id("board-0").map(|b| b.name.as_str()), Some("Todo"));
        assert!(model.board_by_name("done").is_none());
    }

    #[test]
    fn test_board_name_of_card() {
        let model = model();
        let card = model.card_by_id(2).unwrap();
        assert_eq!(model.board_name_of(card), Some("Todo"));
    }

    #[test]
    fn test_cards_on_board_order() {
        let model = model();
        let ids: Vec<usize> = model.cards_on_board("board-0").map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_render_key_stable_across_position() {
        let mut a = card(0, "board-0");
        a.row_id = CellValue::Text("ROW-77".into());
        let mut b = card(5, "board-1");
        b.row_id = CellValue::Text("ROW-77".into());
        assert_eq!(a.render_key(), b.render_key());
        assert_eq!(a.render_key().len(), 8);
        assert!(a.render_key().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_stats_counts_per_board() {
        let model = model();
        let stats = KanbanStats::for_model(Some(&model));
        assert_eq!(stats.total_boards, 2);
        assert_eq!(stats.total_cards, 3);
        assert_eq!(stats.cards_per_board.get("Todo"), Some(&2));
        assert_eq!(stats.cards_per_board.get("Done"), Some(&1));
    }

    #[test]
    fn test_stats_empty_model() {
        let stats = KanbanStats::for_model(None);
        assert_eq!(stats.total_boards, 0);
        assert_eq!(stats.total_cards, 0);
        assert!(stats.cards_per_board.is_empty());
    }

    #[test]
    fn test_model_serialization_camel_case() {
        let model = model();
        let json = serde_json::to_value(&model).unwrap();
        let first = &json["cards"][0];
        assert_eq!(first["rowId"], serde_json::json!(0.0));
        assert_eq!(first["boardId"], "board-0");
        assert_eq!(first["originalIndex"], 0);
        // empty updating set is omitted from the wire shape
        assert!(json.get("updatingCardIds").is_none());
    }
}
