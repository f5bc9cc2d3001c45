/// Data-to-board transformation.
///
/// Turns the host's columnar data into the `{boards, cards}` model in one
/// pass: validate the configured columns against the host metadata, derive
/// boards (custom list or data discovery), scan rows into cards, then apply
/// the configured sort. The contract is fail-closed: unusable configuration
/// aborts with an error and a partial model is never returned. Malformed
/// *data* never fails the build; null and missing cells are skipped.
use std::collections::HashSet;

use crate::columns::{self, ColumnMap, ColumnType};
use crate::config::ElementConfig;
use crate::settings::{BoardOrder, CardSorting, Settings, ViewMode};
use crate::sort;
use crate::types::{Board, Card, CardField, CellValue, ElementData, KanbanModel};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("no data available from host")]
    NoData,

    #[error("missing required configuration: {role}")]
    MissingConfiguration { role: &'static str },

    #[error("column not found in element metadata: {key}")]
    UnknownColumn { key: String },

    #[error("category column has no data")]
    EmptyCategory,
}

/// A field column resolved for the row scan: display name, type, and the
/// cell array backing it.
struct FieldColumn<'a> {
    name: String,
    column_type: ColumnType,
    cells: &'a [CellValue],
}

/// Build the kanban model from host data, configuration, and settings.
pub fn build(
    data: &ElementData,
    config: &ElementConfig,
    settings: &Settings,
    columns: &ColumnMap,
) -> Result<KanbanModel, BuildError> {
    if data.is_empty() {
        return Err(BuildError::NoData);
    }
    if config.card_fields.is_empty() {
        return Err(BuildError::MissingConfiguration { role: "card fields" });
    }
    let category_key = config
        .category
        .as_deref()
        .ok_or(BuildError::MissingConfiguration { role: "category column" })?;

    let missing = columns::missing_columns(columns, config.referenced_columns());
    if !missing.is_empty() {
        log::warn!("[kanview.builder.validate] Missing required columns: {:?}", missing);
        let key = missing.into_iter().next().unwrap_or_default();
        return Err(BuildError::UnknownColumn { key });
    }

    let category_data = data
        .get(category_key)
        .filter(|cells| !cells.is_empty())
        .ok_or(BuildError::EmptyCategory)?;

    let custom_mode = settings.custom_categories_active();
    let mut boards = derive_boards(category_data, settings, custom_mode);

    // Configured field columns, with the date columns shown as ordinary
    // fields. Columns absent from the data feed are skipped with a warning;
    // presence in the metadata was already validated above.
    let mut field_keys: Vec<&str> = config.card_fields.iter().map(String::as_str).collect();
    if let Some(start) = &config.start_date {
        field_keys.push(start);
    }
    if let Some(end) = &config.end_date {
        field_keys.push(end);
    }
    let mut field_columns = Vec::with_capacity(field_keys.len());
    for key in field_keys {
        match data.get(key) {
            Some(cells) => field_columns.push(FieldColumn {
                name: columns::column_name(columns, key).to_string(),
                column_type: columns::column_type(columns, key),
                cells,
            }),
            None => {
                log::warn!("[kanview.builder.fields] Field column missing from data: {}", key)
            }
        }
    }

    let title_cells = config
        .card_title
        .first()
        .and_then(|key| data.get(key.as_str()));
    let id_cells = config.id.as_deref().and_then(|key| data.get(key));

    let mut cards = Vec::new();
    for (i, cell) in category_data.iter().enumerate() {
        let Some(category_value) = cell.as_display_string() else {
            continue;
        };

        let board_index = match resolve_board(&boards, &category_value, custom_mode) {
            Some(index) => index,
            // Kanban view drops rows without a board; detail view must
            // always be able to show a card.
            None => match settings.view_mode {
                ViewMode::Kanban => continue,
                ViewMode::Detail => {
                    if boards.is_empty() {
                        boards.push(Board {
                            id: "board-default".to_string(),
                            name: "Default".to_string(),
                        });
                    }
                    0
                }
            },
        };
        let board_id = boards[board_index].id.clone();

        let mut fields = Vec::new();
        for column in &field_columns {
            if let Some(value) = column.cells.get(i).and_then(|c| c.as_display_string()) {
                fields.push(CardField {
                    name: column.name.clone(),
                    value,
                    column_type: column.column_type,
                });
            }
        }
        // No empty cards.
        if fields.is_empty() {
            continue;
        }

        let title = title_cells
            .and_then(|cells| cells.get(i))
            .and_then(|c| c.as_display_string());
        let row_id = match id_cells.and_then(|cells| cells.get(i)) {
            Some(cell) if !cell.is_null() => cell.clone(),
            _ => CellValue::Number(i as f64),
        };

        cards.push(Card {
            id: i,
            row_id,
            board_id,
            title,
            fields,
            original_index: i,
        });
    }

    let cards = match settings.card_sorting {
        CardSorting::None => cards,
        _ => sort::sort_cards(&cards, settings),
    };

    log::debug!(
        "[kanview.builder.done] {} boards, {} cards from {} rows",
        boards.len(),
        cards.len(),
        category_data.len()
    );

    Ok(KanbanModel {
        boards,
        cards,
        updating_card_ids: Vec::new(),
    })
}

/// Derive the board list: the non-blank custom categories in list order, or
/// the distinct non-null category values in first-seen order. Ids are
/// assigned after ordering so `board-<index>` reflects display order.
fn derive_boards(category_data: &[CellValue], settings: &Settings, custom_mode: bool) -> Vec<Board> {
    let mut names: Vec<String> = if custom_mode {
        settings
            .custom_categories
            .iter()
            .filter(|name| !name.trim().is_empty())
            .cloned()
            .collect()
    } else {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for cell in category_data {
            if let Some(value) = cell.as_display_string() {
                if seen.insert(value.clone()) {
                    names.push(value);
                }
            }
        }
        names
    };

    order_board_names(&mut names, settings);

    names
        .into_iter()
        .enumerate()
        .map(|(index, name)| Board {
            id: format!("board-{index}"),
            name,
        })
        .collect()
}

fn order_board_names(names: &mut Vec<String>, settings: &Settings) {
    match settings.board_order {
        BoardOrder::Data => {}
        BoardOrder::Alphabetical => {
            names.sort_by(|a, b| sort::compare_values(a, b));
        }
        BoardOrder::Custom => {
            let mut remaining = std::mem::take(names);
            for wanted in &settings.custom_board_order {
                if wanted.trim().is_empty() {
                    continue;
                }
                if let Some(pos) = remaining.iter().position(|name| norm(name) == norm(wanted)) {
                    names.push(remaining.remove(pos));
                }
            }
            names.append(&mut remaining);
        }
    }
}

/// Resolve a row's category value to a board index.
///
/// Custom categories degrade gracefully: case-insensitive exact match first,
/// then substring match in either direction, then the first board. Every row
/// lands somewhere when custom categories are in use; this is intentional.
/// Data-driven categories match exactly (the boards came from the same
/// values).
fn resolve_board(boards: &[Board], category_value: &str, custom_mode: bool) -> Option<usize> {
    if custom_mode {
        let value = norm(category_value);
        boards
            .iter()
            .position(|b| norm(&b.name) == value)
            .or_else(|| {
                boards.iter().position(|b| {
                    let name = norm(&b.name);
                    value.contains(&name) || name.contains(&value)
                })
            })
            .or(if boards.is_empty() { None } else { Some(0) })
    } else {
        boards.iter().position(|b| b.name == category_value)
    }
}

/// Trim-tolerant, case-insensitive comparison key for category matching.
fn norm(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnInfo;
    use crate::settings::SortDirection;

    fn text_cells(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::Text(v.to_string())).collect()
    }

    fn column_info(name: &str, column_type: ColumnType) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            column_type,
        }
    }

    /// Two columns: category "Category" under key CAT, field "name" under
    /// key NAME. Matches the minimal host setup.
    fn minimal_fixture() -> (ElementData, ElementConfig, ColumnMap) {
        let mut data = ElementData::new();
        data.insert("CAT".to_string(), text_cells(&["A", "B", "A"]));
        data.insert("NAME".to_string(), text_cells(&["x", "y", "z"]));

        let config = ElementConfig {
            source: Some("el1".to_string()),
            card_fields: vec!["NAME".to_string()],
            category: Some("CAT".to_string()),
            ..Default::default()
        };

        let mut columns = ColumnMap::new();
        columns.insert("CAT".to_string(), column_info("Category", ColumnType::Text));
        columns.insert("NAME".to_string(), column_info("name", ColumnType::Text));
        (data, config, columns)
    }

    #[test]
    fn test_minimal_build() {
        let (data, config, columns) = minimal_fixture();
        let model = build(&data, &config, &Settings::default(), &columns).unwrap();

        assert_eq!(
            model.boards,
            vec![
                Board { id: "board-0".to_string(), name: "A".to_string() },
                Board { id: "board-1".to_string(), name: "B".to_string() },
            ]
        );
        assert_eq!(model.cards.len(), 3);

        let first = &model.cards[0];
        assert_eq!(first.id, 0);
        assert_eq!(first.row_id, CellValue::Number(0.0));
        assert_eq!(first.board_id, "board-0");
        assert_eq!(first.title, None);
        assert_eq!(first.field("name"), Some("x"));
        assert_eq!(first.original_index, 0);

        assert_eq!(model.cards[1].board_id, "board-1");
        assert_eq!(model.cards[2].board_id, "board-0");
        assert_eq!(model.cards[2].field("name"), Some("z"));
        assert!(model.updating_card_ids.is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let (data, config, columns) = minimal_fixture();
        let settings = Settings::default();
        let a = build(&data, &config, &settings, &columns).unwrap();
        let b = build(&data, &config, &settings, &columns).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_card_references_a_board() {
        let (data, config, columns) = minimal_fixture();
        let model = build(&data, &config, &Settings::default(), &columns).unwrap();
        for card in &model.cards {
            assert!(model.board_by_id(&card.board_id).is_some());
        }
    }

    #[test]
    fn test_null_category_rows_skipped() {
        let (mut data, config, columns) = minimal_fixture();
        data.insert(
            "CAT".to_string(),
            vec![
                CellValue::Text("A".to_string()),
                CellValue::Null,
                CellValue::Text("A".to_string()),
            ],
        );
        let model = build(&data, &config, &Settings::default(), &columns).unwrap();
        assert_eq!(model.boards.len(), 1);
        let ids: Vec<usize> = model.cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_all_null_field_rows_dropped() {
        let (mut data, config, columns) = minimal_fixture();
        data.insert(
            "NAME".to_string(),
            vec![
                CellValue::Text("x".to_string()),
                CellValue::Null,
                CellValue::Text("z".to_string()),
            ],
        );
        let model = build(&data, &config, &Settings::default(), &columns).unwrap();
        assert_eq!(model.cards.len(), 2);
        for card in &model.cards {
            assert!(!card.fields.is_empty());
        }
    }

    #[test]
    fn test_missing_category_metadata_fails_closed() {
        let (data, config, mut columns) = minimal_fixture();
        columns.remove("CAT");
        let err = build(&data, &config, &Settings::default(), &columns).unwrap_err();
        assert_eq!(err, BuildError::UnknownColumn { key: "CAT".to_string() });
    }

    #[test]
    fn test_unconfigured_roles_fail_closed() {
        let (data, config, columns) = minimal_fixture();

        let mut no_fields = config.clone();
        no_fields.card_fields.clear();
        assert_eq!(
            build(&data, &no_fields, &Settings::default(), &columns).unwrap_err(),
            BuildError::MissingConfiguration { role: "card fields" }
        );

        let mut no_category = config.clone();
        no_category.category = None;
        assert_eq!(
            build(&data, &no_category, &Settings::default(), &columns).unwrap_err(),
            BuildError::MissingConfiguration { role: "category column" }
        );

        assert_eq!(
            build(&ElementData::new(), &config, &Settings::default(), &columns).unwrap_err(),
            BuildError::NoData
        );
    }

    #[test]
    fn test_empty_category_data_fails_closed() {
        let (mut data, config, columns) = minimal_fixture();
        data.insert("CAT".to_string(), Vec::new());
        assert_eq!(
            build(&data, &config, &Settings::default(), &columns).unwrap_err(),
            BuildError::EmptyCategory
        );

        data.remove("CAT");
        assert_eq!(
            build(&data, &config, &Settings::default(), &columns).unwrap_err(),
            BuildError::EmptyCategory
        );
    }

    #[test]
    fn test_custom_categories_define_boards() {
        let (data, config, columns) = minimal_fixture();
        let settings = Settings {
            use_custom_categories: true,
            custom_categories: vec![
                "Todo".to_string(),
                "  ".to_string(),
                "Done".to_string(),
            ],
            ..Default::default()
        };
        let model = build(&data, &config, &settings, &columns).unwrap();
        let names: Vec<&str> = model.boards.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Todo", "Done"]);
    }

    #[test]
    fn test_custom_category_matching_rules() {
        let (mut data, config, columns) = minimal_fixture();
        data.insert(
            "CAT".to_string(),
            text_cells(&["done ", "In Progress today", "untracked"]),
        );
        let settings = Settings {
            use_custom_categories: true,
            custom_categories: vec!["Todo".to_string(), "Done".to_string(), "In Progress".to_string()],
            ..Default::default()
        };
        let model = build(&data, &config, &settings, &columns).unwrap();

        // trim-tolerant case-insensitive exact match
        assert_eq!(model.board_name_of(model.card_by_id(0).unwrap()), Some("Done"));
        // substring match, either direction
        assert_eq!(
            model.board_name_of(model.card_by_id(1).unwrap()),
            Some("In Progress")
        );
        // no match at all falls back to the first board
        assert_eq!(model.board_name_of(model.card_by_id(2).unwrap()), Some("Todo"));
    }

    #[test]
    fn test_detail_view_fabricates_default_board() {
        let (data, config, columns) = minimal_fixture();
        let settings = Settings {
            use_custom_categories: true,
            custom_categories: vec![" ".to_string()],
            view_mode: ViewMode::Detail,
            ..Default::default()
        };
        let model = build(&data, &config, &settings, &columns).unwrap();
        assert_eq!(
            model.boards,
            vec![Board { id: "board-default".to_string(), name: "Default".to_string() }]
        );
        assert_eq!(model.cards.len(), 3);
    }

    #[test]
    fn test_kanban_view_drops_boardless_rows() {
        let (data, config, columns) = minimal_fixture();
        let settings = Settings {
            use_custom_categories: true,
            custom_categories: vec![" ".to_string()],
            ..Default::default()
        };
        let model = build(&data, &config, &settings, &columns).unwrap();
        assert!(model.boards.is_empty());
        assert!(model.cards.is_empty());
    }

    #[test]
    fn test_title_and_row_id_extraction() {
        let (mut data, mut config, mut columns) = minimal_fixture();
        data.insert(
            "TITLE".to_string(),
            vec![
                CellValue::Text("First".to_string()),
                CellValue::Null,
                CellValue::Text("Third".to_string()),
            ],
        );
        data.insert(
            "IDCOL".to_string(),
            vec![
                CellValue::Text("row-a".to_string()),
                CellValue::Text("row-b".to_string()),
                CellValue::Null,
            ],
        );
        config.card_title = vec!["TITLE".to_string()];
        config.id = Some("IDCOL".to_string());
        columns.insert("TITLE".to_string(), column_info("Title", ColumnType::Text));
        columns.insert("IDCOL".to_string(), column_info("Row ID", ColumnType::Text));

        let model = build(&data, &config, &Settings::default(), &columns).unwrap();
        assert_eq!(model.cards[0].title.as_deref(), Some("First"));
        assert_eq!(model.cards[1].title, None);
        assert_eq!(model.cards[0].row_id, CellValue::Text("row-a".to_string()));
        // null ID cell falls back to the row index
        assert_eq!(model.cards[2].row_id, CellValue::Number(2.0));
    }

    #[test]
    fn test_date_columns_shown_as_fields() {
        let (mut data, mut config, mut columns) = minimal_fixture();
        data.insert(
            "SDATE".to_string(),
            vec![
                CellValue::Text("2024-03-01".to_string()),
                CellValue::Null,
                CellValue::Text("2024-04-01".to_string()),
            ],
        );
        config.start_date = Some("SDATE".to_string());
        columns.insert("SDATE".to_string(), column_info("Start", ColumnType::Datetime));

        let model = build(&data, &config, &Settings::default(), &columns).unwrap();
        assert_eq!(model.cards[0].field("Start"), Some("2024-03-01"));
        assert_eq!(model.cards[1].field("Start"), None);
        let start = model.cards[0].fields.iter().find(|f| f.name == "Start").unwrap();
        assert_eq!(start.column_type, ColumnType::Datetime);
    }

    #[test]
    fn test_field_column_absent_from_data_is_skipped() {
        let (mut data, mut config, mut columns) = minimal_fixture();
        config.card_fields.push("EXTRA".to_string());
        columns.insert("EXTRA".to_string(), column_info("Extra", ColumnType::Text));
        // metadata knows the column but the feed has not delivered it
        data.remove("EXTRA");

        let model = build(&data, &config, &Settings::default(), &columns).unwrap();
        assert_eq!(model.cards.len(), 3);
        assert_eq!(model.cards[0].field("Extra"), None);
    }

    #[test]
    fn test_sort_applied_globally() {
        let (mut data, config, columns) = minimal_fixture();
        data.insert("NAME".to_string(), text_cells(&["10", "2", "9"]));
        let settings = Settings {
            card_sorting: CardSorting::Alphabetical,
            sort_column: "name".to_string(),
            sort_direction: SortDirection::Asc,
            ..Default::default()
        };
        let model = build(&data, &config, &settings, &columns).unwrap();
        let values: Vec<&str> = model.cards.iter().map(|c| c.field("name").unwrap()).collect();
        assert_eq!(values, vec!["2", "9", "10"]);
    }

    #[test]
    fn test_board_order_alphabetical() {
        let (mut data, config, columns) = minimal_fixture();
        data.insert("CAT".to_string(), text_cells(&["banana", "Apple", "cherry"]));
        let settings = Settings {
            board_order: BoardOrder::Alphabetical,
            ..Default::default()
        };
        let model = build(&data, &config, &settings, &columns).unwrap();
        let names: Vec<&str> = model.boards.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "banana", "cherry"]);
        // ids follow display order
        assert_eq!(model.boards[0].id, "board-0");
        assert_eq!(model.board_name_of(model.card_by_id(1).unwrap()), Some("Apple"));
    }

    #[test]
    fn test_board_order_custom() {
        let (mut data, config, columns) = minimal_fixture();
        data.insert("CAT".to_string(), text_cells(&["A", "B", "C"]));
        data.insert("NAME".to_string(), text_cells(&["x", "y", "z"]));
        let settings = Settings {
            board_order: BoardOrder::Custom,
            custom_board_order: vec!["c".to_string(), "A".to_string(), "Zed".to_string()],
            ..Default::default()
        };
        let model = build(&data, &config, &settings, &columns).unwrap();
        let names: Vec<&str> = model.boards.iter().map(|b| b.name.as_str()).collect();
        // listed names first (case-insensitive), remainder in data order
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_numeric_category_values_coerced() {
        let (mut data, config, columns) = minimal_fixture();
        data.insert(
            "CAT".to_string(),
            vec![
                CellValue::Number(1.0),
                CellValue::Number(2.0),
                CellValue::Number(1.0),
            ],
        );
        let model = build(&data, &config, &Settings::default(), &columns).unwrap();
        let names: Vec<&str> = model.boards.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["1", "2"]);
        assert_eq!(model.cards[2].board_id, "board-0");
    }
}
