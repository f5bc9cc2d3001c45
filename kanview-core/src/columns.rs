/// Column metadata supplied by the host element.
///
/// The host identifies columns by opaque keys; metadata maps each key to a
/// display name and a column type. The model layer only needs the map for
/// name resolution and presence validation. Type-specific rendering happens
/// in the host views.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Host-reported column types. Unrecognized values deserialize as `Unknown`
/// so newer host versions don't break the build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Integer,
    Datetime,
    Boolean,
    Variant,
    Link,
    #[serde(other)]
    Unknown,
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::Unknown
    }
}

/// Metadata for a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    #[serde(default)]
    pub column_type: ColumnType,
}

/// Column key -> metadata, as published by the host.
pub type ColumnMap = HashMap<String, ColumnInfo>;

/// Resolve a column key to its display name, falling back to the key itself
/// when the host has not published metadata for it.
pub fn column_name<'a>(columns: &'a ColumnMap, key: &'a str) -> &'a str {
    columns.get(key).map(|c| c.name.as_str()).unwrap_or(key)
}

/// Resolve a column key to its type (`Unknown` when absent).
pub fn column_type(columns: &ColumnMap, key: &str) -> ColumnType {
    columns.get(key).map(|c| c.column_type).unwrap_or(ColumnType::Unknown)
}

/// Reverse lookup: find the key whose display name matches exactly.
pub fn find_key_by_name<'a>(columns: &'a ColumnMap, name: &str) -> Option<&'a str> {
    columns
        .iter()
        .find(|(_, info)| info.name == name)
        .map(|(key, _)| key.as_str())
}

/// Return the subset of `required` keys that are missing from the metadata.
/// An empty result means every referenced column is present.
pub fn missing_columns<'a, I>(columns: &ColumnMap, required: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    required
        .into_iter()
        .filter(|key| !columns.contains_key(*key))
        .map(|key| key.to_string())
        .collect()
}
