/// Card ordering.
///
/// Sorting is applied once over the whole card list; the per-board order the
/// views show is the global order filtered by board, which is identical
/// because the sort key never depends on board membership.
use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::settings::{Settings, SortDirection};
use crate::types::Card;

/// Leading float accepted for numeric comparison, including values with
/// trailing text ("10 units" compares as 10).
static LEADING_FLOAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap());

/// Parse the leading float of a value, if any. Infinite results are
/// rejected, so such values fall back to text comparison.
pub fn leading_number(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let m = LEADING_FLOAT_RE.find(trimmed)?;
    m.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Compare two values: numerically when BOTH carry a finite leading number,
/// otherwise as text. The rule is pairwise, not per column: a column may
/// hold a mix of numeric-looking and plain-text values across rows.
pub fn compare_values(a: &str, b: &str) -> Ordering {
    match (leading_number(a), leading_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => compare_text(a, b),
    }
}

/// Unicode-aware text comparison: NFKC-normalized, case-insensitive, with a
/// raw-ordering tie-break so distinct strings never compare equal.
fn compare_text(a: &str, b: &str) -> Ordering {
    let an: String = a.nfkc().collect::<String>().to_lowercase();
    let bn: String = b.nfkc().collect::<String>().to_lowercase();
    an.cmp(&bn).then_with(|| a.cmp(b))
}

fn sort_key<'a>(card: &'a Card, settings: &Settings) -> &'a str {
    match settings.sort_key_column() {
        Some(column) => card.field(column).unwrap_or(""),
        None => card.title.as_deref().unwrap_or(""),
    }
}

/// Sort cards per the settings. Pure: returns a new vector, input untouched.
/// The underlying sort is stable, so ties keep their original relative order
/// in both directions.
pub fn sort_cards(cards: &[Card], settings: &Settings) -> Vec<Card> {
    let mut sorted = cards.to_vec();
    sorted.sort_by(|a, b| {
        let ord = compare_values(sort_key(a, settings), sort_key(b, settings));
        match settings.sort_direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    sorted
}
