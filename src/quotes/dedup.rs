//! Feast quote merging.

use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Comparison key for a quote.
///
/// Lowercases, strips diacritics and every non-alphanumeric character,
/// collapses whitespace and trims, so `"Sede santos!"` and `"sede  santos"`
/// share a key.
#[must_use]
pub fn normalize_quote(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Merge curated feast quotes with calendar-provided ones.
///
/// Curated entries come first, so on a collision the curated wording wins.
/// Entries that normalize to nothing are dropped.
#[must_use]
pub fn merge_feast_quotes(curated: &[String], api_quotes: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    curated
        .iter()
        .chain(api_quotes)
        .filter(|quote| {
            let key = normalize_quote(quote);
            !key.is_empty() && seen.insert(key)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn normalization_ignores_case_accents_and_punctuation() {
        assert_eq!(normalize_quote("  Rogai por nós!  "), "rogai por nos");
        assert_eq!(normalize_quote("Ave,   María\tgratia plena."), "ave maria gratia plena");
        assert_eq!(normalize_quote("São José"), normalize_quote("sao jose"));
    }

    #[test]
    fn curated_first_and_api_duplicates_dropped() {
        let merged = merge_feast_quotes(
            &owned(&["Sede santos", "Rogai por nos"]),
            &owned(&["Sede santos!", "Com toda a corte celeste."]),
        );
        assert_eq!(
            merged,
            owned(&["Sede santos", "Rogai por nos", "Com toda a corte celeste."])
        );
    }

    #[test]
    fn duplicates_within_one_source_are_dropped() {
        let merged = merge_feast_quotes(&owned(&["Amen", "amén."]), &[]);
        assert_eq!(merged, owned(&["Amen"]));
    }

    #[test]
    fn punctuation_only_entries_are_dropped() {
        let merged = merge_feast_quotes(&[], &owned(&["...", "", "Fiat"]));
        assert_eq!(merged, owned(&["Fiat"]));
    }

    #[test]
    fn empty_inputs_merge_to_empty() {
        assert!(merge_feast_quotes(&[], &[]).is_empty());
    }
}
