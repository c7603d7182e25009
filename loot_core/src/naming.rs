//! Naming - Display names composed from a base name and rolled affixes

use crate::affix::AppliedAffix;
use crate::types::AffixKind;

const PREFIX_MARKER: &str = "的";
const SUFFIX_MARKER: &str = "之";

/// Compose an item name from its base name and affix names.
///
/// Prefix names lose their first `的`, suffix names their first `之`;
/// the pieces are then joined as `{P}之{S}的{base}`, `{P}的{base}`,
/// `{S}之{base}` or just `{base}`.
pub fn compose_name(base: &str, prefixes: &[&str], suffixes: &[&str]) -> String {
    let prefix_text: String = prefixes
        .iter()
        .map(|p| p.replacen(PREFIX_MARKER, "", 1))
        .collect();
    let suffix_text: String = suffixes
        .iter()
        .map(|s| s.replacen(SUFFIX_MARKER, "", 1))
        .collect();

    match (prefix_text.is_empty(), suffix_text.is_empty()) {
        (false, false) => format!("{prefix_text}{SUFFIX_MARKER}{suffix_text}{PREFIX_MARKER}{base}"),
        (false, true) => format!("{prefix_text}{PREFIX_MARKER}{base}"),
        (true, false) => format!("{suffix_text}{SUFFIX_MARKER}{base}"),
        (true, true) => base.to_string(),
    }
}

/// Name for an item carrying the given affixes. Uniques do not appear in the name.
pub fn name_for_affixes(base: &str, affixes: &[AppliedAffix]) -> String {
    let prefixes: Vec<&str> = affixes
        .iter()
        .filter(|a| a.kind == AffixKind::Prefix)
        .map(|a| a.name())
        .collect();
    let suffixes: Vec<&str> = affixes
        .iter()
        .filter(|a| a.kind == AffixKind::Suffix)
        .map(|a| a.name())
        .collect();
    compose_name(base, &prefixes, &suffixes)
}
