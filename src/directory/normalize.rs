//! Title clean-up applied to every directory listing before display.

use std::collections::HashMap;

use super::types::{DirectoryRecord, FacilityRow};

/// Placeholder for characters the handset cannot display.
pub const PLACEHOLDER: char = '?';

/// Replace anything outside printable ASCII (space through tilde).
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { PLACEHOLDER })
        .collect()
}

/// Group facilities by exact title and suffix every member of a group larger
/// than one with its region title. Unique titles are left alone, as are
/// duplicates whose region has no title.
pub(crate) fn disambiguate_titles(rows: &[FacilityRow]) -> Vec<DirectoryRecord> {
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *occurrences.entry(row.title.as_str()).or_insert(0) += 1;
    }

    rows.iter()
        .map(|row| {
            let duplicated = occurrences.get(row.title.as_str()).copied().unwrap_or(0) > 1;
            let title = match row.region_title() {
                Some(region) if duplicated => format!("{} {region}", row.title),
                _ => row.title.clone(),
            };
            DirectoryRecord::new(row.id.clone(), sanitize_title(&title))
        })
        .collect()
}
