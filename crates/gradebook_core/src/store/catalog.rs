//! Default subject catalogs used to seed a fresh store.

use crate::model::semester::{SemesterKey, SemesterRecord};
use crate::model::subject::Subject;

const YEAR_ONE: &[(&str, u32)] = &[
    ("Korean", 4),
    ("Mathematics", 4),
    ("English", 4),
    ("Korean History", 3),
    ("Integrated Social Studies", 3),
    ("Integrated Science", 3),
    ("Classical Chinese", 1),
    ("Technology/Home Economics/Informatics", 2),
];

const YEAR_TWO: &[(&str, u32)] = &[
    ("Korean", 4),
    ("Mathematics", 4),
    ("Probability and Statistics", 2),
    ("English", 4),
    ("Inquiry 1", 3),
    ("Inquiry 2", 3),
    ("Inquiry 3", 3),
    ("Second Foreign Language", 2),
];

const YEAR_THREE: &[(&str, u32)] = &[("Korean", 3), ("English", 3), ("Mathematics", 3)];

/// Catalog `(name, credits)` for the year of `key`.
pub fn default_catalog(key: SemesterKey) -> &'static [(&'static str, u32)] {
    match key.year() {
        1 => YEAR_ONE,
        2 => YEAR_TWO,
        _ => YEAR_THREE,
    }
}

/// Detailed-mode record seeded with the year catalog and fresh ids.
pub fn default_record(key: SemesterKey) -> SemesterRecord {
    SemesterRecord::detailed(
        default_catalog(key)
            .iter()
            .map(|(name, credits)| Subject::new(*name, *credits))
            .collect(),
    )
}
