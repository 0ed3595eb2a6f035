//! Lookup helpers for US states and territories.
//!
//! Maps 2-letter postal codes to canonical full names and back. Every state
//! token a user or a CSV file hands us goes through [`normalize`].

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Postal code -> canonical full name. Source: US Census Bureau.
pub const STATES: [(&str, &str); 54] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("PR", "Puerto Rico"),
    ("GU", "Guam"),
    ("VI", "U.S. Virgin Islands"),
];

static NAME_TO_ABBREV: OnceLock<HashMap<String, &'static str>> = OnceLock::new();

fn name_to_abbrev() -> &'static HashMap<String, &'static str> {
    NAME_TO_ABBREV.get_or_init(|| {
        STATES
            .iter()
            .map(|&(abbrev, name)| (name.to_uppercase(), abbrev))
            .collect()
    })
}

fn name_for(abbrev: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(code, _)| *code == abbrev)
        .map(|&(_, name)| name)
}

/// Convert a postal code or full name (any case, padded or not) to the
/// canonical full state name, e.g. `" ny "` -> `"New York"`.
pub fn normalize(token: &str) -> Result<&'static str> {
    let key = token.trim().to_uppercase();
    let resolved = if key.chars().count() == 2 {
        name_for(&key)
    } else {
        name_to_abbrev().get(&key).and_then(|abbrev| name_for(abbrev))
    };
    resolved.ok_or_else(|| Error::UnknownState(token.to_string()))
}

/// Postal code for a canonical full name. Exact match only.
pub fn abbreviation(name: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(_, full)| *full == name)
        .map(|&(abbrev, _)| abbrev)
}
