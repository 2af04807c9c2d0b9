//! Data carried through one poll of the schedule search.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A section the user wants watched, as listed in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackedCourse {
    /// Numeric term ID, e.g. `202108`. Not checked until the course is
    /// searched, so a bad ID only affects its own course.
    pub term: i64,
    pub crn: u32,
}

impl fmt::Display for TrackedCourse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CRN {} (term {})", self.crn, self.term)
    }
}

/// Seat counts for one row of the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub course_name: String,
    pub crn: String,
    /// Open plus enrolled seats. Never zero for a parsed section.
    pub total_seats: i32,
    pub open_seats: i32,
}

impl Section {
    /// Whether the section currently has at least one open seat.
    pub fn is_open(&self) -> bool {
        self.open_seats > 0
    }
}

/// Result of parsing a search response for one tracked course.
///
/// `success == false` means the results table wasn't on the page at all;
/// an empty `sections` list with `success == true` means nothing matched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseOutcome {
    pub success: bool,
    pub sections: Vec<Section>,
}

impl ParseOutcome {
    pub fn not_found() -> Self {
        Self {
            success: false,
            sections: Vec::new(),
        }
    }

    pub fn found(sections: Vec<Section>) -> Self {
        Self {
            success: true,
            sections,
        }
    }
}
