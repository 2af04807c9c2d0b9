//! Academic terms as encoded by the schedule search form.
//!
//! A term ID is `year * 100 + season code`, e.g. `202108` for Fall 2021.

use std::fmt;

/// The seasons the search form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Two-digit suffix used in term IDs.
    pub fn code(self) -> u32 {
        match self {
            Self::Spring => 1,
            Self::Summer => 5,
            Self::Fall => 8,
        }
    }

    fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Spring),
            5 => Some(Self::Summer),
            8 => Some(Self::Fall),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
        })
    }
}

/// A resolved academic term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Term {
    pub year: u32,
    pub season: Season,
}

impl Term {
    /// Resolve a numeric term ID. Anything that isn't a four-digit year
    /// followed by a known season code fails the lookup.
    pub fn from_id(id: u32) -> Option<Self> {
        let year = id / 100;
        if !(1000..=9999).contains(&year) {
            return None;
        }
        let season = Season::from_code(id % 100)?;
        Some(Self { year, season })
    }

    /// The numeric ID the search form uses as the option value.
    pub fn id(&self) -> u32 {
        self.year * 100 + self.season.code()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.season, self.year)
    }
}
