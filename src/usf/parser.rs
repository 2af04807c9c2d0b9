//! Extraction of seat counts from the search results table.
//!
//! The results table (`table#results`) has one row per meeting line. Columns
//! used here, 0-based:
//!   3  CRN
//!   4  course title
//!   12 open seats
//!   15 enrolled seats

use crate::usf::errors::SearchError;
use crate::usf::models::{ParseOutcome, Section, TrackedCourse};
use html_scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::trace;

const CRN_COLUMN: usize = 3;
const TITLE_COLUMN: usize = 4;
const OPEN_SEATS_COLUMN: usize = 12;
const ENROLLED_COLUMN: usize = 15;

static RESULTS_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table#results").unwrap());
static ROWS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());

/// Parse the sections matching `course` out of a results page.
///
/// A missing results table is `success == false`. A matching row whose seat
/// counts aren't integers is an error, not a skipped row.
pub fn parse_results(html: &Html, course: &TrackedCourse) -> Result<ParseOutcome, SearchError> {
    let Some(table) = html.select(&RESULTS_TABLE).next() else {
        return Ok(ParseOutcome::not_found());
    };

    let crn = course.crn.to_string();
    let mut sections = Vec::new();

    for row in table.select(&ROWS).filter(|row| owned_by(*row, table)) {
        let cells = row_cells(row);
        if cells.get(CRN_COLUMN) != Some(&crn) {
            continue;
        }

        let open_seats = seat_count(&cells, OPEN_SEATS_COLUMN, "open seats", &crn)?;
        let enrolled = seat_count(&cells, ENROLLED_COLUMN, "enrolled seats", &crn)?;
        let total_seats = open_seats.saturating_add(enrolled);
        if total_seats == 0 {
            trace!(crn = crn.as_str(), "skipping placeholder row with no seats");
            continue;
        }

        sections.push(Section {
            course_name: cells.get(TITLE_COLUMN).cloned().unwrap_or_default(),
            crn: crn.clone(),
            total_seats,
            open_seats,
        });
    }

    Ok(ParseOutcome::found(sections))
}

/// Rows of nested tables belong to those tables, not ours.
fn owned_by(row: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
        .is_some_and(|owner| owner == table)
}

/// Whitespace-normalised text of each `td`/`th` in the row.
fn row_cells(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(|cell| {
            cell.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn seat_count(
    cells: &[String],
    index: usize,
    column: &'static str,
    crn: &str,
) -> Result<i32, SearchError> {
    let value = cells.get(index).ok_or_else(|| SearchError::MissingColumn {
        crn: crn.to_string(),
        index,
    })?;
    value
        .parse::<i32>()
        .map_err(|_| SearchError::InvalidSeatCount {
            crn: crn.to_string(),
            column,
            value: value.clone(),
        })
}
