//! Client for USF's staff schedule search: session handling, form
//! navigation and results parsing.

pub mod errors;
pub mod form;
pub mod middleware;
pub mod models;
pub mod parser;
pub mod session;
pub mod terms;

pub use errors::SearchError;
pub use form::{SearchResponse, search};
pub use models::{ParseOutcome, Section, TrackedCourse};
pub use parser::parse_results;
pub use session::SearchSession;
pub use terms::{Season, Term};
