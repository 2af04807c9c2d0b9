//! Error types for the schedule search client.

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search site returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("search page is missing {0}")]
    MissingElement(&'static str),
    #[error("term {term} is not offered by the search form")]
    TermNotListed { term: u32 },
    #[error("row for CRN {crn} has a non-numeric {column} value: {value:?}")]
    InvalidSeatCount {
        crn: String,
        column: &'static str,
        value: String,
    },
    #[error("row for CRN {crn} has no column {index}")]
    MissingColumn { crn: String, index: usize },
    #[error("invalid URL")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Request(#[from] reqwest_middleware::Error),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl SearchError {
    /// True when the page came back but didn't have the shape we expect.
    pub fn is_page_structure(&self) -> bool {
        matches!(
            self,
            Self::MissingElement(_) | Self::TermNotListed { .. }
        )
    }

    /// True for a non-2xx response from the search site.
    pub fn is_http_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(SearchError::MissingElement("P_REF").is_page_structure());
        assert!(SearchError::TermNotListed { term: 202108 }.is_page_structure());
        let status = SearchError::Status {
            status: 503,
            url: "https://example.edu".into(),
        };
        assert!(status.is_http_status());
        assert!(!status.is_page_structure());
        let bad = SearchError::InvalidSeatCount {
            crn: "12345".into(),
            column: "open seats",
            value: "n/a".into(),
        };
        assert!(!bad.is_page_structure());
        assert!(!bad.is_http_status());
    }
}
