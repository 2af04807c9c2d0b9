//! A short-lived browser-like HTTP session against the schedule search site.
//!
//! Each tick builds a fresh session so cookies and proxy state never leak
//! from one poll into the next.

use crate::usf::errors::SearchError;
use crate::usf::form::{FormMethod, FormSubmission};
use crate::usf::middleware::TracingMiddleware;
use html_scraper::Html;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A page returned by the search site.
#[derive(Debug, Clone)]
pub struct Document {
    /// Final URL after redirects.
    pub url: Url,
    /// Whether the response declared itself as HTML.
    pub is_html: bool,
    pub body: String,
}

impl Document {
    /// Parse the body. `Html` isn't `Send`, so callers parse, read what they
    /// need, and drop it before the next await.
    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

pub struct SearchSession {
    http: ClientWithMiddleware,
}

impl SearchSession {
    /// Build a session with its own cookie jar, optionally routed through a proxy.
    pub fn new(proxy: Option<(&str, u16)>) -> Result<Self, SearchError> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT);

        builder = match proxy {
            Some((host, port)) => {
                debug!(host, port, "routing search session through proxy");
                builder.proxy(reqwest::Proxy::all(format!("http://{host}:{port}"))?)
            }
            None => builder.no_proxy(),
        };

        let http = ClientBuilder::new(builder.build()?)
            .with(TracingMiddleware)
            .build();

        Ok(Self { http })
    }

    pub async fn get(&self, url: &Url) -> Result<Document, SearchError> {
        let response = self.http.get(url.clone()).send().await?;
        Self::read(response).await
    }

    /// Send a filled form the way a browser would for its method.
    pub async fn submit(&self, submission: &FormSubmission) -> Result<Document, SearchError> {
        let response = match submission.method {
            FormMethod::Get => {
                let mut url = submission.action.clone();
                url.query_pairs_mut().clear().extend_pairs(&submission.fields);
                self.http.get(url).send().await?
            }
            FormMethod::Post => {
                self.http
                    .post(submission.action.clone())
                    .form(&submission.fields)
                    .send()
                    .await?
            }
        };
        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> Result<Document, SearchError> {
        let status = response.status();
        let url = response.url().clone();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let is_html = is_html(response.headers());
        let body = response.text().await?;
        Ok(Document { url, is_html, body })
    }
}

/// A missing content type is treated as HTML, as browsers do.
fn is_html(headers: &HeaderMap) -> bool {
    match headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        None => true,
        Some(content_type) => {
            let content_type = content_type.to_ascii_lowercase();
            content_type.starts_with("text/html") || content_type.starts_with("application/xhtml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(content_type: Option<&'static str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(ct) = content_type {
            map.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        map
    }

    #[test]
    fn test_is_html() {
        assert!(is_html(&headers(Some("text/html; charset=utf-8"))));
        assert!(is_html(&headers(Some("TEXT/HTML"))));
        assert!(is_html(&headers(Some("application/xhtml+xml"))));
        assert!(is_html(&headers(None)));
        assert!(!is_html(&headers(Some("application/json"))));
        assert!(!is_html(&headers(Some("text/plain"))));
    }

    #[test]
    fn test_session_builds_with_and_without_proxy() {
        assert!(SearchSession::new(None).is_ok());
        assert!(SearchSession::new(Some(("127.0.0.1", 8080))).is_ok());
    }
}
