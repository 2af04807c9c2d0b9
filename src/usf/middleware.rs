//! HTTP middleware that logs every outbound request.

use crate::utils::fmt_duration;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};
use url::Url;

/// Requests slower than this are logged at WARN.
const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(5);

const REDACTED: &str = "***";

pub struct TracingMiddleware;

#[async_trait::async_trait]
impl Middleware for TracingMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let method = req.method().clone();
        let full_url = req.url().clone();
        let url = redact_url(&full_url);
        trace!(%method, url, "sending request");

        let start = Instant::now();
        let result = next.run(req, extensions).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(response) => {
                let status = response.status().as_u16();
                if elapsed > SLOW_REQUEST_THRESHOLD {
                    warn!(%method, url, status, duration = fmt_duration(elapsed), "slow request");
                } else {
                    debug!(%method, url, status, duration = fmt_duration(elapsed), "request completed");
                }
            }
            Err(e) => {
                // reqwest puts the full URL in its error text
                let error = e.to_string().replace(full_url.as_str(), &url);
                warn!(%method, url, duration = fmt_duration(elapsed), error, "request failed");
            }
        }

        result
    }
}

/// Scheme, host, port and path only. The segment after a webhook ID is its
/// token and is masked.
pub fn redact_url(url: &Url) -> String {
    let mut shown = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        shown.push_str(&format!(":{port}"));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();
    for (i, segment) in segments.iter().enumerate() {
        shown.push('/');
        if i >= 2 && segments[i - 2] == "webhooks" {
            shown.push_str(REDACTED);
        } else {
            shown.push_str(segment);
        }
    }
    shown
}
