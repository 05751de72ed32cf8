use std::time::Duration;

use http::Extensions;
use reqwest_middleware::{Middleware, Next};
use tokio::time::Instant;
use tracing::debug;

/// Logs every outbound call with its status and latency.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RequestLogMiddleware;

fn redact_api_key(url: &reqwest::Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "api_key") {
        return url.to_string();
    }
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "api_key" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

/// Saturates instead of wrapping for durations past `u64::MAX` ms.
fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait::async_trait]
impl Middleware for RequestLogMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let method = req.method().clone();
        let url = redact_api_key(req.url());
        let start = Instant::now();
        let result = next.run(req, extensions).await;
        let elapsed_ms = elapsed_millis(start.elapsed());
        match &result {
            Ok(resp) => debug!(
                %method,
                url = %url,
                status = resp.status().as_u16(),
                elapsed_ms,
                "upstream request"
            ),
            Err(err) => debug!(%method, url = %url, elapsed_ms, "upstream request failed: {err}"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_millis_saturates() {
        assert_eq!(elapsed_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(elapsed_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn redact_api_key_masks_only_the_key() {
        let url = reqwest::Url::parse(
            "https://api.fda.gov/drug/event.json?search=x&api_key=secret&count=y",
        )
        .unwrap();
        let out = redact_api_key(&url);
        assert!(!out.contains("secret"));
        assert!(out.contains("api_key=***") || out.contains("api_key=%2A%2A%2A"));
        assert!(out.contains("search=x"));
        assert!(out.contains("count=y"));
    }

    #[test]
    fn redact_api_key_leaves_plain_urls_alone() {
        let url = reqwest::Url::parse("https://rxnav.nlm.nih.gov/REST/rxcui.json?name=Advil")
            .unwrap();
        assert_eq!(
            redact_api_key(&url),
            "https://rxnav.nlm.nih.gov/REST/rxcui.json?name=Advil"
        );
    }
}
