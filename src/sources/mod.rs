//! Source clients and shared HTTP utilities for upstream drug APIs.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::HeaderValue;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::DrugInfoError;

pub(crate) mod openfda;
pub(crate) mod pillbox;
pub(crate) mod request_log;
pub(crate) mod rxnorm;

const ERROR_BODY_MAX_BYTES: usize = 2048;
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

static HTTP_CLIENT: OnceLock<ClientWithMiddleware> = OnceLock::new();

/// Returns the process-wide HTTP client.
///
/// - Timeout: 30s per request, 10s to connect
/// - Middleware: request logging only; failed calls are not retried
pub(crate) fn shared_client() -> Result<ClientWithMiddleware, DrugInfoError> {
    if let Some(client) = HTTP_CLIENT.get() {
        return Ok(client.clone());
    }

    let base_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("druginfo/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(DrugInfoError::HttpClientInit)?;

    let client = ClientBuilder::new(base_client)
        .with(request_log::RequestLogMiddleware)
        .build();

    match HTTP_CLIENT.set(client.clone()) {
        Ok(()) => Ok(client),
        Err(_) => HTTP_CLIENT.get().cloned().ok_or_else(|| DrugInfoError::Api {
            api: "http-client".into(),
            message: "Shared HTTP client initialization race".into(),
        }),
    }
}

pub(crate) fn join_endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub(crate) fn body_excerpt(bytes: &[u8]) -> String {
    let full = String::from_utf8_lossy(bytes);

    let truncated: &str = if full.len() > ERROR_BODY_MAX_BYTES {
        let mut end = ERROR_BODY_MAX_BYTES;
        while end > 0 && !full.is_char_boundary(end) {
            end -= 1;
        }
        &full[..end]
    } else {
        full.as_ref()
    };

    let mut s = truncated.trim().replace(['\n', '\r', '\t'], " ");
    if full.len() > ERROR_BODY_MAX_BYTES {
        s.push_str(" …");
    }
    s
}

pub(crate) fn ensure_json_content_type(
    api: &str,
    content_type: Option<&HeaderValue>,
    body: &[u8],
) -> Result<(), DrugInfoError> {
    let Some(content_type) = content_type else {
        return Ok(());
    };

    let raw = match content_type.to_str() {
        Ok(v) => v.trim(),
        Err(_) => {
            warn!(
                source = api,
                "Response content-type header was not valid UTF-8; attempting JSON parse"
            );
            return Ok(());
        }
    };
    if raw.is_empty() {
        return Ok(());
    }

    let media_type = raw
        .split(';')
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .to_ascii_lowercase();
    if matches!(media_type.as_str(), "text/html" | "application/xhtml+xml") {
        return Err(DrugInfoError::Api {
            api: api.to_string(),
            message: format!(
                "Unexpected HTML response (content-type: {raw}): {}",
                body_excerpt(body)
            ),
        });
    }

    let is_json = media_type == "application/json"
        || media_type == "text/json"
        || media_type.ends_with("+json");
    if !is_json {
        warn!(
            source = api,
            content_type = raw,
            "Unexpected non-JSON content type; attempting JSON parse for compatibility"
        );
    }

    Ok(())
}

pub(crate) async fn read_limited_body(
    mut resp: reqwest::Response,
    api: &str,
) -> Result<Vec<u8>, DrugInfoError> {
    let mut body: Vec<u8> = Vec::new();

    while let Some(chunk) = resp.chunk().await? {
        let next_len = body.len().saturating_add(chunk.len());
        if next_len > DEFAULT_MAX_BODY_BYTES {
            return Err(DrugInfoError::Api {
                api: api.to_string(),
                message: format!("Response body exceeded {DEFAULT_MAX_BODY_BYTES} bytes"),
            });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Sends `req` and decodes a JSON body.
///
/// HTTP 404 maps to `Ok(None)`; every other non-2xx status, HTML body or
/// decode failure is an error.
pub(crate) async fn get_json_optional<T: DeserializeOwned>(
    api: &str,
    req: RequestBuilder,
) -> Result<Option<T>, DrugInfoError> {
    let resp = req.send().await?;
    let status = resp.status();
    let content_type = resp.headers().get(reqwest::header::CONTENT_TYPE).cloned();
    let bytes = read_limited_body(resp, api).await?;

    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }

    if !status.is_success() {
        let excerpt = body_excerpt(&bytes);
        return Err(DrugInfoError::Api {
            api: api.to_string(),
            message: format!("HTTP {status}: {excerpt}"),
        });
    }

    ensure_json_content_type(api, content_type.as_ref(), &bytes)?;
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| DrugInfoError::ApiJson {
            api: api.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, serde::Deserialize)]
    struct Probe {
        ok: bool,
    }

    #[test]
    fn join_endpoint_normalizes_slashes() {
        assert_eq!(
            join_endpoint("https://rxnav.nlm.nih.gov/REST/", "/rxcui.json"),
            "https://rxnav.nlm.nih.gov/REST/rxcui.json"
        );
        assert_eq!(
            join_endpoint("http://127.0.0.1:9", "drug/event.json"),
            "http://127.0.0.1:9/drug/event.json"
        );
    }

    #[test]
    fn body_excerpt_flattens_whitespace_and_truncates() {
        assert_eq!(body_excerpt(b"  line one\nline\ttwo  "), "line one line two");

        let long = "x".repeat(ERROR_BODY_MAX_BYTES + 10);
        let excerpt = body_excerpt(long.as_bytes());
        assert!(excerpt.ends_with(" …"));
        assert!(excerpt.len() < long.len());
    }

    #[test]
    fn ensure_json_content_type_rejects_html() {
        let err = ensure_json_content_type(
            "rxnav",
            Some(&HeaderValue::from_static("text/html; charset=utf-8")),
            b"<html><body>maintenance</body></html>",
        )
        .expect_err("html should be rejected");
        let msg = err.to_string();
        assert!(msg.contains("rxnav"));
        assert!(msg.contains("HTML"));
    }

    #[test]
    fn ensure_json_content_type_allows_non_json_compat_mode() {
        let ok = ensure_json_content_type(
            "pillbox",
            Some(&HeaderValue::from_static("text/plain")),
            b"{\"ok\":true}",
        );
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn get_json_optional_maps_404_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("{\"error\":{}}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = shared_client().unwrap();
        let req = client.get(format!("{}/missing", server.uri()));
        let out: Option<Probe> = get_json_optional("test-api", req).await.unwrap();
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn get_json_optional_reports_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/boom"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let client = shared_client().unwrap();
        let req = client.get(format!("{}/boom", server.uri()));
        let err = get_json_optional::<Probe>("test-api", req)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("test-api"));
        assert!(msg.contains("503"));
        assert!(msg.contains("upstream down"));
    }

    #[tokio::test]
    async fn get_json_optional_reports_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\": tru"))
            .mount(&server)
            .await;

        let client = shared_client().unwrap();
        let req = client.get(format!("{}/garbled", server.uri()));
        let err = get_json_optional::<Probe>("test-api", req)
            .await
            .unwrap_err();
        assert!(matches!(err, DrugInfoError::ApiJson { .. }));
    }

    #[tokio::test]
    async fn get_json_optional_decodes_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fine"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = shared_client().unwrap();
        let req = client.get(format!("{}/fine", server.uri()));
        let out: Option<Probe> = get_json_optional("test-api", req).await.unwrap();
        assert!(out.is_some_and(|p| p.ok));
    }
}
