use std::sync::OnceLock;
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::error::DrugInfoError;

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthRow {
    pub api: String,
    pub status: String,
    pub latency: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub healthy: usize,
    pub total: usize,
    pub rows: Vec<HealthRow>,
}

impl HealthReport {
    fn from_rows(rows: Vec<HealthRow>) -> Self {
        let healthy = rows.iter().filter(|row| row.status == "ok").count();
        Self {
            healthy,
            total: rows.len(),
            rows,
        }
    }

    pub fn all_healthy(&self) -> bool {
        self.healthy == self.total
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# druginfo Health Check\n\n");
        out.push_str("| API | Status | Latency |\n");
        out.push_str("|-----|--------|---------|\n");
        for row in &self.rows {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                row.api, row.status, row.latency
            ));
        }
        out.push_str(&format!(
            "\nStatus: {}/{} APIs healthy\n",
            self.healthy, self.total
        ));
        out
    }
}

async fn check_one(client: reqwest::Client, api: &str, url: String) -> HealthRow {
    let start = Instant::now();
    let resp = client
        .get(&url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await;

    match resp {
        Ok(resp) => {
            let status = resp.status();
            let elapsed = start.elapsed().as_millis();
            if status.is_success() {
                HealthRow {
                    api: api.to_string(),
                    status: "ok".into(),
                    latency: format!("{elapsed}ms"),
                }
            } else {
                HealthRow {
                    api: api.to_string(),
                    status: "error".into(),
                    latency: format!("{elapsed}ms (HTTP {})", status.as_u16()),
                }
            }
        }
        Err(err) => {
            let reason = if err.is_timeout() {
                "timeout"
            } else if err.is_connect() {
                "connect"
            } else {
                "error"
            };
            HealthRow {
                api: api.to_string(),
                status: "error".into(),
                latency: reason.into(),
            }
        }
    }
}

fn health_http_client() -> Result<reqwest::Client, DrugInfoError> {
    static HEALTH_HTTP_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

    if let Some(client) = HEALTH_HTTP_CLIENT.get() {
        return Ok(client.clone());
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .user_agent(concat!("druginfo/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(DrugInfoError::HttpClientInit)?;

    match HEALTH_HTTP_CLIENT.set(client.clone()) {
        Ok(()) => Ok(client),
        Err(_) => HEALTH_HTTP_CLIENT
            .get()
            .cloned()
            .ok_or_else(|| DrugInfoError::Api {
                api: "health".into(),
                message: "Health HTTP client initialization race".into(),
            }),
    }
}

/// Runs one lightweight request against each configured upstream.
///
/// # Errors
///
/// Returns an error when the health HTTP client cannot be created.
pub async fn check(settings: &Settings) -> Result<HealthReport, DrugInfoError> {
    let client = health_http_client()?;
    let endpoint = crate::sources::join_endpoint;

    let (rxnav, openfda, pillbox) = tokio::join!(
        check_one(
            client.clone(),
            "RxNav",
            endpoint(settings.rxnorm_base.as_ref(), "version.json"),
        ),
        check_one(
            client.clone(),
            "OpenFDA",
            endpoint(settings.openfda_base.as_ref(), "drug/event.json?limit=1"),
        ),
        check_one(
            client.clone(),
            "Pillbox",
            endpoint(settings.pillbox_base.as_ref(), "search.json?name=aspirin"),
        ),
    );

    Ok(HealthReport::from_rows(vec![rxnav, openfda, pillbox]))
}
