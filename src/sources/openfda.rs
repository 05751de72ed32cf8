use std::borrow::Cow;

use serde::Deserialize;

use crate::error::DrugInfoError;

const OPENFDA_API: &str = "openfda";
const REACTION_COUNT_FIELD: &str = "patient.reaction.reactionmeddrapt.exact";

pub struct OpenFdaClient {
    client: reqwest_middleware::ClientWithMiddleware,
    base: Cow<'static, str>,
    api_key: Option<String>,
}

impl OpenFdaClient {
    pub fn new(base: Cow<'static, str>, api_key: Option<String>) -> Result<Self, DrugInfoError> {
        Ok(Self {
            client: crate::sources::shared_client()?,
            base,
            api_key: api_key
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        crate::sources::join_endpoint(self.base.as_ref(), path)
    }

    pub(crate) fn escape_query_value(value: &str) -> String {
        crate::utils::query::escape_lucene_value(value)
    }

    /// Counts adverse-event reaction terms reported for a medicinal product.
    ///
    /// OpenFDA answers HTTP 404 when nothing matches; that and an `error`
    /// envelope are both "no data".
    pub async fn reaction_counts(
        &self,
        drug_name: &str,
    ) -> Result<Option<OpenFdaCountResponse>, DrugInfoError> {
        if drug_name.len() > 1024 {
            return Err(DrugInfoError::InvalidArgument(
                "Drug name is too long.".into(),
            ));
        }

        let escaped = Self::escape_query_value(drug_name);
        let search = format!("patient.drug.medicinalproduct:\"{escaped}\"");
        let url = self.endpoint("drug/event.json");
        let mut req = self.client.get(&url).query(&[
            ("search", search.as_str()),
            ("count", REACTION_COUNT_FIELD),
        ]);
        if let Some(key) = self.api_key.as_deref() {
            req = req.query(&[("api_key", key)]);
        }

        let Some(value) =
            crate::sources::get_json_optional::<serde_json::Value>(OPENFDA_API, req).await?
        else {
            return Ok(None);
        };
        if value.get("error").is_some_and(serde_json::Value::is_object) {
            return Ok(None);
        }

        serde_json::from_value::<OpenFdaCountResponse>(value)
            .map(Some)
            .map_err(|source| DrugInfoError::ApiJson {
                api: OPENFDA_API.to_string(),
                source,
            })
    }
}

#[derive(Debug, Deserialize)]
pub struct OpenFdaCountResponse {
    #[serde(default)]
    pub results: Option<Vec<OpenFdaCountBucket>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenFdaCountBucket {
    pub term: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reaction_counts_builds_quoted_product_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/event.json"))
            .and(query_param("search", "patient.drug.medicinalproduct:\"Metformin\""))
            .and(query_param("count", REACTION_COUNT_FIELD))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "meta": {"disclaimer": "..."},
                "results": [
                    {"term": "NAUSEA", "count": 3120},
                    {"term": "DIARRHOEA", "count": 2987}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenFdaClient::new(Cow::Owned(server.uri()), None).unwrap();
        let resp = client.reaction_counts("Metformin").await.unwrap().unwrap();
        let terms: Vec<&str> = resp
            .results
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|b| b.term.as_str())
            .collect();
        assert_eq!(terms, ["NAUSEA", "DIARRHOEA"]);
    }

    #[tokio::test]
    async fn reaction_counts_escapes_lucene_syntax() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/event.json"))
            .and(query_param(
                "search",
                "patient.drug.medicinalproduct:\"Tylenol \\(Extra\\)\"",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenFdaClient::new(Cow::Owned(server.uri()), None).unwrap();
        let resp = client.reaction_counts("Tylenol (Extra)").await.unwrap();
        assert!(resp.is_some());
    }

    #[tokio::test]
    async fn reaction_counts_sends_api_key_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/event.json"))
            .and(query_param("api_key", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"term": "HEADACHE", "count": 1}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OpenFdaClient::new(Cow::Owned(server.uri()), Some(" abc123 ".into())).unwrap();
        assert!(client.reaction_counts("Advil").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn reaction_counts_maps_not_found_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/event.json"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"code": "NOT_FOUND", "message": "No matches found!"}
            })))
            .mount(&server)
            .await;

        let client = OpenFdaClient::new(Cow::Owned(server.uri()), None).unwrap();
        assert!(client.reaction_counts("notadrug").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reaction_counts_rejects_bucket_without_term() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/event.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"term": "NAUSEA", "count": 4}, {"count": 2}]
            })))
            .mount(&server)
            .await;

        let client = OpenFdaClient::new(Cow::Owned(server.uri()), None).unwrap();
        let err = client.reaction_counts("Metformin").await.unwrap_err();
        assert!(matches!(err, DrugInfoError::ApiJson { .. }));
    }
}
