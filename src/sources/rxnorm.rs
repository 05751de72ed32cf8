use std::borrow::Cow;

use serde::Deserialize;

use crate::error::DrugInfoError;

const RXNORM_API: &str = "rxnav";

pub struct RxNormClient {
    client: reqwest_middleware::ClientWithMiddleware,
    base: Cow<'static, str>,
}

impl RxNormClient {
    pub fn new(base: Cow<'static, str>) -> Result<Self, DrugInfoError> {
        Ok(Self {
            client: crate::sources::shared_client()?,
            base,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        crate::sources::join_endpoint(self.base.as_ref(), path)
    }

    fn rxcui_endpoint(&self, rxcui: &str, leaf: &str) -> Result<String, DrugInfoError> {
        if !is_valid_rxcui(rxcui) {
            return Err(DrugInfoError::InvalidArgument(format!(
                "RxCUI must be alphanumeric, got '{rxcui}'"
            )));
        }
        Ok(self.endpoint(&format!("rxcui/{rxcui}/{leaf}")))
    }

    /// Looks up the RxCUI list for a free-text name and returns the first one.
    pub async fn rxcui(&self, name: &str) -> Result<Option<String>, DrugInfoError> {
        let url = self.endpoint("rxcui.json");
        let req = self.client.get(&url).query(&[("name", name)]);
        let resp: Option<RxcuiResponse> = crate::sources::get_json_optional(RXNORM_API, req).await?;
        Ok(resp
            .and_then(|r| r.id_group)
            .and_then(|g| g.rxnorm_id.into_iter().next()))
    }

    pub async fn properties(
        &self,
        rxcui: &str,
    ) -> Result<Option<RxNormProperties>, DrugInfoError> {
        let url = self.rxcui_endpoint(rxcui, "properties.json")?;
        let resp: Option<PropertiesResponse> =
            crate::sources::get_json_optional(RXNORM_API, self.client.get(&url)).await?;
        Ok(resp.and_then(|r| r.properties))
    }

    pub async fn all_related(
        &self,
        rxcui: &str,
    ) -> Result<Option<Vec<RxConceptGroup>>, DrugInfoError> {
        let url = self.rxcui_endpoint(rxcui, "allrelated.json")?;
        let resp: Option<AllRelatedResponse> =
            crate::sources::get_json_optional(RXNORM_API, self.client.get(&url)).await?;
        Ok(resp
            .and_then(|r| r.all_related_group)
            .and_then(|g| g.concept_group))
    }

    pub async fn interactions(
        &self,
        rxcui: &str,
    ) -> Result<Option<Vec<InteractionTypeGroup>>, DrugInfoError> {
        if !is_valid_rxcui(rxcui) {
            return Err(DrugInfoError::InvalidArgument(format!(
                "RxCUI must be alphanumeric, got '{rxcui}'"
            )));
        }
        let url = self.endpoint("interaction/interaction.json");
        let req = self.client.get(&url).query(&[("rxcui", rxcui)]);
        let resp: Option<InteractionResponse> =
            crate::sources::get_json_optional(RXNORM_API, req).await?;
        Ok(resp.and_then(|r| r.interaction_type_group))
    }

    /// Returns the raw `ndcStatus` object; its keys vary by status.
    pub async fn ndc_status(
        &self,
        rxcui: &str,
    ) -> Result<Option<serde_json::Map<String, serde_json::Value>>, DrugInfoError> {
        let url = self.rxcui_endpoint(rxcui, "ndcstatus.json")?;
        let resp: Option<NdcStatusResponse> =
            crate::sources::get_json_optional(RXNORM_API, self.client.get(&url)).await?;
        Ok(resp.and_then(|r| r.ndc_status))
    }
}

fn is_valid_rxcui(rxcui: &str) -> bool {
    !rxcui.is_empty() && rxcui.chars().all(|c| c.is_ascii_alphanumeric())
}

#[derive(Debug, Deserialize)]
struct RxcuiResponse {
    #[serde(rename = "idGroup")]
    id_group: Option<IdGroup>,
}

#[derive(Debug, Deserialize)]
struct IdGroup {
    #[serde(rename = "rxnormId", default)]
    rxnorm_id: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PropertiesResponse {
    properties: Option<RxNormProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RxNormProperties {
    #[serde(default)]
    pub rxcui: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub synonym: Option<String>,
    #[serde(default)]
    pub indication: Option<String>,
    #[serde(default)]
    pub tty: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AllRelatedResponse {
    #[serde(rename = "allRelatedGroup")]
    all_related_group: Option<AllRelatedGroup>,
}

#[derive(Debug, Deserialize)]
struct AllRelatedGroup {
    #[serde(rename = "conceptGroup")]
    concept_group: Option<Vec<RxConceptGroup>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RxConceptGroup {
    #[serde(default)]
    #[allow(dead_code)]
    pub tty: Option<String>,
    #[serde(rename = "conceptProperties", default)]
    pub concept_properties: Vec<RxConcept>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RxConcept {
    pub tty: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct InteractionResponse {
    #[serde(rename = "interactionTypeGroup")]
    interaction_type_group: Option<Vec<InteractionTypeGroup>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionTypeGroup {
    #[serde(rename = "interactionType", default)]
    pub interaction_type: Vec<InteractionType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionType {
    #[serde(rename = "interactionPair", default)]
    pub interaction_pair: Vec<RxInteractionPair>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RxInteractionPair {
    #[serde(rename = "interactionConcept", default)]
    pub interaction_concept: Vec<InteractionConcept>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionConcept {
    #[serde(rename = "sourceConceptItem")]
    pub source_concept_item: SourceConceptItem,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConceptItem {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct NdcStatusResponse {
    #[serde(rename = "ndcStatus")]
    ndc_status: Option<serde_json::Map<String, serde_json::Value>>,
}
