use std::borrow::Cow;

use serde::Deserialize;

use crate::error::DrugInfoError;

const PILLBOX_API: &str = "pillbox";

pub struct PillboxClient {
    client: reqwest_middleware::ClientWithMiddleware,
    base: Cow<'static, str>,
}

impl PillboxClient {
    pub fn new(base: Cow<'static, str>) -> Result<Self, DrugInfoError> {
        Ok(Self {
            client: crate::sources::shared_client()?,
            base,
        })
    }

    pub async fn search(&self, name: &str) -> Result<Option<PillboxSearchResponse>, DrugInfoError> {
        let url = crate::sources::join_endpoint(self.base.as_ref(), "search.json");
        let req = self.client.get(&url).query(&[("name", name)]);
        crate::sources::get_json_optional(PILLBOX_API, req).await
    }
}

#[derive(Debug, Deserialize)]
pub struct PillboxSearchResponse {
    #[serde(default)]
    pub results: Option<Vec<PillboxResult>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PillboxResult {
    pub image_url: String,
}
