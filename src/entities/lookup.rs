//! Drug lookup: resolve a name, fan out to every attribute source, and
//! assemble the plain-language report.

use serde::Serialize;
use tracing::{info, warn};

use crate::cache::MemoCache;
use crate::config::Settings;
use crate::entities::alternatives::AlternativesTable;
use crate::entities::drug::{
    DosageStatus, DrugProfile, DrugProperties, InteractionPair, RelatedConcepts,
};
use crate::error::DrugInfoError;
use crate::sources::openfda::OpenFdaClient;
use crate::sources::pillbox::PillboxClient;
use crate::sources::rxnorm::RxNormClient;
use crate::transform;

/// A successful lookup, shaped like the `POST /drug-info` 200 body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrugReport {
    pub drug_name: String,
    pub rxcui: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(DrugReport),
    /// RxNorm could not map the name to an RxCUI.
    UnknownDrug,
    /// An RxCUI exists but every category came back empty.
    NoData { rxcui: String },
}

type Cache<T> = MemoCache<String, Option<T>>;

struct FetchCaches {
    rxcui: Cache<String>,
    properties: Cache<DrugProperties>,
    related: Cache<RelatedConcepts>,
    interactions: Cache<Vec<InteractionPair>>,
    side_effects: Cache<Vec<String>>,
    dosage: Cache<DosageStatus>,
    images: Cache<Vec<String>>,
}

impl FetchCaches {
    fn new(capacity: usize) -> Self {
        Self {
            rxcui: MemoCache::new(capacity),
            properties: MemoCache::new(capacity),
            related: MemoCache::new(capacity),
            interactions: MemoCache::new(capacity),
            side_effects: MemoCache::new(capacity),
            dosage: MemoCache::new(capacity),
            images: MemoCache::new(capacity),
        }
    }
}

/// Serves a cached answer for `key`, otherwise runs `fetch` and caches its
/// successful result. Failures pass through uncached.
async fn memoized<T, F, Fut>(cache: &Cache<T>, key: &str, fetch: F) -> Result<Option<T>, DrugInfoError>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, DrugInfoError>>,
{
    if let Some(hit) = cache.get(key) {
        return Ok(hit);
    }
    let value = fetch().await?;
    cache.insert(key.to_string(), value.clone());
    Ok(value)
}

/// Collapses a fetch failure into "no data", logging why.
fn settle<T>(source: &'static str, key: &str, result: Result<Option<T>, DrugInfoError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(key, "Error fetching {source}: {err}");
            None
        }
    }
}

pub struct DrugInfoService {
    rxnorm: RxNormClient,
    openfda: OpenFdaClient,
    pillbox: PillboxClient,
    alternatives: AlternativesTable,
    caches: FetchCaches,
}

impl DrugInfoService {
    pub fn new(settings: &Settings, alternatives: AlternativesTable) -> Result<Self, DrugInfoError> {
        let caches = FetchCaches::new(settings.cache_capacity);
        info!(
            alternatives = alternatives.len(),
            cache_capacity = caches.rxcui.capacity(),
            "Drug info service configured"
        );
        Ok(Self {
            rxnorm: RxNormClient::new(settings.rxnorm_base.clone())?,
            openfda: OpenFdaClient::new(
                settings.openfda_base.clone(),
                settings.openfda_api_key.clone(),
            )?,
            pillbox: PillboxClient::new(settings.pillbox_base.clone())?,
            alternatives,
            caches,
        })
    }

    /// Builds the service, reading the alternatives file when one is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, DrugInfoError> {
        let alternatives = match settings.alternatives_file.as_deref() {
            Some(path) => AlternativesTable::from_json_file(path)?,
            None => AlternativesTable::default(),
        };
        Self::new(settings, alternatives)
    }

    pub async fn resolve(&self, name: &str) -> Result<Option<String>, DrugInfoError> {
        memoized(&self.caches.rxcui, name, || self.rxnorm.rxcui(name)).await
    }

    pub async fn properties(&self, rxcui: &str) -> Result<Option<DrugProperties>, DrugInfoError> {
        memoized(&self.caches.properties, rxcui, || async {
            let raw = self.rxnorm.properties(rxcui).await;
            raw.map(|props| props.and_then(transform::drug::properties_from_rxnorm))
        })
        .await
    }

    pub async fn related_concepts(
        &self,
        rxcui: &str,
    ) -> Result<Option<RelatedConcepts>, DrugInfoError> {
        memoized(&self.caches.related, rxcui, || async {
            let raw = self.rxnorm.all_related(rxcui).await;
            raw.map(|groups| {
                groups.map(|groups| transform::drug::related_concepts_from_groups(&groups))
            })
        })
        .await
    }

    pub async fn interactions(
        &self,
        rxcui: &str,
    ) -> Result<Option<Vec<InteractionPair>>, DrugInfoError> {
        memoized(&self.caches.interactions, rxcui, || async {
            let raw = self.rxnorm.interactions(rxcui).await;
            raw.map(|groups| {
                groups.map(|groups| transform::drug::interaction_pairs_from_groups(&groups))
            })
        })
        .await
    }

    pub async fn side_effects(&self, name: &str) -> Result<Option<Vec<String>>, DrugInfoError> {
        memoized(&self.caches.side_effects, name, || async {
            let raw = self.openfda.reaction_counts(name).await;
            raw.map(|resp| resp.and_then(transform::adverse_event::side_effect_terms))
        })
        .await
    }

    pub async fn dosage_status(&self, rxcui: &str) -> Result<Option<DosageStatus>, DrugInfoError> {
        memoized(&self.caches.dosage, rxcui, || async {
            let raw = self.rxnorm.ndc_status(rxcui).await;
            raw.map(|status| {
                status.and_then(|status| transform::drug::dosage_status_from_ndc(&status))
            })
        })
        .await
    }

    pub async fn images(&self, name: &str) -> Result<Option<Vec<String>>, DrugInfoError> {
        memoized(&self.caches.images, name, || async {
            let raw = self.pillbox.search(name).await;
            raw.map(|resp| resp.and_then(transform::drug::image_urls))
        })
        .await
    }

    pub fn alternatives(&self, name: &str) -> Vec<String> {
        self.alternatives.lookup(name)
    }

    /// Gathers every category for an already-resolved drug.
    ///
    /// The six fetches share nothing but their keys, so they run concurrently.
    pub async fn profile(&self, name: &str, rxcui: &str) -> DrugProfile {
        let (properties, related, interactions, side_effects, dosage, images) = tokio::join!(
            self.properties(rxcui),
            self.related_concepts(rxcui),
            self.interactions(rxcui),
            self.side_effects(name),
            self.dosage_status(rxcui),
            self.images(name),
        );

        DrugProfile {
            properties: settle("drug details", rxcui, properties),
            related: settle("related drugs", rxcui, related),
            alternatives: self.alternatives(name),
            interactions: settle("drug interactions", rxcui, interactions),
            side_effects: settle("side effects", name, side_effects),
            dosage: settle("dosage info", rxcui, dosage),
            images: settle("drug images", name, images),
        }
    }

    pub async fn lookup(&self, name: &str) -> LookupOutcome {
        info!(drug = name, "Fetching information for drug");

        let Some(rxcui) = settle("RxCUI", name, self.resolve(name).await) else {
            return LookupOutcome::UnknownDrug;
        };

        let profile = self.profile(name, &rxcui).await;
        if !profile.has_any_data() {
            return LookupOutcome::NoData { rxcui };
        }

        LookupOutcome::Found(DrugReport {
            drug_name: name.to_string(),
            rxcui,
            response: crate::render::report::layman_report(&profile),
        })
    }
}
