use tracing::warn;

use crate::entities::drug::{
    ConceptTag, DosageStatus, DrugProperties, InteractionPair, RelatedConcepts,
};
use crate::sources::pillbox::PillboxSearchResponse;
use crate::sources::rxnorm::{InteractionTypeGroup, RxConceptGroup, RxNormProperties};

/// `None` when RxNav sent a `properties` object with every field missing.
pub(crate) fn properties_from_rxnorm(raw: RxNormProperties) -> Option<DrugProperties> {
    let RxNormProperties {
        rxcui,
        name,
        synonym,
        indication,
        tty,
    } = raw;
    if rxcui.is_none() && name.is_none() && synonym.is_none() && indication.is_none() && tty.is_none()
    {
        return None;
    }
    Some(DrugProperties {
        name,
        indication,
        synonym,
    })
}

/// Buckets every concept of the five report tags; other term types are dropped.
pub(crate) fn related_concepts_from_groups(groups: &[RxConceptGroup]) -> RelatedConcepts {
    groups
        .iter()
        .flat_map(|group| group.concept_properties.iter())
        .filter_map(|concept| {
            ConceptTag::from_tty(&concept.tty).map(|tag| (tag, concept.name.clone()))
        })
        .collect()
}

/// Flattens type group → type → pair into triples, in encounter order.
///
/// Pairs that do not name exactly two concepts are skipped.
pub(crate) fn interaction_pairs_from_groups(groups: &[InteractionTypeGroup]) -> Vec<InteractionPair> {
    let mut out = Vec::new();
    for pair in groups
        .iter()
        .flat_map(|g| g.interaction_type.iter())
        .flat_map(|t| t.interaction_pair.iter())
    {
        let [a, b] = pair.interaction_concept.as_slice() else {
            warn!(
                concepts = pair.interaction_concept.len(),
                "Skipping interaction pair without exactly two concepts"
            );
            continue;
        };
        out.push(InteractionPair {
            concept_a: a.source_concept_item.name.clone(),
            concept_b: b.source_concept_item.name.clone(),
            description: pair.description.clone(),
        });
    }
    out
}

fn string_field(map: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<String> {
    map.get(key).and_then(serde_json::Value::as_str).map(str::to_string)
}

/// `None` for an empty `ndcStatus` object.
pub(crate) fn dosage_status_from_ndc(
    raw: &serde_json::Map<String, serde_json::Value>,
) -> Option<DosageStatus> {
    if raw.is_empty() {
        return None;
    }
    Some(DosageStatus {
        description: string_field(raw, "description"),
        status: string_field(raw, "status"),
        ndc11: string_field(raw, "ndc11"),
    })
}

pub(crate) fn image_urls(resp: PillboxSearchResponse) -> Option<Vec<String>> {
    resp.results
        .map(|results| results.into_iter().map(|r| r.image_url).collect())
}
