use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// RxNorm term types that the report groups related concepts under.
///
/// Declaration order is the order the report lists them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConceptTag {
    #[serde(rename = "BN")]
    BrandName,
    #[serde(rename = "IN")]
    Ingredient,
    #[serde(rename = "PIN")]
    PreciseIngredient,
    #[serde(rename = "DF")]
    DoseForm,
    #[serde(rename = "DFG")]
    DoseFormGroup,
}

impl ConceptTag {
    pub const ALL: [ConceptTag; 5] = [
        ConceptTag::BrandName,
        ConceptTag::Ingredient,
        ConceptTag::PreciseIngredient,
        ConceptTag::DoseForm,
        ConceptTag::DoseFormGroup,
    ];

    pub fn tty(self) -> &'static str {
        match self {
            ConceptTag::BrandName => "BN",
            ConceptTag::Ingredient => "IN",
            ConceptTag::PreciseIngredient => "PIN",
            ConceptTag::DoseForm => "DF",
            ConceptTag::DoseFormGroup => "DFG",
        }
    }

    /// Exact, case-sensitive match on the RxNorm term type.
    pub fn from_tty(tty: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.tty() == tty)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugProperties {
    pub name: Option<String>,
    pub indication: Option<String>,
    pub synonym: Option<String>,
}

/// Related concept names bucketed by tag, in encounter order within a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedConcepts {
    groups: BTreeMap<ConceptTag, Vec<String>>,
}

impl RelatedConcepts {
    pub fn push(&mut self, tag: ConceptTag, name: impl Into<String>) {
        self.groups.entry(tag).or_default().push(name.into());
    }

    pub fn names(&self, tag: ConceptTag) -> &[String] {
        self.groups.get(&tag).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }
}

impl FromIterator<(ConceptTag, String)> for RelatedConcepts {
    fn from_iter<I: IntoIterator<Item = (ConceptTag, String)>>(iter: I) -> Self {
        let mut out = Self::default();
        for (tag, name) in iter {
            out.push(tag, name);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionPair {
    pub concept_a: String,
    pub concept_b: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DosageStatus {
    pub description: Option<String>,
    pub status: Option<String>,
    pub ndc11: Option<String>,
}

/// Everything gathered for one drug name within one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugProfile {
    pub properties: Option<DrugProperties>,
    pub related: Option<RelatedConcepts>,
    pub alternatives: Vec<String>,
    pub interactions: Option<Vec<InteractionPair>>,
    pub side_effects: Option<Vec<String>>,
    pub dosage: Option<DosageStatus>,
    pub images: Option<Vec<String>>,
}

fn non_empty<T>(value: &Option<Vec<T>>) -> bool {
    value.as_ref().is_some_and(|v| !v.is_empty())
}

impl DrugProfile {
    pub fn has_any_data(&self) -> bool {
        self.properties.is_some()
            || self.related.as_ref().is_some_and(|r| !r.is_empty())
            || !self.alternatives.is_empty()
            || non_empty(&self.interactions)
            || non_empty(&self.side_effects)
            || self.dosage.is_some()
            || non_empty(&self.images)
    }
}
