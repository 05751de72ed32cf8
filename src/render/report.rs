//! Plain-language report for a gathered [`DrugProfile`].

use crate::entities::drug::{ConceptTag, DrugProfile};

fn related_sentence(tag: ConceptTag, list: &str) -> String {
    match tag {
        ConceptTag::BrandName => {
            format!("This drug is also sold under the brand name(s): **{list}**.")
        }
        ConceptTag::Ingredient => format!("The active ingredient in this drug is **{list}**."),
        ConceptTag::PreciseIngredient => {
            format!("The precise form of the active ingredient is **{list}**.")
        }
        ConceptTag::DoseForm => format!("This drug is available as **{list}**."),
        ConceptTag::DoseFormGroup => format!("It comes in forms like **{list}**."),
    }
}

fn present<T>(value: &Option<Vec<T>>) -> Option<&[T]> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Renders the report as newline-joined lines with no trailing newline.
///
/// Sections appear in a fixed order and are omitted entirely when their
/// data is absent or empty. The output is a pure function of `profile`.
pub fn layman_report(profile: &DrugProfile) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(props) = &profile.properties {
        let name = props.name.as_deref().unwrap_or("Unknown");
        let indication = props.indication.as_deref().unwrap_or("various conditions");
        lines.push(format!(
            "The drug **{name}** is used for **{indication}**."
        ));
        if let Some(synonym) = props.synonym.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("It is also known as **{synonym}**."));
        }
    }

    if let Some(related) = &profile.related {
        for tag in ConceptTag::ALL {
            let names = related.names(tag);
            if !names.is_empty() {
                lines.push(related_sentence(tag, &names.join(", ")));
            }
        }
    }

    if !profile.alternatives.is_empty() {
        lines.push("**Alternatives:**".to_string());
        lines.push(format!(
            "Alternative medicines include **{}**.",
            profile.alternatives.join(", ")
        ));
    }

    if let Some(pairs) = present(&profile.interactions) {
        lines.push("**Interactions:**".to_string());
        for pair in pairs {
            lines.push(format!(
                "- **{}** interacts with **{}**: {}",
                pair.concept_a, pair.concept_b, pair.description
            ));
        }
    }

    if let Some(terms) = present(&profile.side_effects) {
        lines.push("**Side Effects:**".to_string());
        lines.push(format!(
            "Common side effects include **{}**.",
            terms.join(", ")
        ));
    }

    if let Some(dosage) = &profile.dosage {
        let description = dosage.description.as_deref().unwrap_or("Not available");
        lines.push("**Dosage Information:**".to_string());
        lines.push(format!("Dosage details: **{description}**."));
    }

    if let Some(urls) = present(&profile.images) {
        lines.push("**Drug Images:**".to_string());
        for url in urls {
            lines.push(format!("![Drug Image]({url})"));
        }
    }

    lines.join("\n")
}
