use serde::Serialize;

use crate::error::DrugInfoError;

pub fn to_pretty<T: Serialize>(value: &T) -> Result<String, DrugInfoError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::to_pretty;
    use crate::entities::lookup::DrugReport;

    #[test]
    fn to_pretty_serializes_report_with_indentation() {
        let report = DrugReport {
            drug_name: "Ibuprofen".to_string(),
            rxcui: "5640".to_string(),
            response: "**Alternatives:**\nAlternative medicines include **Advil, Motrin**."
                .to_string(),
        };

        let json = to_pretty(&report).expect("report json");
        assert!(json.contains('\n'));
        assert!(json.contains("\"drug_name\": \"Ibuprofen\""));
        assert!(json.contains("\"rxcui\": \"5640\""));
        assert!(json.contains("\\n"));
    }
}
