//! Application-level record types.

use serde::{Deserialize, Serialize};

/// Normalized dossier record assembled by the resolver.
///
/// `email` always carries the value the caller searched for, never whatever
/// the remote row holds. Amounts are integer-valued strings, `"0"` when no
/// annotation was found. Serialized keys match the canonical field names the
/// prefill mapping is built around.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(rename = "Nom", default)]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Titre_du_projet", default)]
    pub project_title: String,
    #[serde(rename = "Numero_dossier", default)]
    pub case_number: String,
    #[serde(rename = "Montant_DRAC", default)]
    pub drac_amount: String,
    #[serde(rename = "Montant_DRAAF", default)]
    pub draaf_amount: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_record_serializes_canonical_keys() {
        let record = CaseRecord {
            name: "Dupont".to_string(),
            email: "a@b.com".to_string(),
            project_title: "Proj X".to_string(),
            case_number: "D1".to_string(),
            drac_amount: "1000".to_string(),
            draaf_amount: "500".to_string(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Nom"], "Dupont");
        assert_eq!(json["Email"], "a@b.com");
        assert_eq!(json["Titre_du_projet"], "Proj X");
        assert_eq!(json["Numero_dossier"], "D1");
        assert_eq!(json["Montant_DRAC"], "1000");
        assert_eq!(json["Montant_DRAAF"], "500");
    }
}
