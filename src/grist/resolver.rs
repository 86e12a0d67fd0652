//! Dossier resolution: locate a case row by email, attach annotation amounts.
//!
//! Column names in the dossiers table are stable demarche exports; the
//! annotations table's reference column is not, so it is discovered
//! heuristically (fixed candidate probe, then a value scan). A failed
//! annotation lookup is not an error: the record degrades to zero amounts.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::config::Config;
use crate::types::CaseRecord;

use super::client::{GristClient, TableRecord};

/// Column carrying the applicant email in the dossiers table.
const EMAIL_COLUMN: &str = "usager_email";

// Ordered source-key fallback chains, one per record attribute.
const NAME_SOURCES: &[&str] = &["A_nom"];
const PROJECT_TITLE_SOURCES: &[&str] = &["A_titre_du_projet"];
const CASE_NUMBER_SOURCES: &[&str] = &["N_dossier", "number"];

/// Candidate names for the annotations → dossier reference column, probed in
/// this order before falling back to a value scan.
const CASE_REF_COLUMNS: &[&str] = &["dossier_id", "projet_id", "id_dossier", "parentId"];

/// Amount columns in the annotations table.
const DRAC_COLUMN: &str = "montant_drac";
const DRAAF_COLUMN: &str = "montant_draaf";

/// Resolution failures surfaced to the user.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("La colonne {0} n'existe pas dans la table des dossiers")]
    SchemaMismatch(&'static str),
    #[error("Aucun dossier trouvé avec cet email.")]
    NotFound,
    #[error(transparent)]
    Grist(#[from] super::GristError),
}

/// Look up the dossier for `email` and assemble a [`CaseRecord`].
///
/// The annotations lookup is best-effort: an unreadable or unmatched
/// annotations table leaves both amounts at `"0"` instead of failing, so a
/// dossier resolves whenever its case row exists.
pub async fn resolve_case(
    client: &GristClient,
    config: &Config,
    email: &str,
) -> Result<CaseRecord, ResolveError> {
    log::info!("Recherche du dossier pour {}", email);

    let cases = client.table_records(&config.projects_table).await?;
    let case = find_case_row(&cases, email)?;
    log::info!("Dossier trouvé avec l'id {}", case.id);

    let annotation = match client.table_records(&config.annotations_table).await {
        Ok(rows) => find_annotation(&rows, case.id).cloned(),
        Err(err) => {
            log::warn!("Lecture des annotations impossible: {}", err);
            None
        }
    };
    if annotation.is_none() {
        log::warn!("Aucune annotation trouvée pour le dossier {}", case.id);
    }

    Ok(build_record(case, email, annotation.as_ref()))
}

/// First row whose email column equals the query exactly, in server order.
/// Duplicate emails are not disambiguated.
fn find_case_row<'a>(
    rows: &'a [TableRecord],
    email: &str,
) -> Result<&'a TableRecord, ResolveError> {
    if !rows.iter().any(|r| r.fields.contains_key(EMAIL_COLUMN)) {
        return Err(ResolveError::SchemaMismatch(EMAIL_COLUMN));
    }

    rows.iter()
        .find(|r| r.fields.get(EMAIL_COLUMN).and_then(Value::as_str) == Some(email))
        .ok_or(ResolveError::NotFound)
}

/// First annotation row referencing `case_id`, if any.
fn find_annotation<'a>(rows: &'a [TableRecord], case_id: i64) -> Option<&'a TableRecord> {
    let column = find_reference_column(rows, case_id)?;
    rows.iter()
        .find(|r| {
            r.fields
                .get(&column)
                .is_some_and(|v| value_matches_id(v, case_id))
        })
}

/// Discover which annotations column references the dossier id.
///
/// Probes the fixed candidate names first; when none exists as a column,
/// scans every column (in stable name order) and takes the first one where
/// any row's value equals the id.
fn find_reference_column(rows: &[TableRecord], case_id: i64) -> Option<String> {
    for candidate in CASE_REF_COLUMNS {
        if rows.iter().any(|r| r.fields.contains_key(*candidate)) {
            log::debug!("Colonne de liaison au dossier: {}", candidate);
            return Some((*candidate).to_string());
        }
    }

    let columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.fields.keys().map(String::as_str))
        .collect();
    for column in columns {
        let matches = rows.iter().any(|r| {
            r.fields
                .get(column)
                .is_some_and(|v| value_matches_id(v, case_id))
        });
        if matches {
            log::debug!("Colonne de liaison devinée par valeur: {}", column);
            return Some(column.to_string());
        }
    }

    None
}

fn value_matches_id(value: &Value, id: i64) -> bool {
    match value.as_i64() {
        Some(n) => n == id,
        None => value.as_f64().is_some_and(|f| f == id as f64),
    }
}

/// Assemble the normalized record. `email` is taken from the caller, never
/// from the row.
fn build_record(case: &TableRecord, email: &str, annotation: Option<&TableRecord>) -> CaseRecord {
    let (drac, draaf) = match annotation {
        Some(row) => (
            amount_str(&row.fields, DRAC_COLUMN),
            amount_str(&row.fields, DRAAF_COLUMN),
        ),
        None => ("0".to_string(), "0".to_string()),
    };

    CaseRecord {
        name: lookup_str(&case.fields, NAME_SOURCES),
        email: email.to_string(),
        project_title: lookup_str(&case.fields, PROJECT_TITLE_SOURCES),
        case_number: lookup_str(&case.fields, CASE_NUMBER_SOURCES),
        drac_amount: drac,
        draaf_amount: draaf,
    }
}

/// Walk an ordered candidate-key chain; the first present, non-null value
/// wins, stringified. Empty string when no candidate is populated.
fn lookup_str(fields: &Map<String, Value>, candidates: &[&str]) -> String {
    for key in candidates {
        match fields.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
        }
    }
    String::new()
}

/// Amount cell → integer-valued string, `"0"` when the column is absent.
fn amount_str(fields: &Map<String, Value>, column: &str) -> String {
    match fields.get(column) {
        None | Some(Value::Null) => "0".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: i64, fields: Value) -> TableRecord {
        let Value::Object(fields) = fields else {
            panic!("row fixture must be an object");
        };
        TableRecord { id, fields }
    }

    #[test]
    fn test_find_case_row_exact_match() {
        let rows = vec![
            row(1, json!({"usager_email": "x@y.com"})),
            row(7, json!({"usager_email": "a@b.com"})),
        ];
        assert_eq!(find_case_row(&rows, "a@b.com").unwrap().id, 7);
    }

    #[test]
    fn test_find_case_row_first_match_wins() {
        let rows = vec![
            row(1, json!({"usager_email": "a@b.com", "N_dossier": "first"})),
            row(2, json!({"usager_email": "a@b.com", "N_dossier": "second"})),
        ];
        assert_eq!(find_case_row(&rows, "a@b.com").unwrap().id, 1);
    }

    #[test]
    fn test_find_case_row_not_found() {
        let rows = vec![row(1, json!({"usager_email": "x@y.com"}))];
        assert!(matches!(
            find_case_row(&rows, "a@b.com"),
            Err(ResolveError::NotFound)
        ));
    }

    #[test]
    fn test_find_case_row_schema_mismatch_without_email_column() {
        let rows = vec![row(1, json!({"mail": "a@b.com"}))];
        assert!(matches!(
            find_case_row(&rows, "a@b.com"),
            Err(ResolveError::SchemaMismatch("usager_email"))
        ));
    }

    #[test]
    fn test_find_case_row_empty_table_is_schema_mismatch() {
        // An empty table exposes no columns at all.
        assert!(matches!(
            find_case_row(&[], "a@b.com"),
            Err(ResolveError::SchemaMismatch("usager_email"))
        ));
    }

    #[test]
    fn test_reference_column_probe_order() {
        // projet_id is present, so it wins even though another column also
        // happens to hold the id.
        let rows = vec![row(3, json!({"projet_id": 7, "autre": 7}))];
        assert_eq!(
            find_reference_column(&rows, 7).as_deref(),
            Some("projet_id")
        );
    }

    #[test]
    fn test_reference_column_probe_prefers_earlier_candidate() {
        let rows = vec![row(3, json!({"id_dossier": 7, "dossier_id": 7}))];
        assert_eq!(
            find_reference_column(&rows, 7).as_deref(),
            Some("dossier_id")
        );
    }

    #[test]
    fn test_reference_column_probe_matches_on_any_row() {
        // The candidate only appears on a later row; it still counts as a
        // column of the table.
        let rows = vec![
            row(1, json!({"montant_drac": 100})),
            row(2, json!({"dossier_id": 9})),
        ];
        assert_eq!(
            find_reference_column(&rows, 9).as_deref(),
            Some("dossier_id")
        );
    }

    #[test]
    fn test_reference_column_value_scan_fallback() {
        let rows = vec![row(3, json!({"ref": 7, "montant_drac": 1000}))];
        assert_eq!(find_reference_column(&rows, 7).as_deref(), Some("ref"));
    }

    #[test]
    fn test_reference_column_value_scan_is_name_ordered() {
        let rows = vec![row(3, json!({"zeta": 7, "alpha": 7}))];
        assert_eq!(find_reference_column(&rows, 7).as_deref(), Some("alpha"));
    }

    #[test]
    fn test_reference_column_none_when_nothing_matches() {
        let rows = vec![row(3, json!({"montant_drac": 1000}))];
        assert!(find_reference_column(&rows, 7).is_none());
    }

    #[test]
    fn test_find_annotation_skips_non_matching_rows() {
        let rows = vec![
            row(1, json!({"dossier_id": 5, "montant_drac": 1})),
            row(2, json!({"dossier_id": 7, "montant_drac": 1000})),
        ];
        assert_eq!(find_annotation(&rows, 7).unwrap().id, 2);
    }

    #[test]
    fn test_find_annotation_matches_float_reference() {
        let rows = vec![row(1, json!({"dossier_id": 7.0}))];
        assert!(find_annotation(&rows, 7).is_some());
    }

    #[test]
    fn test_find_annotation_rejects_string_reference() {
        let rows = vec![row(1, json!({"dossier_id": "7"}))];
        assert!(find_annotation(&rows, 7).is_none());
    }

    #[test]
    fn test_build_record_full_example() {
        let case = row(
            7,
            json!({
                "usager_email": "a@b.com",
                "A_titre_du_projet": "Proj X",
                "N_dossier": "D1"
            }),
        );
        let annotation = row(
            3,
            json!({"dossier_id": 7, "montant_drac": 1000, "montant_draaf": 500}),
        );

        let record = build_record(&case, "a@b.com", Some(&annotation));
        assert_eq!(
            record,
            CaseRecord {
                name: String::new(),
                email: "a@b.com".to_string(),
                project_title: "Proj X".to_string(),
                case_number: "D1".to_string(),
                drac_amount: "1000".to_string(),
                draaf_amount: "500".to_string(),
            }
        );
        assert!(crate::checklist::missing_required_fields(&record).is_empty());
    }

    #[test]
    fn test_build_record_without_annotation_defaults_amounts() {
        let case = row(7, json!({"usager_email": "a@b.com"}));
        let record = build_record(&case, "a@b.com", None);
        assert_eq!(record.drac_amount, "0");
        assert_eq!(record.draaf_amount, "0");
    }

    #[test]
    fn test_build_record_annotation_row_missing_amount_column() {
        let case = row(7, json!({"usager_email": "a@b.com"}));
        let annotation = row(3, json!({"dossier_id": 7, "montant_drac": 250}));
        let record = build_record(&case, "a@b.com", Some(&annotation));
        assert_eq!(record.drac_amount, "250");
        assert_eq!(record.draaf_amount, "0");
    }

    #[test]
    fn test_build_record_coerces_string_amounts() {
        let case = row(7, json!({"usager_email": "a@b.com"}));
        let annotation = row(
            3,
            json!({"dossier_id": 7, "montant_drac": "1200", "montant_draaf": null}),
        );
        let record = build_record(&case, "a@b.com", Some(&annotation));
        assert_eq!(record.drac_amount, "1200");
        assert_eq!(record.draaf_amount, "0");
    }

    #[test]
    fn test_build_record_case_number_prefers_n_dossier() {
        let case = row(7, json!({"usager_email": "a@b.com", "N_dossier": "D1", "number": "42"}));
        let record = build_record(&case, "a@b.com", None);
        assert_eq!(record.case_number, "D1");
    }

    #[test]
    fn test_build_record_case_number_falls_back_to_number() {
        let case = row(7, json!({"usager_email": "a@b.com", "number": 42}));
        let record = build_record(&case, "a@b.com", None);
        assert_eq!(record.case_number, "42");
    }

    #[test]
    fn test_build_record_null_fields_fall_through() {
        let case = row(
            7,
            json!({"usager_email": "a@b.com", "A_nom": null, "N_dossier": null, "number": "42"}),
        );
        let record = build_record(&case, "a@b.com", None);
        assert_eq!(record.name, "");
        assert_eq!(record.case_number, "42");
    }

    #[test]
    fn test_build_record_email_comes_from_caller() {
        // The queried value is authoritative, whatever the row holds.
        let case = row(7, json!({"usager_email": "A@B.COM", "A_nom": "Dupont"}));
        let record = build_record(&case, "a@b.com", None);
        assert_eq!(record.email, "a@b.com");
        assert_eq!(record.name, "Dupont");
    }
}
