//! Canonical attribute → champ id translation for the prefill API.

use std::collections::BTreeMap;

use crate::types::CaseRecord;

/// Fixed translation table: canonical field name → Démarches Simplifiées
/// champ identifier (opaque tokens issued by the démarche). Never mutated at
/// runtime.
pub const FIELD_MAPPING: &[(&str, &str)] = &[
    ("Titre_du_projet", "Q2hhbXAtNjIyMzQw"),
    ("Numero_dossier", "Q2hhbXAtNjA3OTQ3"),
    ("Montant_DRAC", "Q2hhbXAtNDA3NDExMQ"),
    ("Montant_DRAAF", "Q2hhbXAtNDA3NDExMg"),
    ("Nom", "Q2hhbXAtNjA3OTcy"),
    ("Email", "Q2hhbXAtNjA3OTc1"),
];

/// The six canonical fields of a record, paired with their values.
fn canonical_fields(record: &CaseRecord) -> [(&'static str, &str); 6] {
    [
        ("Titre_du_projet", record.project_title.as_str()),
        ("Numero_dossier", record.case_number.as_str()),
        ("Montant_DRAC", record.drac_amount.as_str()),
        ("Montant_DRAAF", record.draaf_amount.as_str()),
        ("Nom", record.name.as_str()),
        ("Email", record.email.as_str()),
    ]
}

/// Translate a record into the prefill request body: one `champ_<id>` entry
/// per mapped field. Fields without a mapping entry are dropped silently.
pub fn map_to_external(record: &CaseRecord) -> BTreeMap<String, String> {
    let mut mapped = BTreeMap::new();
    for (name, value) in canonical_fields(record) {
        if let Some((_, champ)) = FIELD_MAPPING.iter().find(|(field, _)| *field == name) {
            mapped.insert(format!("champ_{}", champ), value.to_string());
        }
    }
    mapped
}
