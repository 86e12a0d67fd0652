//! Runtime configuration.
//!
//! The deployment drives everything through environment variables. They are
//! read once at startup into an immutable [`Config`] that gets passed to each
//! component; nothing reads the environment afterwards.

use url::Url;

/// Default Grist API endpoint (instance operated by numerique.gouv.fr).
pub const DEFAULT_GRIST_BASE_URL: &str = "https://grist.numerique.gouv.fr/api";
/// Default id of the dossiers table.
pub const DEFAULT_PROJECTS_TABLE: &str = "Demarche_87698_dossiers";
/// Default id of the annotations table.
pub const DEFAULT_ANNOTATIONS_TABLE: &str = "Demarche_87698_annotations";
/// Default Démarches Simplifiées public API endpoint.
pub const DEFAULT_DS_BASE_URL: &str = "https://www.demarches-simplifiees.fr/api/public/v1";
/// Default démarche targeted by the prefill call.
pub const DEFAULT_DEMARCHE_ID: &str = "111570";

/// Immutable runtime configuration shared by every component.
#[derive(Debug, Clone)]
pub struct Config {
    pub grist_base_url: String,
    pub grist_api_key: Option<String>,
    pub grist_doc_id: Option<String>,
    pub projects_table: String,
    pub annotations_table: String,
    pub ds_base_url: String,
    pub ds_api_token: Option<String>,
    pub demarche_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grist_base_url: DEFAULT_GRIST_BASE_URL.to_string(),
            grist_api_key: None,
            grist_doc_id: None,
            projects_table: DEFAULT_PROJECTS_TABLE.to_string(),
            annotations_table: DEFAULT_ANNOTATIONS_TABLE.to_string(),
            ds_base_url: DEFAULT_DS_BASE_URL.to_string(),
            ds_api_token: None,
            demarche_id: DEFAULT_DEMARCHE_ID.to_string(),
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Unset or blank variables fall back to the defaults above. Credentials
    /// stay `None` so the components that need them can fail with an explicit
    /// message instead of sending an empty token.
    pub fn from_env() -> Self {
        let config = Self {
            grist_base_url: env_or("GRIST_BASE_URL", DEFAULT_GRIST_BASE_URL),
            grist_api_key: env_opt("GRIST_API_KEY"),
            grist_doc_id: env_opt("GRIST_DOC_ID"),
            projects_table: env_or("GRIST_PROJETS_TABLE", DEFAULT_PROJECTS_TABLE),
            annotations_table: env_or("GRIST_ANNOTATIONS_TABLE", DEFAULT_ANNOTATIONS_TABLE),
            ds_base_url: env_or("DS_BASE_URL", DEFAULT_DS_BASE_URL),
            ds_api_token: env_opt("API_TOKEN_BILAN_DRAC_DRAAF"),
            demarche_id: env_or("DEMARCHE_ID", DEFAULT_DEMARCHE_ID),
        };

        for (name, value) in [
            ("GRIST_BASE_URL", &config.grist_base_url),
            ("DS_BASE_URL", &config.ds_base_url),
        ] {
            if Url::parse(value).is_err() {
                log::warn!("{} n'est pas une URL valide: {}", name, value);
            }
        }

        config
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}
