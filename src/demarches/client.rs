//! HTTP client for the Démarches Simplifiées prefill endpoint.
//!
//! One POST per generated link, bearer auth, no retries. 201 is the only
//! success status; anything else carries the raw response body back to the
//! caller as user-facing text.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::Config;
use crate::types::CaseRecord;

use super::mapping::map_to_external;

/// Prefill failures. Display strings double as user-facing text.
#[derive(Debug, thiserror::Error)]
pub enum PrefillError {
    #[error("Token API non trouvé. Vérifiez votre configuration.")]
    MissingCredential,
    #[error("Erreur API DS: {body}")]
    Api { status: u16, body: String },
    #[error("Exception: {0}")]
    Transport(String),
}

/// Client for the dossier-creation endpoint of a démarche.
pub struct PrefillClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl PrefillClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.ds_base_url.trim_end_matches('/').to_string(),
            api_token: config.ds_api_token.clone(),
        }
    }

    /// POST the mapped fields and return the pre-filled dossier URL.
    ///
    /// A 201 without a `dossier_url` still counts as success; the link is
    /// just empty. No credential configured fails before any network I/O.
    pub async fn generate(
        &self,
        mapped: &BTreeMap<String, String>,
        demarche_id: &str,
    ) -> Result<String, PrefillError> {
        let token = self
            .api_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(PrefillError::MissingCredential)?;

        let url = format!("{}/demarches/{}/dossiers", self.base_url, demarche_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(mapped)
            .send()
            .await
            .map_err(|e| PrefillError::Transport(e.to_string()))?;

        let status = resp.status();
        if status != reqwest::StatusCode::CREATED {
            let body = resp.text().await.unwrap_or_default();
            return Err(PrefillError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| PrefillError::Transport(e.to_string()))?;
        Ok(dossier_url_from(&body))
    }

    /// Self-test against the API with a fixed dummy record.
    pub async fn check_connection(&self, demarche_id: &str) -> Result<String, PrefillError> {
        let sample = CaseRecord {
            name: "Test Utilisateur".to_string(),
            email: "test@example.com".to_string(),
            project_title: "Projet Test API".to_string(),
            case_number: "TEST123".to_string(),
            drac_amount: "1000".to_string(),
            draaf_amount: "500".to_string(),
        };
        self.generate(&map_to_external(&sample), demarche_id).await
    }
}

/// Read `dossier_url` from a creation response body, empty when absent.
fn dossier_url_from(body: &Value) -> String {
    body.get("dossier_url")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_without_token() -> PrefillClient {
        let config = Config {
            ds_api_token: None,
            ..Config::default()
        };
        PrefillClient::new(&config)
    }

    #[test]
    fn test_dossier_url_from_body() {
        assert_eq!(
            dossier_url_from(&json!({"dossier_url": "https://x/y"})),
            "https://x/y"
        );
    }

    #[test]
    fn test_dossier_url_missing_yields_empty_string() {
        assert_eq!(dossier_url_from(&json!({"dossier_number": 12})), "");
        assert_eq!(dossier_url_from(&json!({"dossier_url": 42})), "");
    }

    #[tokio::test]
    async fn test_generate_without_token_fails_before_any_call() {
        let client = client_without_token();
        let err = client
            .generate(&BTreeMap::new(), "111570")
            .await
            .unwrap_err();
        assert!(matches!(err, PrefillError::MissingCredential));
    }

    #[tokio::test]
    async fn test_blank_token_counts_as_missing() {
        let config = Config {
            ds_api_token: Some("   ".to_string()),
            ..Config::default()
        };
        let client = PrefillClient::new(&config);
        let err = client
            .generate(&BTreeMap::new(), "111570")
            .await
            .unwrap_err();
        assert!(matches!(err, PrefillError::MissingCredential));
    }

    #[test]
    fn test_api_error_display_carries_raw_body() {
        let err = PrefillError::Api {
            status: 422,
            body: r#"{"errors":["champ invalide"]}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"Erreur API DS: {"errors":["champ invalide"]}"#
        );
    }
}
