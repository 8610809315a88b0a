//! `tidiApi` credential type.

use serde::Deserialize;

use super::description::{CredentialDescription, NodeProperty};
use super::params::ApiKey;

pub const CREDENTIAL_NAME: &str = "tidiApi";

/// Decrypted `tidiApi` credential set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidiApiCredentials {
    pub api_key: ApiKey,
}

impl TidiApiCredentials {
    pub fn description() -> CredentialDescription {
        CredentialDescription {
            name: CREDENTIAL_NAME,
            display_name: "Tidi API",
            documentation_url: "https://api.tidi.com.br/docs",
            properties: vec![NodeProperty::string("API Key", "apiKey")
                .password()
                .required()
                .describe("Chave da API fornecida pela plataforma Tidi")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn description_declares_a_password_api_key() {
        let v = serde_json::to_value(TidiApiCredentials::description()).unwrap();
        assert_eq!(v["name"], "tidiApi");
        assert_eq!(v["documentationUrl"], "https://api.tidi.com.br/docs");
        let prop = &v["properties"][0];
        assert_eq!(prop["name"], "apiKey");
        assert_eq!(prop["type"], "string");
        assert_eq!(prop["required"], true);
        assert_eq!(prop["typeOptions"]["password"], true);
        assert_eq!(prop["default"], "");
    }

    #[test]
    fn credentials_deserialize_from_camel_case() {
        let creds: TidiApiCredentials =
            serde_json::from_value(json!({ "apiKey": "abc" })).unwrap();
        assert_eq!(creds.api_key.expose(), "abc");
        assert!(!format!("{creds:?}").contains("abc"));
    }
}
