//! Credential resolution against the registry's authorization API

use crate::error::{Result, RunnerError};
use crate::output::OutputManager;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const AUTH_TARGET: &str = "AmazonEC2ContainerRegistry_V20150921.GetAuthorizationToken";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizationData {
    authorization_token: String,
    proxy_endpoint: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizationTokenResponse {
    #[serde(default)]
    authorization_data: Vec<AuthorizationData>,
}

/// Short-lived docker login credential, discarded after the login step.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub endpoint: String,
}

#[derive(Debug)]
pub struct AuthClient {
    client: Client,
    api_url: String,
}

impl AuthClient {
    pub fn new(api_url: &str, skip_tls: bool) -> Result<Self> {
        let client = if skip_tls {
            Client::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
        } else {
            Client::builder().build()
        }
        .map_err(RunnerError::Network)?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }

    /// Request an authorization token and decode it into a login credential.
    ///
    /// One remote call, no retry. Fails when the call fails, when the response
    /// carries no authorization entries, or when the decoded token is not a
    /// `user:password` pair.
    pub async fn resolve_credentials(&self, output: &OutputManager) -> Result<Credential> {
        output.verbose(&format!(
            "Requesting authorization token from {}",
            self.api_url
        ));

        let response = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/x-amz-json-1.1")
            .header("X-Amz-Target", AUTH_TARGET)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| {
                RunnerError::Authentication(format!("Authorization request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(RunnerError::Authentication(format!(
                "Authorization request failed with status {}: {}",
                status, error_text
            )));
        }

        let token_response: AuthorizationTokenResponse = response.json().await.map_err(|e| {
            RunnerError::Parse(format!("Failed to parse authorization response: {}", e))
        })?;

        let credential = parse_authorization(&token_response)?;
        output.detail(&format!(
            "Credential resolved for user '{}' at {}",
            credential.username, credential.endpoint
        ));
        Ok(credential)
    }
}

fn parse_authorization(response: &AuthorizationTokenResponse) -> Result<Credential> {
    let entry = response.authorization_data.first().ok_or_else(|| {
        RunnerError::Authentication(
            "Authorization response contained no authorization data".to_string(),
        )
    })?;

    let (username, password) = decode_token(&entry.authorization_token)?;

    Ok(Credential {
        username,
        password,
        endpoint: entry.proxy_endpoint.clone(),
    })
}

/// Decode a base64 `user:password` token, splitting on the first colon.
fn decode_token(token: &str) -> Result<(String, String)> {
    let decoded = STANDARD
        .decode(token)
        .map_err(|e| RunnerError::Parse(format!("Invalid base64 token: {}", e)))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|e| RunnerError::Parse(format!("Token is not valid UTF-8: {}", e)))?;

    let (username, password) = decoded.split_once(':').ok_or_else(|| {
        RunnerError::Parse("Decoded token is missing the ':' separator".to_string())
    })?;

    Ok((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_tokens(entries: &[(&str, &str)]) -> AuthorizationTokenResponse {
        AuthorizationTokenResponse {
            authorization_data: entries
                .iter()
                .map(|(token, endpoint)| AuthorizationData {
                    authorization_token: STANDARD.encode(token),
                    proxy_endpoint: endpoint.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn decodes_well_formed_token() {
        let response = response_with_tokens(&[(
            "AWS:abc123",
            "https://975049994612.dkr.ecr.ap-south-1.amazonaws.com",
        )]);
        let credential = parse_authorization(&response).unwrap();
        assert_eq!(credential.username, "AWS");
        assert_eq!(credential.password, "abc123");
        assert_eq!(
            credential.endpoint,
            "https://975049994612.dkr.ecr.ap-south-1.amazonaws.com"
        );
    }

    #[test]
    fn splits_on_first_colon_only() {
        let response =
            response_with_tokens(&[("AWS:pass:with:colons", "https://registry.example.com")]);
        let credential = parse_authorization(&response).unwrap();
        assert_eq!(credential.username, "AWS");
        assert_eq!(credential.password, "pass:with:colons");
    }

    #[test]
    fn first_entry_wins_when_several_are_returned() {
        let response = response_with_tokens(&[
            ("AWS:first", "https://first.example.com"),
            ("AWS:second", "https://second.example.com"),
        ]);
        let credential = parse_authorization(&response).unwrap();
        assert_eq!(credential.password, "first");
        assert_eq!(credential.endpoint, "https://first.example.com");
    }

    #[test]
    fn empty_authorization_data_is_an_error() {
        let response = response_with_tokens(&[]);
        let err = parse_authorization(&response).unwrap_err();
        assert!(matches!(err, RunnerError::Authentication(_)));
    }

    #[test]
    fn token_without_colon_is_a_parse_error() {
        let response = response_with_tokens(&[("malformed", "https://registry.example.com")]);
        let err = parse_authorization(&response).unwrap_err();
        assert!(matches!(err, RunnerError::Parse(_)));
    }

    #[test]
    fn invalid_base64_is_a_parse_error() {
        let response = AuthorizationTokenResponse {
            authorization_data: vec![AuthorizationData {
                authorization_token: "not-base64!!".to_string(),
                proxy_endpoint: "https://registry.example.com".to_string(),
            }],
        };
        let err = parse_authorization(&response).unwrap_err();
        assert!(matches!(err, RunnerError::Parse(_)));
    }

    #[test]
    fn missing_authorization_data_field_deserializes_to_empty() {
        let response: AuthorizationTokenResponse = serde_json::from_str("{}").unwrap();
        assert!(parse_authorization(&response).is_err());
    }

    #[test]
    fn wire_field_names_are_camel_case() {
        let raw = r#"{
            "authorizationData": [{
                "authorizationToken": "QVdTOmFiYzEyMw==",
                "proxyEndpoint": "https://975049994612.dkr.ecr.ap-south-1.amazonaws.com"
            }]
        }"#;
        let response: AuthorizationTokenResponse = serde_json::from_str(raw).unwrap();
        let credential = parse_authorization(&response).unwrap();
        assert_eq!(credential.username, "AWS");
        assert_eq!(credential.password, "abc123");
    }
}
