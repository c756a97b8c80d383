// ABOUTME: Wire types exchanged with the identity service
// ABOUTME: Tenant validation and authorization-code exchange requests and responses

use serde::{Deserialize, Serialize};

pub const VALIDATE_TENANT_ENDPOINT: &str = "iamcontroller/validate-tenant";
pub const VALIDATE_AUTHCODE_ENDPOINT: &str = "iamcontroller/validate-authcode";

/// `code` value the identity service uses for a successful lookup.
pub const TENANT_OK_CODE: i64 = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateTenantRequest {
    pub tenant_name: String,
    pub redirect_origin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateTenantResponse {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<TenantData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenantData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub realm: Option<String>,
    #[serde(rename = "redirectURI", default)]
    pub redirect_uri: Option<String>,
}

/// Outcome of a successful tenant lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantValidationResult {
    pub tenant_id: Option<String>,
    pub realm: Option<String>,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAuthCodeRequest {
    pub tenant_name: String,
    pub auth_code: String,
}

/// Token pair from the code exchange. Extra fields are ignored.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizationExchangeResult {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

// Tokens stay out of logs
impl std::fmt::Debug for AuthorizationExchangeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationExchangeResult")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_requests_are_camel_case() {
        let body = serde_json::to_value(ValidateTenantRequest {
            tenant_name: "acme".to_string(),
            redirect_origin: "http://localhost:8080".to_string(),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({ "tenantName": "acme", "redirectOrigin": "http://localhost:8080" })
        );

        let body = serde_json::to_value(ValidateAuthCodeRequest {
            tenant_name: "acme".to_string(),
            auth_code: "XYZ".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({ "tenantName": "acme", "authCode": "XYZ" }));
    }

    #[test]
    fn test_tenant_response_redirect_uri_field() {
        let response: ValidateTenantResponse = serde_json::from_value(json!({
            "code": 200,
            "message": "ok",
            "data": { "id": "t-1", "realm": "acme", "redirectURI": "https://idp/auth" }
        }))
        .unwrap();

        let data = response.data.unwrap();
        assert_eq!(data.redirect_uri.as_deref(), Some("https://idp/auth"));
        assert_eq!(data.realm.as_deref(), Some("acme"));
    }

    #[test]
    fn test_exchange_result_debug_is_redacted() {
        let result: AuthorizationExchangeResult = serde_json::from_value(json!({
            "access_token": "secret-at",
            "refresh_token": "secret-rt",
            "expires_in": 300
        }))
        .unwrap();

        let printed = format!("{:?}", result);
        assert!(!printed.contains("secret"));
        assert_eq!(result.access_token, "secret-at");
    }
}
