//! Tenant management service: provisioning a new organisation

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use worksphere_client::{ApiClient, ApiError};

use crate::ServiceResult;

pub const MSG_TENANT_CREATION_FAILED: &str = "Failed to create tenant";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCreationRequest {
    pub name: String,
    pub admin_username: String,
    pub admin_password: String,
    pub admin_email: String,
    pub company_full_name: String,
    pub industry: String,
    pub company_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCreationResponse {
    pub id: String,
    pub name: String,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct TenantService {
    client: ApiClient,
}

impl TenantService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Provision a tenant. Timeouts, transport failures and server
    /// rejections pass through; anything else (an unreadable response,
    /// an unencodable request) is reported as a 500 "Failed to create tenant".
    pub async fn create(
        &self,
        request: &TenantCreationRequest,
    ) -> ServiceResult<TenantCreationResponse> {
        match self
            .client
            .post::<_, TenantCreationResponse>("api/v1/tenants", request)
            .await
        {
            Ok(created) => {
                info!("Created tenant {} ({})", created.name, created.id);
                Ok(created)
            }
            Err(e) => {
                error!("Error creating tenant {}: {}", request.name, e);
                Err(match e {
                    ApiError::Timeout | ApiError::Transport { .. } | ApiError::Server { .. } => e,
                    ApiError::Parse { .. } | ApiError::Encode(_) => {
                        ApiError::server(500, MSG_TENANT_CREATION_FAILED)
                    }
                })
            }
        }
    }
}
