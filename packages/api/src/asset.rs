//! Asset management service: inventory, allocations, reports and employee requests

use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use worksphere_client::ApiClient;

use crate::id::{path_segment, RecordId};
use crate::ServiceResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub asset_code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub serial_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retirement_date: Option<String>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAllocation {
    pub id: String,
    pub asset_id: String,
    pub employee_id: String,
    pub allocation_date: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub return_date: Option<String>,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub asset_name: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Fulfilled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub employee_id: String,
    pub asset_type: String,
    pub reason: String,
    pub requested_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Body of `POST asset/request`; the employee travels in the query string.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewAssetRequestBody<'a> {
    asset_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    requested_date: &'a str,
    reason: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReportRequest {
    pub status: String,
    pub reporting_date: String,
    pub reporting_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocateAssetRequest {
    pub employee_id: RecordId,
    pub allocation_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnAssetRequest {
    pub return_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: String,
}

#[derive(Debug, Serialize)]
struct RequestStatusUpdate<'a> {
    status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    comments: Option<&'a str>,
}

/// Optional filters for listing assets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilter {
    pub status: Option<String>,
    pub asset_type: Option<String>,
}

impl AssetFilter {
    /// `asset`, `asset?status=..`, `asset?status=..&assetType=..`
    fn endpoint(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            query.append_pair("status", status);
            any = true;
        }
        if let Some(asset_type) = self.asset_type.as_deref().filter(|t| !t.is_empty()) {
            query.append_pair("assetType", asset_type);
            any = true;
        }

        if any {
            format!("asset?{}", query.finish())
        } else {
            "asset".to_string()
        }
    }
}

fn employee_query(employee_id: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("employeeId", employee_id)
        .finish()
}

#[derive(Debug, Clone)]
pub struct AssetService {
    client: ApiClient,
}

impl AssetService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &AssetFilter) -> ServiceResult<Vec<Asset>> {
        self.client.get(&filter.endpoint()).await
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Asset> {
        self.client.get(&format!("asset/{}", path_segment(id))).await
    }

    pub async fn create(&self, asset: &Asset) -> ServiceResult<Asset> {
        self.client.post("asset", asset).await
    }

    pub async fn update(&self, id: &str, changes: &serde_json::Value) -> ServiceResult<Asset> {
        self.client
            .put(&format!("asset/{}", path_segment(id)), changes)
            .await
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.client
            .delete(&format!("asset/{}", path_segment(id)))
            .await
    }

    pub async fn report(&self, id: &str, report: &AssetReportRequest) -> ServiceResult<Asset> {
        self.client
            .patch(&format!("asset/report/{}", path_segment(id)), report)
            .await
    }

    pub async fn allocate(
        &self,
        id: &str,
        allocation: &AllocateAssetRequest,
    ) -> ServiceResult<AssetAllocation> {
        self.client
            .patch(&format!("asset/allocate/{}", path_segment(id)), allocation)
            .await
    }

    pub async fn allocations(&self) -> ServiceResult<Vec<AssetAllocation>> {
        self.client.get("allocations").await
    }

    pub async fn allocations_for_employee(
        &self,
        employee_id: &str,
    ) -> ServiceResult<Vec<AssetAllocation>> {
        self.client
            .get(&format!("allocations/employee/{}", path_segment(employee_id)))
            .await
    }

    pub async fn allocations_for_asset(&self, asset_id: &str) -> ServiceResult<Vec<AssetAllocation>> {
        self.client
            .get(&format!("allocations/asset/{}", path_segment(asset_id)))
            .await
    }

    pub async fn return_asset(
        &self,
        allocation_id: &str,
        return_date: &str,
        notes: Option<&str>,
    ) -> ServiceResult<AssetAllocation> {
        let body = ReturnAssetRequest {
            return_date: return_date.to_string(),
            notes: notes.map(str::to_string),
            status: "returned".to_string(),
        };
        self.client
            .patch(
                &format!("allocations/{}/return", path_segment(allocation_id)),
                &body,
            )
            .await
    }

    /// Assets currently held by one employee.
    pub async fn for_employee(&self, employee_id: &str) -> ServiceResult<Vec<Asset>> {
        self.client
            .get(&format!("asset/employee?{}", employee_query(employee_id)))
            .await
    }

    pub async fn requests(&self) -> ServiceResult<Vec<AssetRequest>> {
        self.client.get("requests").await
    }

    pub async fn requests_for_employee(&self, employee_id: &str) -> ServiceResult<Vec<AssetRequest>> {
        self.client
            .get(&format!("requests/employee/{}", path_segment(employee_id)))
            .await
    }

    pub async fn create_request(&self, request: &AssetRequest) -> ServiceResult<AssetRequest> {
        let body = NewAssetRequestBody {
            asset_type: &request.asset_type,
            comment: request.comments.as_deref(),
            requested_date: &request.requested_date,
            reason: &request.reason,
        };
        self.client
            .post(
                &format!("asset/request?{}", employee_query(&request.employee_id)),
                &body,
            )
            .await
    }

    pub async fn update_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
        comments: Option<&str>,
    ) -> ServiceResult<AssetRequest> {
        self.client
            .patch(
                &format!("requests/{}/status", path_segment(request_id)),
                &RequestStatusUpdate { status, comments },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, "asset")]
    #[case(Some("active"), None, "asset?status=active")]
    #[case(None, Some("laptop"), "asset?assetType=laptop")]
    #[case(Some("in repair"), Some("laptop"), "asset?status=in+repair&assetType=laptop")]
    #[case(Some(""), None, "asset")]
    fn test_filter_endpoint(
        #[case] status: Option<&str>,
        #[case] asset_type: Option<&str>,
        #[case] expected: &str,
    ) {
        let filter = AssetFilter {
            status: status.map(str::to_string),
            asset_type: asset_type.map(str::to_string),
        };
        assert_eq!(filter.endpoint(), expected);
    }

    #[test]
    fn test_asset_type_field_name() {
        let asset: Asset = serde_json::from_value(serde_json::json!({
            "id": 3,
            "assetCode": "LP-003",
            "name": "ThinkPad",
            "type": "laptop",
            "serialNumber": "SN-1",
            "status": "available",
            "isActive": true
        }))
        .unwrap();
        assert_eq!(asset.asset_type, "laptop");
        assert_eq!(asset.id, Some(RecordId::Number(3)));
    }
}
