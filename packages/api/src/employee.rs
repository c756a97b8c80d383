//! Employee management service: employee records, leave tracker and timesheets

use serde::{Deserialize, Serialize};
use tracing::debug;
use worksphere_client::ApiClient;

use crate::id::{path_segment, RecordId};
use crate::ServiceResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    pub username: String,
    pub role: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub job_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub job_type: String,
    pub job_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// Employee as returned by the service, with its UUID and audit timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub employee_id: String,
    #[serde(flatten)]
    pub employee: Employee,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub leave_type: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_days: Option<f64>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveResponse {
    pub id: i64,
    pub employee_id: String,
    pub status: LeaveStatus,
    #[serde(flatten)]
    pub request: LeaveRequest,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    pub work_date: String,
    pub clock_in: String,
    pub clock_out: String,
    pub total_hours: f64,
}

/// `{ "message": ... }` acknowledgement returned by deletes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct EmployeeService {
    client: ApiClient,
}

impl EmployeeService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ServiceResult<Vec<EmployeeResponse>> {
        self.client.get("employee").await
    }

    pub async fn create(&self, employee: &Employee) -> ServiceResult<EmployeeResponse> {
        debug!("Creating employee {}", employee.username);
        self.client.post("employee", employee).await
    }

    pub async fn get(&self, id: &str) -> ServiceResult<EmployeeResponse> {
        self.client.get(&format!("employee/{}", path_segment(id))).await
    }

    /// Partial updates are expressed as a JSON object of the changed fields.
    pub async fn update(
        &self,
        id: &str,
        changes: &serde_json::Value,
    ) -> ServiceResult<EmployeeResponse> {
        self.client
            .put(&format!("employee/{}", path_segment(id)), changes)
            .await
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<DeleteResponse> {
        self.client
            .delete(&format!("employee/{}", path_segment(id)))
            .await
    }

    pub async fn submit_leave(
        &self,
        employee_id: &str,
        request: &LeaveRequest,
    ) -> ServiceResult<LeaveResponse> {
        self.client
            .post(
                &format!("employees/{}/leave-tracker", path_segment(employee_id)),
                request,
            )
            .await
    }

    pub async fn leave_requests(&self, employee_id: &str) -> ServiceResult<Vec<LeaveResponse>> {
        self.client
            .get(&format!("employees/{}/leave-tracker", path_segment(employee_id)))
            .await
    }

    pub async fn submit_timesheet(
        &self,
        employee_id: &str,
        entry: &TimesheetEntry,
    ) -> ServiceResult<TimesheetEntry> {
        self.client
            .post(
                &format!("employees/{}/timesheets", path_segment(employee_id)),
                entry,
            )
            .await
    }
}
