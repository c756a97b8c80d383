//! Typed service clients for the WorkSphere backends.
//!
//! Each service is a thin wrapper over [`worksphere_client::ApiClient`]
//! bound to that backend's base URL. Errors are the client's
//! [`ApiError`](worksphere_client::ApiError) unchanged.

pub mod asset;
pub mod employee;
pub mod tenant;
pub mod timesheet;

mod id;

pub use asset::{
    AllocateAssetRequest, Asset, AssetAllocation, AssetFilter, AssetReportRequest, AssetRequest,
    AssetService, RequestStatus, ReturnAssetRequest,
};
pub use employee::{
    DeleteResponse, Employee, EmployeeResponse, EmployeeService, LeaveRequest, LeaveResponse,
    LeaveStatus, TimesheetEntry,
};
pub use id::RecordId;
pub use tenant::{TenantCreationRequest, TenantCreationResponse, TenantService};
pub use timesheet::{calculate_total_hours, format_duration, TimesheetError};

/// Errors surfaced by the service clients.
pub type ServiceError = worksphere_client::ApiError;
pub type ServiceResult<T> = Result<T, ServiceError>;
