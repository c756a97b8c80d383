// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across WorkSphere

// Backend Service URLs
pub const WORKSPHERE_IAM_URL: &str = "WORKSPHERE_IAM_URL";
pub const WORKSPHERE_EMPLOYEE_URL: &str = "WORKSPHERE_EMPLOYEE_URL";
pub const WORKSPHERE_ASSET_URL: &str = "WORKSPHERE_ASSET_URL";
pub const WORKSPHERE_TENANT_URL: &str = "WORKSPHERE_TENANT_URL";

// Legacy front-end names, still honoured for the two HRMS services
pub const VITE_EMPLOYEE_MANAGEMENT_URL: &str = "VITE_EMPLOYEE_MANAGEMENT_URL";
pub const VITE_ASSET_MANAGEMENT_URL: &str = "VITE_ASSET_MANAGEMENT_URL";

// HTTP Client Configuration
pub const WORKSPHERE_REQUEST_TIMEOUT_MS: &str = "WORKSPHERE_REQUEST_TIMEOUT_MS";
pub const WORKSPHERE_ATTACH_BEARER: &str = "WORKSPHERE_ATTACH_BEARER";

// Login Callback Configuration
pub const WORKSPHERE_CALLBACK_PORT: &str = "WORKSPHERE_CALLBACK_PORT";
pub const WORKSPHERE_CALLBACK_TIMEOUT_SECS: &str = "WORKSPHERE_CALLBACK_TIMEOUT_SECS";

// Session Persistence
pub const WORKSPHERE_SESSION_FILE: &str = "WORKSPHERE_SESSION_FILE";

// Default values
pub const DEFAULT_IAM_URL: &str = "https://iam-service-production.up.railway.app";
pub const DEFAULT_EMPLOYEE_URL: &str = "https://employee-management-hrms.up.railway.app";
pub const DEFAULT_ASSET_URL: &str = "https://asset-management-hrms.up.railway.app";
pub const DEFAULT_TENANT_URL: &str = "https://tenant-management-production.up.railway.app";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CALLBACK_PORT: u16 = 8080;
pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 300;
