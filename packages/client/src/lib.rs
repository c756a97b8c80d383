//! WorkSphere API client
//!
//! A thin typed wrapper around `reqwest` used by every feature service
//! (employee, asset, tenant, identity). Each call either yields a parsed
//! payload or an [`ApiError`] that tells timeouts, transport failures and
//! server rejections apart.

pub mod client;
pub mod error;

pub use client::{default_headers, ApiClient, ApiRequest, TokenProvider, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult, TIMEOUT_STATUS, TRANSPORT_STATUS};

// Re-exported so callers can build requests without a direct reqwest dependency
pub use reqwest::header;
pub use reqwest::Method;
