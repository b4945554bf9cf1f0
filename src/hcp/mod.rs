//! TFE API client module
//!
//! HTTP access to HCP Terraform / Terraform Enterprise: the authenticated
//! client with paginated fetching, token resolution, and the private module
//! registry endpoints.

mod client;
mod credentials;
pub mod registry_modules;
pub mod traits;

use serde::Deserialize;

pub use client::TfeClient;
pub use credentials::TokenResolver;
pub use registry_modules::{
    CreateModuleRequest, ModuleDescriptor, ModulePayload, OrganizationRegistry, VcsCredential,
    VcsKind, VcsSource,
};
pub use traits::{ApiListResponse, PaginatedResponse};

/// Pagination metadata from TFE API (shared across resources)
#[derive(Deserialize, Debug, Default, Clone)]
pub struct PaginationMeta {
    pub pagination: Option<Pagination>,
}

/// Pagination details
#[derive(Deserialize, Debug, Clone)]
pub struct Pagination {
    #[serde(rename = "current-page")]
    pub current_page: u32,
    #[serde(rename = "total-pages")]
    pub total_pages: u32,
    #[serde(rename = "total-count")]
    pub total_count: u32,
}
