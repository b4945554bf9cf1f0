//! Private registry module API operations

use async_trait::async_trait;
use log::debug;

use crate::config::api;
use crate::error::{Result, TfeError};
use crate::hcp::traits::ApiListResponse;
use crate::hcp::TfeClient;
use crate::migration::RegistryClient;

use super::models::CreateModuleRequest;

impl TfeClient {
    /// Get all registry modules of an organization as raw records (with pagination)
    pub async fn get_registry_modules(&self, org: &str) -> Result<Vec<serde_json::Value>> {
        let path = format!("/{}/{}/{}", api::ORGANIZATIONS, org, api::REGISTRY_MODULES);
        let error_context = format!("registry modules for organization '{}'", org);

        self.fetch_all_pages::<serde_json::Value, ApiListResponse<serde_json::Value>>(
            &path,
            &error_context,
        )
        .await
    }

    /// Delete a private registry module with all its providers and versions
    pub async fn delete_registry_module(&self, org: &str, name: &str) -> Result<()> {
        let url = format!(
            "{}/{}/{}/{}/private/{}/{}",
            self.base_url(),
            api::ORGANIZATIONS,
            org,
            api::REGISTRY_MODULES,
            urlencoding::encode(org),
            urlencoding::encode(name)
        );

        debug!("Deleting registry module '{}' in '{}'", name, org);

        let response = self.delete(&url).send().await?;

        match response.status().as_u16() {
            200 | 204 => {
                debug!("Successfully deleted registry module '{}'", name);
                Ok(())
            }
            404 => Err(TfeError::Api {
                status: 404,
                message: format!("Registry module '{}' not found in '{}'", name, org),
            }),
            status => Err(TfeError::Api {
                status,
                message: format!("Failed to delete registry module '{}'", name),
            }),
        }
    }

    /// Publish a private registry module from a VCS repository
    pub async fn create_registry_module(
        &self,
        org: &str,
        request: &CreateModuleRequest,
    ) -> Result<()> {
        let url = format!(
            "{}/{}/{}/{}/vcs",
            self.base_url(),
            api::ORGANIZATIONS,
            org,
            api::REGISTRY_MODULES
        );

        debug!(
            "Publishing registry module from '{}' in '{}'",
            request.identifier(),
            org
        );

        let response = self.post(&url).json(request).send().await?;

        match response.status().as_u16() {
            200 | 201 => {
                debug!(
                    "Successfully published registry module from '{}'",
                    request.identifier()
                );
                Ok(())
            }
            422 => {
                let error_body: serde_json::Value =
                    response.json().await.unwrap_or(serde_json::json!({}));
                let error_msg = error_body["errors"][0]["detail"]
                    .as_str()
                    .unwrap_or("Validation error");
                Err(TfeError::Api {
                    status: 422,
                    message: format!(
                        "Cannot publish module from '{}': {}",
                        request.identifier(),
                        error_msg
                    ),
                })
            }
            status => {
                let error_body = response.text().await.unwrap_or_default();
                Err(TfeError::Api {
                    status,
                    message: format!(
                        "Failed to publish module from '{}': {}",
                        request.identifier(),
                        error_body
                    ),
                })
            }
        }
    }
}

/// The private registry of one organization
pub struct OrganizationRegistry {
    client: TfeClient,
    org: String,
}

impl OrganizationRegistry {
    pub fn new(client: TfeClient, org: impl Into<String>) -> Self {
        Self {
            client,
            org: org.into(),
        }
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn client(&self) -> &TfeClient {
        &self.client
    }
}

#[async_trait]
impl RegistryClient for OrganizationRegistry {
    async fn list_all_private_modules(&self) -> Result<Vec<serde_json::Value>> {
        self.client.get_registry_modules(&self.org).await
    }

    async fn delete_module(&self, name: &str) -> Result<()> {
        self.client.delete_registry_module(&self.org, name).await
    }

    async fn create_module(&self, request: &CreateModuleRequest) -> Result<()> {
        self.client.create_registry_module(&self.org, request).await
    }
}
