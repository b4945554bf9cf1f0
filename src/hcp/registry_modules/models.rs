//! Private registry module data models

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TfeError};

use super::vcs::{VcsCredential, VcsSource};

/// VCS repository settings of a registry module, as returned by the API
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct VcsRepoAttributes {
    pub identifier: Option<String>,
    #[serde(rename = "display-identifier")]
    pub display_identifier: Option<String>,
    pub branch: Option<String>,
    #[serde(rename = "oauth-token-id")]
    pub oauth_token_id: Option<String>,
    #[serde(rename = "github-app-installation-id")]
    pub github_app_installation_id: Option<String>,
}

/// Registry module attributes from the TFE API
#[derive(Deserialize, Debug, Clone, Default)]
struct ModuleAttributes {
    name: Option<String>,
    namespace: Option<String>,
    provider: Option<String>,
    #[serde(rename = "no-code")]
    no_code: Option<bool>,
    #[serde(rename = "vcs-repo")]
    vcs_repo: Option<VcsRepoAttributes>,
}

/// An existing private registry module
///
/// Built from a raw API record, which may be the full `{"data": {...}}`
/// document, a resource object with an `attributes` member, or the bare
/// attributes map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    name: String,
    namespace: Option<String>,
    provider: Option<String>,
    no_code: bool,
    vcs_repo: Option<VcsRepoAttributes>,
}

impl ModuleDescriptor {
    /// Adapt a raw registry module record
    pub fn from_value(record: &serde_json::Value) -> Result<Self> {
        let resource = match record.get("data") {
            Some(inner) if inner.is_object() => inner,
            _ => record,
        };
        let attributes = resource.get("attributes").unwrap_or(resource);

        let attrs: ModuleAttributes = serde_json::from_value(attributes.clone())?;
        let name = attrs.name.ok_or_else(|| {
            TfeError::MissingData("registry module record has no 'name' attribute".to_string())
        })?;

        Ok(Self {
            name,
            namespace: attrs.namespace,
            provider: attrs.provider,
            no_code: attrs.no_code.unwrap_or(false),
            vcs_repo: attrs.vcs_repo,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry namespace of the module (the organization for private modules)
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn no_code(&self) -> bool {
        self.no_code
    }

    pub fn vcs_repo(&self) -> Option<&VcsRepoAttributes> {
        self.vcs_repo.as_ref()
    }

    pub fn repo_identifier(&self) -> Option<&str> {
        self.vcs_repo.as_ref()?.identifier.as_deref()
    }

    pub fn repo_display_identifier(&self) -> Option<&str> {
        self.vcs_repo.as_ref()?.display_identifier.as_deref()
    }

    pub fn repo_branch(&self) -> Option<&str> {
        self.vcs_repo.as_ref()?.branch.as_deref()
    }

    /// VCS namespace, i.e. the `org` part of an `org/repo` identifier
    pub fn repo_namespace(&self) -> Result<Option<&str>> {
        match self.repo_identifier() {
            None => Ok(None),
            Some(identifier) => split_repo_identifier(identifier).map(|(org, _)| Some(org)),
        }
    }

    /// The VCS connection this module is currently published from
    ///
    /// `None` for modules that are not VCS-backed.
    pub fn vcs_source(&self) -> Result<Option<VcsSource>> {
        let Some(vcs) = self.vcs_repo.as_ref() else {
            return Ok(None);
        };
        let Some(namespace) = self.repo_namespace()? else {
            return Ok(None);
        };

        VcsSource::from_fields(
            namespace,
            vcs.oauth_token_id.as_deref(),
            vcs.github_app_installation_id.as_deref(),
        )
        .map(Some)
        .map_err(|e| match e {
            TfeError::Config(msg) => {
                TfeError::Config(format!("module '{}': {}", self.name, msg))
            }
            other => other,
        })
    }
}

/// Split an `org/repo` identifier into its two parts
pub fn split_repo_identifier(identifier: &str) -> Result<(&str, &str)> {
    match identifier.split_once('/') {
        Some((org, repo)) if !repo.contains('/') => Ok((org, repo)),
        _ => Err(TfeError::UnsupportedFormat(format!(
            "repository identifier '{}' is not in the format :org/:repo",
            identifier
        ))),
    }
}

/// Convert raw API records into descriptors, one per module name
///
/// Discovery order is preserved. A later record with an already seen name
/// replaces the earlier one in place.
pub fn descriptors_by_name(records: &[serde_json::Value]) -> Result<Vec<ModuleDescriptor>> {
    let mut modules: Vec<ModuleDescriptor> = Vec::with_capacity(records.len());
    for record in records {
        let module = ModuleDescriptor::from_value(record)?;
        match modules.iter_mut().find(|m| m.name == module.name) {
            Some(existing) => {
                warn!(
                    "Duplicate registry module name '{}', keeping the last record",
                    module.name
                );
                *existing = module;
            }
            None => modules.push(module),
        }
    }
    Ok(modules)
}

/// Desired state of a VCS-backed module to be (re)created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePayload {
    pub vcs_source: VcsSource,
    pub repo_identifier: String,
    pub repo_display_identifier: String,
    pub repo_branch: Option<String>,
    pub no_code: bool,
}

impl ModulePayload {
    /// Build the request body for `POST /organizations/:org/registry-modules/vcs`
    pub fn to_request(&self) -> CreateModuleRequest {
        let (oauth_token_id, github_app_installation_id) = match self.vcs_source.credential() {
            VcsCredential::OAuthToken(id) => (Some(id.clone()), None),
            VcsCredential::GitHubInstall(id) => (None, Some(id.clone())),
        };

        CreateModuleRequest {
            data: CreateModuleData {
                data_type: "registry-modules".to_string(),
                attributes: CreateModuleAttributes {
                    no_code: self.no_code,
                    vcs_repo: CreateVcsRepo {
                        identifier: self.repo_identifier.clone(),
                        display_identifier: self.repo_display_identifier.clone(),
                        oauth_token_id,
                        github_app_installation_id,
                        branch: self.repo_branch.clone().filter(|b| !b.is_empty()),
                    },
                },
            },
        }
    }
}

/// Request payload for publishing a module from VCS
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreateModuleRequest {
    pub data: CreateModuleData,
}

impl CreateModuleRequest {
    pub fn identifier(&self) -> &str {
        &self.data.attributes.vcs_repo.identifier
    }
}

/// Data part of the publish request
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreateModuleData {
    #[serde(rename = "type")]
    pub data_type: String,
    pub attributes: CreateModuleAttributes,
}

/// Attributes of the publish request
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreateModuleAttributes {
    #[serde(rename = "no-code")]
    pub no_code: bool,
    #[serde(rename = "vcs-repo")]
    pub vcs_repo: CreateVcsRepo,
}

/// VCS repository settings of the publish request
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreateVcsRepo {
    pub identifier: String,
    #[serde(rename = "display-identifier")]
    pub display_identifier: String,
    #[serde(rename = "oauth-token-id", skip_serializing_if = "Option::is_none")]
    pub oauth_token_id: Option<String>,
    #[serde(
        rename = "github-app-installation-id",
        skip_serializing_if = "Option::is_none"
    )]
    pub github_app_installation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}
