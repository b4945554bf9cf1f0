//! VCS connection value types

use std::fmt;

use crate::config::vcs;
use crate::error::{Result, TfeError};

/// API field name of an OAuth token credential
pub const OAUTH_TOKEN_KEY: &str = "oauth-token-id";

/// API field name of a GitHub App installation credential
pub const GITHUB_INSTALL_KEY: &str = "github-app-installation-id";

/// Kind of credential backing a VCS connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsKind {
    OAuth,
    GitHubApp,
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsKind::OAuth => write!(f, "oauth"),
            VcsKind::GitHubApp => write!(f, "github-app"),
        }
    }
}

/// Credential identifying a VCS connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCredential {
    /// OAuth token ID (`ot-*`)
    OAuthToken(String),
    /// GitHub App installation ID (`ghain-*`)
    GitHubInstall(String),
}

impl VcsCredential {
    /// Parse a connection identifier given on the command line
    ///
    /// The prefix selects the credential kind: `ghain-` for GitHub App
    /// installations, `ot-` for OAuth tokens.
    pub fn from_connection_id(id: &str) -> Result<Self> {
        if id.starts_with(vcs::GITHUB_INSTALL_PREFIX) {
            Ok(VcsCredential::GitHubInstall(id.to_string()))
        } else if id.starts_with(vcs::OAUTH_TOKEN_PREFIX) {
            Ok(VcsCredential::OAuthToken(id.to_string()))
        } else {
            Err(TfeError::Config(format!(
                "Invalid VCS connection identifier '{}' (expected '{}*' or '{}*')",
                id,
                vcs::OAUTH_TOKEN_PREFIX,
                vcs::GITHUB_INSTALL_PREFIX
            )))
        }
    }

    pub fn kind(&self) -> VcsKind {
        match self {
            VcsCredential::OAuthToken(_) => VcsKind::OAuth,
            VcsCredential::GitHubInstall(_) => VcsKind::GitHubApp,
        }
    }
}

/// A VCS connection scoped to a namespace (e.g. a GitHub organization)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsSource {
    namespace: String,
    credential: VcsCredential,
}

impl VcsSource {
    pub fn new(namespace: impl Into<String>, credential: VcsCredential) -> Self {
        Self {
            namespace: namespace.into(),
            credential,
        }
    }

    /// Build a source from the two optional credential fields of an API record
    ///
    /// Exactly one of `oauth_token_id` and `github_install_id` must be set.
    pub fn from_fields(
        namespace: &str,
        oauth_token_id: Option<&str>,
        github_install_id: Option<&str>,
    ) -> Result<Self> {
        let credential = match (oauth_token_id, github_install_id) {
            (Some(ot), None) => VcsCredential::OAuthToken(ot.to_string()),
            (None, Some(gh)) => VcsCredential::GitHubInstall(gh.to_string()),
            (None, None) => {
                return Err(TfeError::Config(format!(
                    "Either {} or {} must be provided",
                    OAUTH_TOKEN_KEY, GITHUB_INSTALL_KEY
                )))
            }
            (Some(_), Some(_)) => {
                return Err(TfeError::Config(format!(
                    "Only one of {} or {} can be provided",
                    OAUTH_TOKEN_KEY, GITHUB_INSTALL_KEY
                )))
            }
        };
        Ok(Self::new(namespace, credential))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn credential(&self) -> &VcsCredential {
        &self.credential
    }

    pub fn kind(&self) -> VcsKind {
        self.credential.kind()
    }

    /// API field name for the active credential kind
    pub fn credential_key(&self) -> &'static str {
        match self.credential {
            VcsCredential::OAuthToken(_) => OAUTH_TOKEN_KEY,
            VcsCredential::GitHubInstall(_) => GITHUB_INSTALL_KEY,
        }
    }

    pub fn credential_value(&self) -> &str {
        match &self.credential {
            VcsCredential::OAuthToken(id) | VcsCredential::GitHubInstall(id) => id,
        }
    }

    /// The `(field, value)` pair sent to the API
    pub fn as_key_value(&self) -> (&'static str, &str) {
        (self.credential_key(), self.credential_value())
    }

    /// True if both sources use the same provider connection, regardless of namespace
    pub fn same_connection(&self, other: &VcsSource) -> bool {
        self.as_key_value() == other.as_key_value()
    }
}
