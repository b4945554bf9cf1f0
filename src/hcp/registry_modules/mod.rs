//! Private registry module

mod api;
mod models;
mod vcs;

pub use api::OrganizationRegistry;
pub use models::{
    descriptors_by_name, split_repo_identifier, CreateModuleRequest, ModuleDescriptor,
    ModulePayload, VcsRepoAttributes,
};
pub use vcs::{VcsCredential, VcsKind, VcsSource, GITHUB_INSTALL_KEY, OAUTH_TOKEN_KEY};
