//! tfmod-migrate - Move private registry modules between VCS connections
//!
//! When the repositories behind VCS-published Terraform modules move to a new
//! VCS organization, or the organization switches from an OAuth connection to
//! a GitHub App installation, the registry modules must be deleted and
//! published again from the new location. This crate automates that.
//!
//! # Features
//!
//! - Selects modules by source connection and namespace
//! - Writes a CSV plan before changing anything
//! - Interactive review with an explicit `yes` confirmation
//! - Sequential delete-then-create with a progress bar
//!
//! # Example
//!
//! ```bash
//! export TFC_ORGANIZATION=my-org
//! export TFC_TOKEN=...
//!
//! tfmod-migrate \
//!     --src-namespace acme --src-vcs ot-AbCd1234 \
//!     --dst-namespace acme-new --dst-vcs ghain-XyZ987 \
//!     --plan-file migration.csv
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod hcp;
pub mod migration;
pub mod output;
pub mod ui;

pub use cli::Cli;
pub use error::{Result, TfeError};
pub use hcp::{OrganizationRegistry, TfeClient, TokenResolver, VcsCredential, VcsSource};
pub use migration::{
    MigrationOptions, MigrationOutcome, MigrationPlan, MigrationPlanner, Migrator, RegistryClient,
};
