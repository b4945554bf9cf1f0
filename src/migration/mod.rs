//! Migration of registry modules between VCS connections
//!
//! Planning is pure: [`MigrationPlanner`] selects the modules published from
//! the source connection and derives their replacements, and
//! [`MigrationPlan`] is the reviewable record of that decision. The
//! [`Migrator`] writes the plan, asks for confirmation and then deletes and
//! recreates each module through a [`RegistryClient`].

mod migrator;
mod plan;
mod planner;

use async_trait::async_trait;

use crate::error::Result;
use crate::hcp::registry_modules::CreateModuleRequest;

pub use migrator::{MigrationOutcome, MigrationOptions, Migrator};
pub use plan::{MigrationPlan, PlanRow, PLAN_HEADERS};
pub use planner::{Exclusion, MigrationPlanner};

/// Registry operations a migration needs
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// All private registry modules, as raw API records
    async fn list_all_private_modules(&self) -> Result<Vec<serde_json::Value>>;

    /// Delete a module by name
    async fn delete_module(&self, name: &str) -> Result<()>;

    /// Publish a new VCS-backed module
    async fn create_module(&self, request: &CreateModuleRequest) -> Result<()>;
}
