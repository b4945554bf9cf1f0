//! Plan-confirm-execute driver for a migration run

use std::fs::OpenOptions;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Result, TfeError};
use crate::hcp::registry_modules::{descriptors_by_name, ModulePayload, VcsSource};
use crate::output::print_plan;
use crate::ui::{abandon_spinner, confirm_action, create_progress_bar, create_spinner, finish_spinner};

use super::plan::MigrationPlan;
use super::planner::MigrationPlanner;
use super::RegistryClient;

/// How a run interacts with the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOptions {
    /// Show the plan and require confirmation before mutating anything
    pub interactive: bool,
    /// Hide spinners and progress bars
    pub quiet: bool,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            interactive: true,
            quiet: false,
        }
    }
}

/// How a run ended without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No module matched the source connection; no plan was written
    NothingToMigrate,
    /// The operator declined; the plan was written but nothing changed
    Declined { plan_file: PathBuf, planned: usize },
    /// Every planned module was deleted and recreated
    Completed { plan_file: PathBuf, migrated: usize },
}

/// Moves registry modules from one VCS connection to another
pub struct Migrator<'a, C: RegistryClient + ?Sized> {
    client: &'a C,
    planner: MigrationPlanner,
    options: MigrationOptions,
}

impl<'a, C: RegistryClient + ?Sized> Migrator<'a, C> {
    pub fn new(
        client: &'a C,
        source: VcsSource,
        destination: VcsSource,
        options: MigrationOptions,
    ) -> Self {
        Self {
            client,
            planner: MigrationPlanner::new(source, destination),
            options,
        }
    }

    pub fn planner(&self) -> &MigrationPlanner {
        &self.planner
    }

    /// Query the registry and compute the plan
    ///
    /// Returns `None` when no module is eligible.
    pub async fn plan(&self) -> Result<Option<(MigrationPlan, Vec<(String, ModulePayload)>)>> {
        info!("Querying the Terraform API for all private registry modules");
        let spinner = create_spinner("Fetching private registry modules...", self.options.quiet);
        let records = match self.client.list_all_private_modules().await {
            Ok(records) => records,
            Err(e) => {
                abandon_spinner(spinner);
                return Err(e);
            }
        };
        finish_spinner(spinner, "Done");

        let modules = descriptors_by_name(&records)?;
        info!("Found {} private registry modules", modules.len());

        let eligible = self.planner.filter(modules)?;
        if eligible.is_empty() {
            return Ok(None);
        }

        let payloads = self.planner.payloads(&eligible)?;
        let plan = MigrationPlan::build(&eligible, &payloads)?;
        Ok(Some((plan, payloads)))
    }

    /// Run the whole migration
    ///
    /// The plan is written to `plan_file`, which must not exist yet; this is
    /// checked before the registry is queried. In interactive mode the answer
    /// to the confirmation prompt is read from `input`.
    ///
    /// Modules are deleted and recreated one at a time in plan order. The
    /// first failure stops the run; modules already migrated stay migrated.
    pub async fn migrate<R: BufRead + ?Sized>(
        &self,
        plan_file: &Path,
        input: &mut R,
    ) -> Result<MigrationOutcome> {
        if plan_file.exists() {
            return Err(TfeError::PlanFileExists(plan_file.to_path_buf()));
        }

        let Some((plan, payloads)) = self.plan().await? else {
            info!("No modules match migration criteria");
            return Ok(MigrationOutcome::NothingToMigrate);
        };

        debug!("Writing migration plan to {}", plan_file.display());
        write_plan(plan_file, &plan)?;
        info!(
            "Migration plan for {} module(s) written to {}",
            plan.len(),
            plan_file.display()
        );

        if self.options.interactive {
            print_plan(&plan);
            if !confirm_action(input, "Do you want to proceed?") {
                info!("Migration cancelled, no modules were changed");
                return Ok(MigrationOutcome::Declined {
                    plan_file: plan_file.to_path_buf(),
                    planned: plan.len(),
                });
            }
        }

        let progress = create_progress_bar(
            payloads.len(),
            self.options.quiet || !self.options.interactive,
        );
        for (name, payload) in &payloads {
            if let Err(e) = self.migrate_module(name, payload).await {
                abandon_spinner(progress);
                return Err(e);
            }
            if let Some(ref bar) = progress {
                bar.inc(1);
            }
        }
        finish_spinner(progress, "Done");

        info!("Migrated {} module(s)", payloads.len());
        Ok(MigrationOutcome::Completed {
            plan_file: plan_file.to_path_buf(),
            migrated: payloads.len(),
        })
    }

    /// Delete the module, then publish its replacement
    async fn migrate_module(&self, name: &str, payload: &ModulePayload) -> Result<()> {
        info!("Deleting module '{}'", name);
        self.client
            .delete_module(name)
            .await
            .map_err(|e| TfeError::DeleteModule {
                name: name.to_string(),
                source: Box::new(e),
            })?;

        info!("Creating module '{}' from {}", name, payload.repo_identifier);
        self.client
            .create_module(&payload.to_request())
            .await
            .map_err(|e| TfeError::CreateModule {
                name: name.to_string(),
                source: Box::new(e),
            })
    }
}

/// Write the plan CSV, refusing to replace an existing file
fn write_plan(path: &Path, plan: &MigrationPlan) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => TfeError::PlanFileExists(path.to_path_buf()),
            _ => TfeError::Io(e),
        })?;
    file.write_all(plan.to_csv().as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hcp::registry_modules::{CreateModuleRequest, VcsCredential};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::io::Cursor;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        List,
        Delete(String),
        Create(String),
    }

    /// In-memory registry recording every call
    #[derive(Default)]
    struct FakeRegistry {
        modules: Vec<Value>,
        fail_list: bool,
        fail_delete: Option<String>,
        fail_create: Option<String>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeRegistry {
        fn with_modules(modules: Vec<Value>) -> Self {
            Self {
                modules,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn mutations(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| !matches!(c, Call::List))
                .count()
        }
    }

    fn api_error() -> TfeError {
        TfeError::Api {
            status: 500,
            message: "boom".to_string(),
        }
    }

    #[async_trait]
    impl RegistryClient for FakeRegistry {
        async fn list_all_private_modules(&self) -> Result<Vec<Value>> {
            self.calls.lock().unwrap().push(Call::List);
            if self.fail_list {
                return Err(api_error());
            }
            Ok(self.modules.clone())
        }

        async fn delete_module(&self, name: &str) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Delete(name.to_string()));
            if self.fail_delete.as_deref() == Some(name) {
                return Err(api_error());
            }
            Ok(())
        }

        async fn create_module(&self, request: &CreateModuleRequest) -> Result<()> {
            let identifier = request.identifier().to_string();
            self.calls.lock().unwrap().push(Call::Create(identifier.clone()));
            if self.fail_create.as_deref() == Some(identifier.as_str()) {
                return Err(api_error());
            }
            Ok(())
        }
    }

    fn source() -> VcsSource {
        VcsSource::new("acme", VcsCredential::OAuthToken("ot-src".into()))
    }

    fn destination() -> VcsSource {
        VcsSource::new("acme-new", VcsCredential::OAuthToken("ot-dst".into()))
    }

    fn vcs_module(name: &str, identifier: &str, token: &str) -> Value {
        json!({
            "id": format!("mod-{}", name),
            "type": "registry-modules",
            "attributes": {
                "name": name,
                "no-code": false,
                "vcs-repo": {
                    "identifier": identifier,
                    "display-identifier": identifier,
                    "branch": "main",
                    "oauth-token-id": token
                }
            }
        })
    }

    fn manual_module(name: &str) -> Value {
        json!({ "attributes": { "name": name, "no-code": false } })
    }

    fn interactive() -> MigrationOptions {
        MigrationOptions {
            interactive: true,
            quiet: true,
        }
    }

    fn batch() -> MigrationOptions {
        MigrationOptions {
            interactive: false,
            quiet: true,
        }
    }

    #[tokio::test]
    async fn test_single_eligible_module_plan() {
        let registry = FakeRegistry::with_modules(vec![
            manual_module("manual-module"),
            vcs_module("widgets-module", "acme/widgets", "ot-src"),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let plan_file = dir.path().join("plan.csv");

        let migrator = Migrator::new(&registry, source(), destination(), interactive());
        let outcome = migrator
            .migrate(&plan_file, &mut Cursor::new("yes\n"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            MigrationOutcome::Completed {
                plan_file: plan_file.clone(),
                migrated: 1
            }
        );
        let csv = std::fs::read_to_string(&plan_file).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "widgets-module,false,ot-src,acme/widgets,main,ot-dst,acme-new/widgets,main"
        );
        assert_eq!(
            registry.calls(),
            vec![
                Call::List,
                Call::Delete("widgets-module".to_string()),
                Call::Create("acme-new/widgets".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_nothing_eligible_writes_no_plan() {
        let registry = FakeRegistry::with_modules(vec![
            manual_module("manual-module"),
            vcs_module("other", "acme/other", "ot-unrelated"),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let plan_file = dir.path().join("plan.csv");

        let migrator = Migrator::new(&registry, source(), destination(), batch());
        let outcome = migrator
            .migrate(&plan_file, &mut Cursor::new(""))
            .await
            .unwrap();

        assert_eq!(outcome, MigrationOutcome::NothingToMigrate);
        assert!(!plan_file.exists());
        assert_eq!(registry.mutations(), 0);
    }

    #[tokio::test]
    async fn test_existing_plan_file_fails_before_query() {
        let registry =
            FakeRegistry::with_modules(vec![vcs_module("widgets-module", "acme/widgets", "ot-src")]);
        let dir = tempfile::tempdir().unwrap();
        let plan_file = dir.path().join("plan.csv");
        std::fs::write(&plan_file, "previous run").unwrap();

        let migrator = Migrator::new(&registry, source(), destination(), batch());
        let err = migrator
            .migrate(&plan_file, &mut Cursor::new(""))
            .await
            .unwrap_err();

        assert!(matches!(err, TfeError::PlanFileExists(_)));
        assert!(registry.calls().is_empty());
        assert_eq!(std::fs::read_to_string(&plan_file).unwrap(), "previous run");
    }

    #[tokio::test]
    async fn test_declined_confirmation_changes_nothing() {
        let registry =
            FakeRegistry::with_modules(vec![vcs_module("widgets-module", "acme/widgets", "ot-src")]);
        let dir = tempfile::tempdir().unwrap();
        let plan_file = dir.path().join("plan.csv");

        let migrator = Migrator::new(&registry, source(), destination(), interactive());
        let outcome = migrator
            .migrate(&plan_file, &mut Cursor::new("no\n"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            MigrationOutcome::Declined {
                plan_file: plan_file.clone(),
                planned: 1
            }
        );
        assert!(plan_file.exists());
        assert_eq!(registry.mutations(), 0);
    }

    #[tokio::test]
    async fn test_create_failure_stops_run() {
        let mut registry = FakeRegistry::with_modules(vec![
            vcs_module("first", "acme/first", "ot-src"),
            vcs_module("second", "acme/second", "ot-src"),
            vcs_module("third", "acme/third", "ot-src"),
        ]);
        registry.fail_create = Some("acme-new/second".to_string());
        let dir = tempfile::tempdir().unwrap();
        let plan_file = dir.path().join("plan.csv");

        let migrator = Migrator::new(&registry, source(), destination(), batch());
        let err = migrator
            .migrate(&plan_file, &mut Cursor::new(""))
            .await
            .unwrap_err();

        match &err {
            TfeError::CreateModule { name, .. } => assert_eq!(name, "second"),
            other => panic!("Expected TfeError::CreateModule, got {:?}", other),
        }
        assert!(err.to_string().contains("second"));
        assert_eq!(
            registry.calls(),
            vec![
                Call::List,
                Call::Delete("first".to_string()),
                Call::Create("acme-new/first".to_string()),
                Call::Delete("second".to_string()),
                Call::Create("acme-new/second".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_failure_skips_create() {
        let mut registry =
            FakeRegistry::with_modules(vec![vcs_module("widgets-module", "acme/widgets", "ot-src")]);
        registry.fail_delete = Some("widgets-module".to_string());
        let dir = tempfile::tempdir().unwrap();
        let plan_file = dir.path().join("plan.csv");

        let migrator = Migrator::new(&registry, source(), destination(), batch());
        let err = migrator
            .migrate(&plan_file, &mut Cursor::new(""))
            .await
            .unwrap_err();

        assert!(matches!(err, TfeError::DeleteModule { ref name, .. } if name == "widgets-module"));
        assert_eq!(
            registry.calls(),
            vec![Call::List, Call::Delete("widgets-module".to_string())]
        );
    }

    #[tokio::test]
    async fn test_query_failure_is_fatal() {
        let registry = FakeRegistry {
            fail_list: true,
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let plan_file = dir.path().join("plan.csv");

        let migrator = Migrator::new(&registry, source(), destination(), batch());
        let err = migrator
            .migrate(&plan_file, &mut Cursor::new(""))
            .await
            .unwrap_err();

        assert!(matches!(err, TfeError::Api { status: 500, .. }));
        assert!(!plan_file.exists());
    }

    #[tokio::test]
    async fn test_malformed_identifier_aborts_before_plan() {
        let registry = FakeRegistry::with_modules(vec![
            vcs_module("good", "acme/good", "ot-src"),
            vcs_module("nested", "acme/group/nested", "ot-src"),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let plan_file = dir.path().join("plan.csv");

        let migrator = Migrator::new(&registry, source(), destination(), batch());
        let err = migrator
            .migrate(&plan_file, &mut Cursor::new(""))
            .await
            .unwrap_err();

        assert!(matches!(err, TfeError::UnsupportedFormat(_)));
        assert!(!plan_file.exists());
        assert_eq!(registry.mutations(), 0);
    }

    #[tokio::test]
    async fn test_plan_is_deterministic() {
        let modules = vec![
            vcs_module("b", "acme/b", "ot-src"),
            manual_module("manual"),
            vcs_module("a", "acme/a", "ot-src"),
        ];
        let registry = FakeRegistry::with_modules(modules);
        let migrator = Migrator::new(&registry, source(), destination(), batch());

        let (first, _) = migrator.plan().await.unwrap().unwrap();
        let (second, _) = migrator.plan().await.unwrap().unwrap();

        assert_eq!(first.to_csv(), second.to_csv());
        assert_eq!(first.rows()[0].name, "b");
        assert_eq!(first.rows()[1].name, "a");
    }

    #[test]
    fn test_write_plan_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.csv");
        write_plan(&path, &MigrationPlan::default()).unwrap();
        assert!(matches!(
            write_plan(&path, &MigrationPlan::default()),
            Err(TfeError::PlanFileExists(_))
        ));
    }
}
