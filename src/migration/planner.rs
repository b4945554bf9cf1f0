//! Module selection and replacement payload derivation

use std::fmt;

use log::{debug, info};

use crate::error::{Result, TfeError};
use crate::hcp::registry_modules::{split_repo_identifier, ModuleDescriptor, ModulePayload, VcsSource};

/// Why a module is left out of a migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    NoCode,
    NotVcs,
    DifferentConnection,
    DifferentNamespace,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::NoCode => write!(f, "no-code module"),
            Exclusion::NotVcs => write!(f, "not a VCS module"),
            Exclusion::DifferentConnection => {
                write!(f, "does not match source VCS provider for migration")
            }
            Exclusion::DifferentNamespace => {
                write!(f, "does not match source namespace for migration")
            }
        }
    }
}

/// Decides which modules move and what they become
#[derive(Debug, Clone)]
pub struct MigrationPlanner {
    source: VcsSource,
    destination: VcsSource,
    /// No-code modules cannot be recreated from VCS yet
    allow_no_code: bool,
}

impl MigrationPlanner {
    pub fn new(source: VcsSource, destination: VcsSource) -> Self {
        Self {
            source,
            destination,
            allow_no_code: false,
        }
    }

    pub fn source(&self) -> &VcsSource {
        &self.source
    }

    pub fn destination(&self) -> &VcsSource {
        &self.destination
    }

    /// First reason the module is excluded, or `None` if it should be migrated
    ///
    /// Fails if the module's repository identifier is not `org/repo`.
    pub fn exclusion(&self, module: &ModuleDescriptor) -> Result<Option<Exclusion>> {
        if module.no_code() && !self.allow_no_code {
            return Ok(Some(Exclusion::NoCode));
        }
        let Some(vcs) = module.vcs_source()? else {
            return Ok(Some(Exclusion::NotVcs));
        };
        if !vcs.same_connection(&self.source) {
            return Ok(Some(Exclusion::DifferentConnection));
        }
        if vcs.namespace() != self.source.namespace() {
            return Ok(Some(Exclusion::DifferentNamespace));
        }
        Ok(None)
    }

    /// Keep the modules published from the source connection and namespace
    ///
    /// Order is preserved. Each excluded module is logged with its reason.
    pub fn filter(&self, modules: Vec<ModuleDescriptor>) -> Result<Vec<ModuleDescriptor>> {
        let mut eligible = Vec::new();
        for module in modules {
            match self.exclusion(&module)? {
                Some(reason) => info!("'{}' excluded: {}", module.name(), reason),
                None => eligible.push(module),
            }
        }
        debug!("{} module(s) match migration criteria", eligible.len());
        Ok(eligible)
    }

    /// Repository identifier of the module under the destination namespace
    pub fn new_repo_identifier(&self, module: &ModuleDescriptor) -> Result<String> {
        let identifier = module.repo_identifier().ok_or_else(|| {
            TfeError::MissingData(format!(
                "module '{}' does not have a VCS repository identifier",
                module.name()
            ))
        })?;
        let (_, repo) = split_repo_identifier(identifier)?;
        Ok(format!("{}/{}", self.destination.namespace(), repo))
    }

    /// Payload that recreates the module on the destination connection
    pub fn payload(&self, module: &ModuleDescriptor) -> Result<ModulePayload> {
        if module.repo_identifier() != module.repo_display_identifier() {
            return Err(TfeError::UnsupportedConfig(format!(
                "module '{}': only repositories whose identifier equals their display identifier are supported",
                module.name()
            )));
        }

        let new_id = self.new_repo_identifier(module)?;
        Ok(ModulePayload {
            vcs_source: self.destination.clone(),
            repo_identifier: new_id.clone(),
            repo_display_identifier: new_id,
            repo_branch: module.repo_branch().map(str::to_string),
            no_code: module.no_code(),
        })
    }

    /// Payloads for every module, keyed by module name in input order
    pub fn payloads(&self, modules: &[ModuleDescriptor]) -> Result<Vec<(String, ModulePayload)>> {
        modules
            .iter()
            .map(|m| Ok((m.name().to_string(), self.payload(m)?)))
            .collect()
    }
}
