//! Reviewable record of a migration

use std::collections::HashMap;

use comfy_table::{presets::UTF8_FULL, Table};

use crate::error::{Result, TfeError};
use crate::hcp::registry_modules::{ModuleDescriptor, ModulePayload};
use crate::output::escape_csv;

/// Column headers of the plan, in order
pub const PLAN_HEADERS: [&str; 8] = [
    "Module Name",
    "No-Code",
    "Source VCS",
    "Source Repo",
    "Source Branch",
    "Dest VCS",
    "Dest Repo",
    "Dest Branch",
];

/// One module's before and after
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRow {
    pub name: String,
    pub no_code: bool,
    pub source_vcs: Option<String>,
    pub source_repo: Option<String>,
    pub source_branch: Option<String>,
    pub dest_vcs: String,
    pub dest_repo: String,
    pub dest_branch: Option<String>,
}

impl PlanRow {
    /// Cell values as displayed, absent values empty
    pub fn fields(&self) -> [String; 8] {
        [
            self.name.clone(),
            self.no_code.to_string(),
            self.source_vcs.clone().unwrap_or_default(),
            self.source_repo.clone().unwrap_or_default(),
            self.source_branch.clone().unwrap_or_default(),
            self.dest_vcs.clone(),
            self.dest_repo.clone(),
            self.dest_branch.clone().unwrap_or_default(),
        ]
    }
}

/// Modules to delete and recreate, in migration order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MigrationPlan {
    rows: Vec<PlanRow>,
}

impl MigrationPlan {
    /// Pair each payload with the module it replaces
    ///
    /// Rows follow payload order. Every payload must have a descriptor of the
    /// same name.
    pub fn build(
        descriptors: &[ModuleDescriptor],
        payloads: &[(String, ModulePayload)],
    ) -> Result<Self> {
        let by_name: HashMap<&str, &ModuleDescriptor> =
            descriptors.iter().map(|d| (d.name(), d)).collect();

        let rows = payloads
            .iter()
            .map(|(name, payload)| -> Result<PlanRow> {
                let module = by_name.get(name.as_str()).ok_or_else(|| {
                    TfeError::MissingData(format!(
                        "no source module found for planned module '{}'",
                        name
                    ))
                })?;
                let source_vcs = module
                    .vcs_source()?
                    .map(|s| s.credential_value().to_string());

                Ok(PlanRow {
                    name: name.clone(),
                    no_code: payload.no_code,
                    source_vcs,
                    source_repo: module.repo_identifier().map(str::to_string),
                    source_branch: module.repo_branch().map(str::to_string),
                    dest_vcs: payload.vcs_source.credential_value().to_string(),
                    dest_repo: payload.repo_identifier.clone(),
                    dest_branch: payload.repo_branch.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[PlanRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// CSV document with a header line, RFC 4180 quoting
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_csv_line(&mut out, PLAN_HEADERS.iter().map(|h| h.to_string()));
        for row in &self.rows {
            push_csv_line(&mut out, row.fields());
        }
        out
    }

    /// Table for interactive review
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(PLAN_HEADERS.to_vec());
        for row in &self.rows {
            table.add_row(row.fields().to_vec());
        }
        table
    }
}

fn push_csv_line(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let line: Vec<String> = fields.into_iter().map(|f| escape_csv(&f)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}
