//! CLI argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::config::{credentials, defaults};

/// Move private registry modules from one VCS connection to another
#[derive(Parser, Debug)]
#[command(name = "tfmod-migrate")]
#[command(version)]
#[command(
    about = "Migrate VCS-backed private registry modules between VCS connections",
    long_about = "Migrate VCS-backed private registry modules between VCS connections.\n\n\
        Modules published from the source connection and namespace are deleted and \
        recreated from the same repository name under the destination namespace, \
        using the destination connection. A CSV plan is written before anything \
        is changed."
)]
pub struct Cli {
    /// Namespace (VCS organization) the modules are published from
    #[arg(long, value_name = "NAMESPACE")]
    pub src_namespace: String,

    /// Namespace the repositories now live under
    #[arg(long, value_name = "NAMESPACE")]
    pub dst_namespace: String,

    /// Source VCS connection: OAuth token ID (ot-...) or GitHub App installation ID (ghain-...)
    #[arg(long, value_name = "ID")]
    pub src_vcs: String,

    /// Destination VCS connection: OAuth token ID (ot-...) or GitHub App installation ID (ghain-...)
    #[arg(long, value_name = "ID")]
    pub dst_vcs: String,

    /// Where to write the CSV migration plan (must not exist)
    #[arg(long, value_name = "PATH")]
    pub plan_file: PathBuf,

    /// HCP Terraform / Terraform Enterprise URL
    #[arg(long, env = credentials::URL_ENV_VAR, default_value = defaults::URL)]
    pub url: String,

    /// Organization owning the registry modules
    #[arg(long, env = credentials::ORGANIZATION_ENV_VAR)]
    pub org: Option<String>,

    /// API token (overrides env vars and credentials file)
    #[arg(short = 't', long)]
    pub token: Option<String>,

    /// Skip the plan review and confirmation prompts
    #[arg(short = 'y', long, default_value_t = false)]
    pub yes: bool,

    /// Hide spinners and progress bars
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = defaults::LOG_LEVEL)]
    pub log_level: String,
}
