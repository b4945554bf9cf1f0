//! tfmod-migrate - Main entry point

use std::io::{self, BufRead};
use std::process;

use clap::Parser;
use log::{debug, error, info};

use tfmod_migrate::ui::{confirm_action, create_spinner, finish_spinner};
use tfmod_migrate::{
    Cli, MigrationOptions, MigrationOutcome, Migrator, OrganizationRegistry, Result, TfeClient,
    TfeError, TokenResolver, VcsCredential, VcsSource,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    info!("Starting tfmod-migrate v{}", env!("CARGO_PKG_VERSION"));
    debug!(
        "CLI args: src={}/{}, dst={}/{}, plan_file={}, url={}, org={:?}, yes={}",
        cli.src_namespace,
        cli.src_vcs,
        cli.dst_namespace,
        cli.dst_vcs,
        cli.plan_file.display(),
        cli.url,
        cli.org,
        cli.yes
    );

    match run(&cli).await {
        Ok(outcome) => report(&outcome),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<MigrationOutcome> {
    let org = cli
        .org
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .ok_or_else(|| {
            TfeError::Config(
                "No organization given. Use --org or set TFC_ORGANIZATION".to_string(),
            )
        })?;

    let source = VcsSource::new(
        cli.src_namespace.as_str(),
        VcsCredential::from_connection_id(&cli.src_vcs)?,
    );
    let destination = VcsSource::new(
        cli.dst_namespace.as_str(),
        VcsCredential::from_connection_id(&cli.dst_vcs)?,
    );

    if cli.plan_file.exists() {
        return Err(TfeError::PlanFileExists(cli.plan_file.clone()));
    }

    let token = TokenResolver::for_url(&cli.url)?.resolve(cli.token.as_deref())?;
    let client = TfeClient::new(token, cli.url.clone());

    let stdin = io::stdin();
    let mut input = stdin.lock();

    if !connection_ok(&client, cli, &mut input).await? {
        info!("Aborted after failed connection check");
        return Ok(MigrationOutcome::Declined {
            plan_file: cli.plan_file.clone(),
            planned: 0,
        });
    }

    let registry = OrganizationRegistry::new(client, org);
    let options = MigrationOptions {
        interactive: !cli.yes,
        quiet: cli.quiet,
    };
    Migrator::new(&registry, source, destination, options)
        .migrate(&cli.plan_file, &mut input)
        .await
}

/// Check the API is reachable with the resolved token
///
/// On failure the operator may continue anyway; with `--yes` the failure is fatal.
async fn connection_ok<R: BufRead + ?Sized>(
    client: &TfeClient,
    cli: &Cli,
    input: &mut R,
) -> Result<bool> {
    let spinner = create_spinner(&format!("Connecting to {}...", client.url()), cli.quiet);
    match client.check_connection().await {
        Ok(username) => {
            finish_spinner(spinner, "Connected");
            info!("Connected to {} as {}", client.url(), username);
            Ok(true)
        }
        Err(e) => {
            finish_spinner(spinner, "Connection failed");
            if cli.yes {
                return Err(e);
            }
            error!("Connection check against {} failed: {}", client.url(), e);
            Ok(confirm_action(input, "Do you want to continue?"))
        }
    }
}

fn report(outcome: &MigrationOutcome) {
    match outcome {
        MigrationOutcome::NothingToMigrate => {
            println!("No modules match migration criteria. Nothing to do.");
        }
        MigrationOutcome::Declined { plan_file, planned } if *planned > 0 => {
            println!(
                "Migration cancelled. Plan for {} module(s) kept in {}",
                planned,
                plan_file.display()
            );
        }
        MigrationOutcome::Declined { .. } => {
            println!("Migration cancelled.");
        }
        MigrationOutcome::Completed {
            plan_file,
            migrated,
        } => {
            println!(
                "Migrated {} module(s). Plan written to {}",
                migrated,
                plan_file.display()
            );
        }
    }
}
