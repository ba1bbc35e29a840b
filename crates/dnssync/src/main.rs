// # dnssync - Fleet DNS reconciliation CLI
//
// Thin integration layer over the library crates:
// 1. Parse arguments and decrypt the Pi-hole credential (SOPS)
// 2. Authenticate and assemble the engine (tofu inventory + Pi-hole backend)
// 3. Run the requested action and print a summary
//
// All reconciliation logic lives in dnssync-core; the interactive prompt
// loop here is only an adapter feeding the core's pure selection filter.
//
// ## Exit codes
//
// - 0: the run completed, even if individual operations failed (failures
//      are listed in the summary)
// - 1: setup-phase failure: arguments, secrets, authentication, or
//      desired-state extraction

mod secrets;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use dnssync_core::traits::DnsBackend;
use dnssync_core::{select, Choice, Operation, ReconcileEngine, RunReport, SyncConfig};
use dnssync_inventory_tofu::TofuInventory;
use dnssync_provider_pihole::PiholeBackend;

/// Exit codes for the two termination classes
#[derive(Debug, Clone, Copy)]
enum SyncExitCode {
    /// Run completed; per-operation failures, if any, were reported
    Completed = 0,
    /// Setup-phase failure before any mutation was possible
    SetupError = 1,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// What to do with the computed record lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Action {
    /// Print the provider's current custom records
    List,
    /// Register missing or drifted inventory records
    Add,
    /// Remove this fleet's records from the provider
    UnregisterDns,
    /// Like add, but pick records from a menu first
    InteractiveAdd,
    /// Like unregister-dns, but pick records from a menu first
    InteractiveUnregister,
}

/// Reconcile Pi-hole custom DNS records with OpenTofu inventory output
#[derive(Debug, Parser)]
#[command(name = "dnssync", version, about)]
struct Cli {
    /// Action to perform
    #[arg(long, value_enum)]
    action: Action,

    /// OpenTofu working directory (runs `tofu output -json` there)
    #[arg(long)]
    tf_dir: PathBuf,

    /// Read a cached outputs JSON file instead of invoking tofu
    #[arg(long)]
    outputs_file: Option<PathBuf>,

    /// SOPS-encrypted secrets file; defaults to ../terraform/secrets.sops.yaml
    /// relative to --tf-dir
    #[arg(long)]
    secrets_file: Option<PathBuf>,

    /// Override the deletion scope with this domain suffix (e.g. "bevz.net")
    #[arg(long)]
    domain_suffix: Option<String>,

    /// With --action add: also delete in-scope records that left the inventory
    #[arg(long)]
    prune: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::SetupError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::SetupError.into();
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => SyncExitCode::Completed.into(),
        Err(e) => {
            error!("{:#}", e);
            SyncExitCode::SetupError.into()
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Setup phase: secrets, config, authentication. Any failure here is
    // fatal and maps to exit code 1.
    let secrets_path = secrets::resolve_secrets_path(cli.secrets_file.as_deref(), &cli.tf_dir);
    let pihole = secrets::load_pihole_secrets(&secrets_path).await?;

    let mut config = SyncConfig::new(pihole.ip_address.clone());
    if let Some(suffix) = &cli.domain_suffix {
        config = config.with_scope_suffixes(vec![suffix.clone()]);
    }
    config.validate()?;

    let backend = PiholeBackend::connect_with_timeout(
        PiholeBackend::base_url_for_host(&config.endpoint_host),
        &pihole.web_password,
        std::time::Duration::from_secs(config.http_timeout_secs),
    )
    .await
    .context("could not establish a Pi-hole session")?;

    if cli.action == Action::List {
        return list_records(&backend).await;
    }

    let inventory = match &cli.outputs_file {
        Some(path) => TofuInventory::from_outputs_file(path),
        None => TofuInventory::from_tofu_dir(&cli.tf_dir),
    };

    let engine = ReconcileEngine::new(Box::new(inventory), Box::new(backend), config.scope());

    let candidates: Vec<Operation> = match cli.action {
        Action::List => unreachable!("handled above"),
        Action::Add | Action::InteractiveAdd => {
            let plan = engine.plan().await?;
            if cli.action == Action::Add && cli.prune {
                plan.to_add.into_iter().chain(plan.to_delete).collect()
            } else {
                plan.to_add
            }
        }
        Action::UnregisterDns | Action::InteractiveUnregister => {
            engine.deregister_candidates().await?
        }
    };

    if candidates.is_empty() {
        info!("nothing to do, provider already matches the inventory");
        return Ok(());
    }

    let selected = match cli.action {
        Action::InteractiveAdd => prompt_selection(&candidates, "addition/update")?,
        Action::InteractiveUnregister => prompt_selection(&candidates, "deletion")?,
        _ => candidates,
    };

    if selected.is_empty() {
        info!("no records selected, exiting without changes");
        return Ok(());
    }

    info!(count = selected.len(), "applying operations");
    let report = engine.execute(&selected).await;
    print_summary(&report);
    Ok(())
}

/// Print the provider's current records and return
async fn list_records(backend: &PiholeBackend) -> Result<()> {
    let records = match backend.list_records().await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, "could not retrieve provider records");
            Vec::new()
        }
    };

    if records.is_empty() {
        println!("No custom DNS records found.");
        return Ok(());
    }

    println!("Current custom DNS records:");
    for (i, record) in records.iter().enumerate() {
        println!("{}. {}", i + 1, record);
    }
    Ok(())
}

/// Terminal adapter around the core selection filter
///
/// Displays the numbered candidate list and loops until the answer maps to
/// a valid [`Choice`]; the narrowing itself is the pure `select()`.
fn prompt_selection(candidates: &[Operation], what_for: &str) -> Result<Vec<Operation>> {
    println!("\nCandidates for {}:", what_for);
    for (i, op) in candidates.iter().enumerate() {
        println!("{}. {}", i + 1, op.record());
    }
    println!("\nOptions:");
    println!("a. All records");
    println!("q. Quit without changes");

    loop {
        print!("\nSelect an option (1-{}, a, q): ", candidates.len());
        std::io::stdout().flush()?;

        let mut answer = String::new();
        std::io::stdin()
            .read_line(&mut answer)
            .context("could not read selection from terminal")?;

        let choice = match answer.trim().to_lowercase().as_str() {
            "q" => Choice::Quit,
            "a" => Choice::All,
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => Choice::One(n - 1),
                _ => {
                    println!("Invalid input. Enter a number, 'a' for all, or 'q' to quit.");
                    continue;
                }
            },
        };

        let selected = select(candidates, choice);
        if selected.is_empty() && choice != Choice::Quit {
            println!("Invalid selection. Choose between 1 and {}.", candidates.len());
            continue;
        }
        return Ok(selected);
    }
}

/// Final summary: counts plus every classified failure
fn print_summary(report: &RunReport) {
    println!(
        "\n{}/{} operations succeeded.",
        report.succeeded,
        report.attempted()
    );
    if !report.all_succeeded() {
        println!("Failures:");
        for failure in &report.failures {
            println!("  {} — {}", failure.operation, failure.reason);
        }
    }
}
