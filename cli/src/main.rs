//! custody-cli: configuration, replay and snapshot tooling for the custody
//! bridge ledger.

mod script;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use custody_ledger::{BridgeLedger, LedgerConfig, LedgerSnapshot};
use custody_token::MemoryToken;
use custody_utils::{init_logging, LogFormat};

use crate::script::{Script, SimLedger};

#[derive(Parser)]
#[command(name = "custody-cli", about = "Custody bridge ledger tooling")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Overrides the config file value.
    #[arg(long, env = "CUSTODY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json". Overrides the config file value.
    #[arg(long, env = "CUSTODY_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print a configuration file with every default filled in.
    DefaultConfig,

    /// Replay a JSON call script against an in-memory ledger.
    Simulate {
        /// Path to the TOML ledger configuration.
        #[arg(long, env = "CUSTODY_CONFIG")]
        config: PathBuf,

        /// Path to the JSON call script.
        #[arg(long)]
        script: PathBuf,

        /// Restore this snapshot before replaying.
        #[arg(long)]
        from_snapshot: Option<PathBuf>,

        /// Write a snapshot of the final state here.
        #[arg(long)]
        snapshot_out: Option<PathBuf>,
    },

    /// Check the integrity hash of a snapshot file.
    VerifySnapshot {
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::DefaultConfig => {
            start_logging(cli.log_format.as_deref(), cli.log_level.as_deref(), None)?;
            print!("{}", LedgerConfig::default().to_toml_string()?);
        }
        Command::Simulate {
            config,
            script,
            from_snapshot,
            snapshot_out,
        } => {
            let config = LedgerConfig::from_toml_file(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            start_logging(
                cli.log_format.as_deref(),
                cli.log_level.as_deref(),
                Some(&config),
            )?;
            simulate(&config, &script, from_snapshot.as_deref(), snapshot_out.as_deref())?;
        }
        Command::VerifySnapshot { path } => {
            start_logging(cli.log_format.as_deref(), cli.log_level.as_deref(), None)?;
            let snapshot = read_snapshot(&path)?;
            println!(
                "{}",
                serde_json::json!({
                    "hash": snapshot.hash_hex(),
                    "version": snapshot.version,
                    "utxos": snapshot.utxo_count(),
                    "burns": snapshot.burn_count(),
                    "burn_id_counter": snapshot.burn_id_counter,
                })
            );
            tracing::info!(hash = %snapshot.hash_hex(), "snapshot verified");
        }
    }
    Ok(())
}

fn start_logging(
    format: Option<&str>,
    level: Option<&str>,
    config: Option<&LedgerConfig>,
) -> anyhow::Result<()> {
    let defaults = LedgerConfig::default();
    let config = config.unwrap_or(&defaults);
    let format: LogFormat = format.unwrap_or(config.log_format.as_str()).parse()?;
    init_logging(format, level.unwrap_or(config.log_level.as_str()));
    Ok(())
}

fn build_ledger(config: &LedgerConfig) -> anyhow::Result<SimLedger> {
    let token = MemoryToken::new(config.bridge_params().redeem_address);
    Ok(BridgeLedger::from_config(config, token)?)
}

fn simulate(
    config: &LedgerConfig,
    script_path: &Path,
    from_snapshot: Option<&Path>,
    snapshot_out: Option<&Path>,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(script_path)
        .with_context(|| format!("reading {}", script_path.display()))?;
    let script: Script = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", script_path.display()))?;

    let mut ledger = build_ledger(config)?;
    if let Some(path) = from_snapshot {
        ledger.restore(read_snapshot(path)?)?;
        tracing::info!(path = %path.display(), "state restored from snapshot");
    }
    script::fund(&mut ledger, &script)?;

    let reports = script::replay(&mut ledger, &script);
    for report in &reports {
        println!("{}", serde_json::to_string(report)?);
    }
    let summary = script::summarize(&ledger, &reports)?;
    println!("{}", serde_json::to_string(&summary)?);
    tracing::info!(
        calls = summary.calls,
        failed = summary.failed,
        hash = %summary.snapshot_hash,
        "replay finished"
    );

    if let Some(path) = snapshot_out {
        let snapshot = ledger.snapshot()?;
        std::fs::write(path, snapshot.to_bytes()?)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}

fn read_snapshot(path: &Path) -> anyhow::Result<LedgerSnapshot> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot = LedgerSnapshot::from_bytes(&bytes)?;
    if !snapshot.verify() {
        bail!("snapshot {} failed integrity check", path.display());
    }
    Ok(snapshot)
}
