//! `gov-toolkit`: contract calls, transfers and batch payouts from the
//! command line.
//!
//! ```bash
//! gov-toolkit --config gt.toml call election getActiveVotesForValidator 0x44b3...
//! gov-toolkit --config gt.toml payout validators.csv voters.csv --layout validator --report out.json
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gt_01_numeric::{to_base_units, to_decimal};
use gt_05_ledger::LedgerLayout;
use gt_06_batch_payout::PayoutPlan;
use shared_types::{Address, BlockHeight};
use toolkit_runtime::commands::{self, Sent};
use toolkit_runtime::{init_logging, Toolkit, ToolkitConfig};
use tracing::{info, warn};

/// Client for the on-chain governance and staking contracts
#[derive(Parser, Debug)]
#[command(name = "gov-toolkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Log filter, overriding the configuration
    #[arg(long)]
    log_level: Option<String>,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a contract method
    Call {
        contract: String,
        method: String,
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
        /// Read state as of this block
        #[arg(long)]
        at_height: Option<BlockHeight>,
        /// Simulate the call as sent by this address
        #[arg(long)]
        from: Option<Address>,
    },
    /// Sign and submit a contract method
    Send {
        contract: String,
        method: String,
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
        /// Coins to attach
        #[arg(long, default_value = "0")]
        value: String,
        /// Return once broadcast
        #[arg(long)]
        no_wait: bool,
    },
    /// Show an address balance
    Balance {
        address: Address,
        #[arg(long)]
        at_height: Option<BlockHeight>,
    },
    /// Send coins to an address
    Transfer {
        to: Address,
        /// Amount in coins, e.g. 1.5
        amount: String,
        #[arg(long)]
        no_wait: bool,
    },
    /// Totals of one or more ledger files
    LedgerSummary {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// validator, validator-voters, voter or voter-decimal
        #[arg(long, default_value = "validator")]
        layout: LedgerLayout,
        /// Tally these addresses apart (adds to batch.excluded)
        #[arg(long)]
        exclude: Vec<Address>,
    },
    /// Compare validator voter totals with summed voter rows
    Reconcile {
        #[arg(long)]
        validators: PathBuf,
        #[arg(long)]
        voters: PathBuf,
        #[arg(long, default_value = "voter")]
        voter_layout: LedgerLayout,
    },
    /// Pay every destination of the ledger files
    Payout {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value = "validator")]
        layout: LedgerLayout,
        #[arg(long)]
        exclude: Vec<Address>,
        /// Earlier report; destinations settled or still unconfirmed there are not paid again
        #[arg(long)]
        settled: Option<PathBuf>,
        /// Write the report here as JSON
        #[arg(long)]
        report: Option<PathBuf>,
        /// Rehearse against a simulated node
        #[arg(long)]
        dry_run: bool,
    },
}

fn load_config(cli: &Cli) -> Result<ToolkitConfig> {
    let mut config = ToolkitConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.logging.json |= cli.json_logs;
    Ok(config)
}

fn print_sent(sent: &Sent) {
    println!("hash:  {}", sent.handle.hash);
    println!("nonce: {}", sent.handle.nonce);
    match &sent.outcome {
        Some(outcome) => println!("outcome: {outcome}"),
        None => println!("outcome: not awaited"),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.logging)?;

    let mut excluded: HashSet<Address> = config.batch.excluded_set();
    let toolkit = Toolkit::connect(config).context("building toolkit")?;

    match cli.command {
        Command::Call {
            contract,
            method,
            args,
            at_height,
            from,
        } => {
            let decoded = commands::call(&toolkit, &contract, &method, &args, at_height, from).await?;
            println!("{decoded}");
        }
        Command::Send {
            contract,
            method,
            args,
            value,
            no_wait,
        } => {
            let value = to_base_units(&value).context("--value")?;
            let sent = commands::send(&toolkit, &contract, &method, &args, value, !no_wait).await?;
            print_sent(&sent);
        }
        Command::Balance { address, at_height } => {
            let balance = commands::balance(&toolkit, address, at_height).await?;
            println!("{balance} ({} coins)", to_decimal(balance));
        }
        Command::Transfer { to, amount, no_wait } => {
            let amount = to_base_units(&amount).context("amount")?;
            let sent = commands::transfer(&toolkit, to, amount, !no_wait).await?;
            print_sent(&sent);
        }
        Command::LedgerSummary {
            files,
            layout,
            exclude,
        } => {
            excluded.extend(exclude);
            let summary = commands::ledger_summary(&files, &layout, &excluded)?;
            println!("{summary}");
        }
        Command::Reconcile {
            validators,
            voters,
            voter_layout,
        } => {
            let found = commands::reconcile_files(&validators, &voters, &voter_layout)?;
            if found.is_empty() {
                println!("ledgers agree");
                return Ok(ExitCode::SUCCESS);
            }
            for d in &found {
                let show = |v: Option<_>| v.map_or_else(|| "absent".to_string(), to_decimal);
                println!(
                    "{} validators={} voters={} diff={}",
                    d.address,
                    show(d.left),
                    show(d.right),
                    to_decimal(d.difference())
                );
            }
            return Ok(ExitCode::from(2));
        }
        Command::Payout {
            files,
            layout,
            exclude,
            settled,
            report,
            dry_run,
        } => {
            excluded.extend(exclude);
            let ledger = commands::load_aggregated(&files, &layout, &excluded)?;
            println!("{}", gt_05_ledger::LedgerSummary::of(&ledger));

            let mut plan = PayoutPlan::from_ledger(&ledger);
            if let Some(previous) = settled {
                let done = commands::settled_in(&previous)?;
                plan = plan.without(&done);
                info!(skipped = done.len(), remaining = plan.len(), "Resuming from earlier report");
            }

            let outcome = if dry_run {
                commands::dry_run(&toolkit, &plan).await?
            } else {
                let (stop_tx, stop) = tokio::sync::watch::channel(false);
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        warn!("Interrupted, finishing the current transfer");
                        let _ = stop_tx.send(true);
                    }
                });
                commands::payout(&toolkit, &plan, stop).await?
            };

            println!("{outcome}");
            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&outcome)?;
                std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            }
            if outcome.failed() > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
