#![forbid(unsafe_code)]
//! Operator CLI for a loyalty ledger kept in a local snapshot file

use clap::{Parser, Subcommand};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Color as TableColor;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use loyaltychain::account::AccountId;
use loyaltychain::config::{load_config, Config, DEFAULT_CONFIG_PATH};
use loyaltychain::error::ChainError;
use loyaltychain::ledger::{Ledger, Tier};
use loyaltychain::params::{Amount, BlockHeight};
use loyaltychain::snapshot::{FileSnapshotStore, SnapshotStore};
use loyaltychain::transaction::{CallEnvelope, LedgerCall};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "loyalty", version, about = "Loyalty-point ledger operator tool")]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Snapshot file, overriding snapshot.path from the config
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty ledger snapshot
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Populate the reward multipliers (admin, once)
    Initialize {
        #[arg(long)]
        caller: String,
    },
    /// Pause transfers and staking (admin)
    Pause {
        #[arg(long)]
        caller: String,
    },
    /// Lift a pause (admin)
    Resume {
        #[arg(long)]
        caller: String,
    },
    /// Mint new points (admin)
    Mint {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Amount,
    },
    Transfer {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Amount,
    },
    Stake {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        amount: Amount,
        /// Tier name or numeric code
        #[arg(long, value_parser = parse_tier_code)]
        tier: u64,
        /// Current block height; defaults to the last height the ledger saw
        #[arg(long)]
        height: Option<BlockHeight>,
    },
    Unstake {
        #[arg(long)]
        caller: String,
        #[arg(long)]
        amount: Amount,
        #[arg(long, value_parser = parse_tier_code)]
        tier: u64,
        #[arg(long)]
        height: Option<BlockHeight>,
    },
    /// Show an account's transferable balance
    Balance { account: String },
    /// Show an account's balance and per-tier stakes
    Account { account: String },
    /// Show ledger-wide figures
    Status,
    /// Apply a JSON array of call envelopes
    Replay {
        file: PathBuf,
        /// Report outcomes without saving
        #[arg(long)]
        dry_run: bool,
    },
}

fn parse_tier_code(s: &str) -> Result<u64, String> {
    match s.parse::<Tier>() {
        Ok(tier) => Ok(tier.code()),
        // Unknown numeric codes go through so the ledger can reject them.
        Err(_) => s.trim().parse::<u64>().map_err(|_| format!("unknown tier {:?}", s)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level()?)
        .with_target(false)
        .init();

    let snapshot_path = cli.snapshot.clone().unwrap_or_else(|| PathBuf::from(&config.snapshot.path));
    let store = FileSnapshotStore::new(&snapshot_path);

    if let Command::Init { force } = cli.command {
        return init_snapshot(&config, &store, force);
    }

    let params = config.ledger_params()?;
    let mut ledger = store.load_ledger(&params)?.ok_or_else(|| {
        eprintln!("{}", "No ledger snapshot found.".red().bold());
        eprintln!("{}", "💡 Run 'loyalty init' to create one".yellow());
        ChainError::SnapshotError(format!("missing snapshot at {}", snapshot_path.display()))
    })?;

    match cli.command {
        // Handled before the snapshot is loaded.
        Command::Init { .. } => {}
        Command::Initialize { caller } => {
            submit(&mut ledger, &store, &caller, None, LedgerCall::Initialize)?;
        }
        Command::Pause { caller } => {
            submit(&mut ledger, &store, &caller, None, LedgerCall::SetPaused { pause: true })?;
        }
        Command::Resume { caller } => {
            submit(&mut ledger, &store, &caller, None, LedgerCall::SetPaused { pause: false })?;
        }
        Command::Mint { caller, to, amount } => {
            let recipient = AccountId::parse(&to)?;
            submit(&mut ledger, &store, &caller, None, LedgerCall::Mint { recipient, amount })?;
        }
        Command::Transfer { caller, to, amount } => {
            let recipient = AccountId::parse(&to)?;
            submit(&mut ledger, &store, &caller, None, LedgerCall::Transfer { recipient, amount })?;
        }
        Command::Stake { caller, amount, tier, height } => {
            submit(&mut ledger, &store, &caller, height, LedgerCall::Stake { amount, tier })?;
        }
        Command::Unstake { caller, amount, tier, height } => {
            submit(&mut ledger, &store, &caller, height, LedgerCall::Unstake { amount, tier })?;
        }
        Command::Balance { account } => {
            let account = AccountId::parse(&account)?;
            println!("{} {}", format!("{}:", account).cyan(), ledger.get_balance(&account).to_string().bright_white().bold());
        }
        Command::Account { account } => print_account(&ledger, &AccountId::parse(&account)?),
        Command::Status => print_status(&ledger),
        Command::Replay { file, dry_run } => replay_file(&mut ledger, &store, &file, dry_run)?,
    }

    Ok(())
}

fn init_snapshot(config: &Config, store: &FileSnapshotStore, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if store.path().exists() && !force {
        eprintln!("{}", format!("Snapshot already exists at {}", store.path().display()).red());
        eprintln!("{}", "💡 Pass --force to overwrite it".yellow());
        return Err("refusing to overwrite existing snapshot".into());
    }
    let ledger = Ledger::with_params(config.admin()?, config.ledger_params()?)?;
    store.save(ledger.state())?;
    info!(path = %store.path().display(), admin = %ledger.admin(), "created ledger snapshot");
    println!("{}", "✅ Ledger created".bright_green().bold());
    println!("   admin:      {}", ledger.admin().to_string().bright_white());
    println!("   max supply: {}", ledger.max_supply().to_string().bright_white());
    Ok(())
}

fn submit(
    ledger: &mut Ledger,
    store: &FileSnapshotStore,
    caller: &str,
    height: Option<BlockHeight>,
    call: LedgerCall,
) -> Result<(), Box<dyn std::error::Error>> {
    let height = height.unwrap_or_else(|| ledger.block_height());
    let envelope = CallEnvelope::new(AccountId::parse(caller)?, height, call);
    match ledger.apply(&envelope) {
        Ok(value) => {
            store.save(ledger.state())?;
            println!(
                "{} {} → {}",
                "✅".green(),
                envelope.call.name().bright_white().bold(),
                value.to_string().green()
            );
            println!("   call: {}", envelope.hash_str().dimmed());
            Ok(())
        }
        Err(err) => {
            eprintln!("{} {} rejected: {} (code {})", "❌".red(), envelope.call.name().bold(), err.to_string().red(), err.code());
            Err(ChainError::from(err).into())
        }
    }
}

fn print_account(ledger: &Ledger, account: &AccountId) {
    let summary = ledger.account_summary(account);
    println!("{}", format!("📍 Account: {}", summary.account).cyan());
    println!("{}", format!("💰 Balance: {}", summary.balance).bright_white().bold());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Tier").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Staked").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Unlocks at").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("State").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
        ]);

    for position in &summary.stakes {
        let (label, color) = if position.staked == 0 {
            ("empty", TableColor::Grey)
        } else if ledger.block_height() < position.lockup_end {
            ("locked", TableColor::Yellow)
        } else {
            ("withdrawable", TableColor::Green)
        };
        table.add_row(vec![
            Cell::new(position.tier.name()).fg(TableColor::White),
            Cell::new(position.staked).fg(color),
            Cell::new(format!("#{}", position.lockup_end)).fg(TableColor::White),
            Cell::new(label).fg(color),
        ]);
    }
    println!("{}", table);
}

fn print_status(ledger: &Ledger) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Field").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Value").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
        ]);

    let state = ledger.state();
    let multipliers = Tier::ALL
        .iter()
        .map(|tier| match ledger.reward_multiplier(*tier) {
            Some(m) => format!("{}×{}", tier, m),
            None => format!("{}×-", tier),
        })
        .collect::<Vec<_>>()
        .join(" ");
    let root = state.state_root_hex().unwrap_or_else(|e| format!("<{}>", e));

    let rows: Vec<(&str, String)> = vec![
        ("admin", ledger.admin().to_string()),
        ("paused", ledger.is_paused().to_string()),
        ("initialized", ledger.is_initialized().to_string()),
        ("total supply", format!("{} / {}", ledger.total_supply(), ledger.max_supply())),
        ("circulating", state.sum_balances().to_string()),
        ("staked", state.sum_staked().to_string()),
        ("accounts", state.balances.len().to_string()),
        ("open locks", state.lockups.len().to_string()),
        ("reward multipliers", multipliers),
        ("block height", ledger.block_height().to_string()),
        ("state root", root),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field).fg(TableColor::White), Cell::new(value)]);
    }
    println!("{}", table);

    match ledger.check_invariants() {
        Ok(()) => println!("{}", "✅ Invariants hold".green()),
        Err(e) => println!("{}", format!("⚠️  {}", e).red().bold()),
    }
}

fn replay_file(
    ledger: &mut Ledger,
    store: &FileSnapshotStore,
    file: &Path,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(file).map_err(|e| format!("Failed to read {}: {}", file.display(), e))?;
    let envelopes: Vec<CallEnvelope> = serde_json::from_str(&contents).map_err(ChainError::from)?;

    let receipts = ledger.replay(&envelopes);
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Call").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Hash").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Outcome").fg(TableColor::Cyan).add_attribute(Attribute::Bold),
        ]);
    for (i, receipt) in receipts.iter().enumerate() {
        let (outcome, color) = match receipt.outcome {
            Ok(value) => (format!("ok ({})", value), TableColor::Green),
            Err(err) => (format!("{} ({})", err, err.code()), TableColor::Red),
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&receipt.call),
            Cell::new(&receipt.call_hash[..16]).fg(TableColor::Grey),
            Cell::new(outcome).fg(color),
        ]);
    }
    println!("{}", table);

    let applied = receipts.iter().filter(|r| r.is_success()).count();
    println!("{}", format!("{} of {} calls applied", applied, receipts.len()).bright_white().bold());

    if dry_run {
        println!("{}", "Dry run: snapshot left unchanged".yellow());
    } else {
        store.save(ledger.state())?;
    }
    Ok(())
}
