//! Bomber - command-line front end
//!
//! Every command prints JSON on stdout; logs go to stderr.

use anyhow::{bail, Context};
use bomber::storage::config::{load_config, load_config_from};
use bomber::{BomberService, InMemoryAccounts};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

mod cli;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("loading configuration")?;

    tracing::debug!("Starting Bomber v{}", env!("CARGO_PKG_VERSION"));

    let accounts = InMemoryAccounts::from_config(&config.accounts);
    let mut service = BomberService::open(config, accounts)?;
    run(&mut service, &cli)
}

fn run(service: &mut BomberService<InMemoryAccounts>, cli: &Cli) -> anyhow::Result<()> {
    if let Commands::Leaderboard { limit, filter } = &cli.command {
        return print_json(&service.leaderboard(*limit, &filter.to_filter())?);
    }

    let user = resolve_user(service.accounts(), cli.user.as_deref())?;
    match &cli.command {
        Commands::Profile => print_json(&service.profile(user)?),
        Commands::Drive(args) => print_json(&service.submit_drive(user, &args.to_event())?),
        Commands::Rank { filter } => print_json(&service.rank(user, &filter.to_filter())?),
        Commands::Best { limit } => print_json(&service.personal_top(user, *limit)?),
        Commands::Achievements => print_json(&service.achievements(user)?),
        Commands::Venues => print_json(&service.venues(user)?),
        Commands::Chests => print_json(&service.chests(user)?),
        Commands::OpenChest { chest_id } => print_json(&service.open_chest(user, *chest_id)?),
        Commands::Challenge => print_json(&service.daily_challenge(user)?),
        Commands::Claim => print_json(&service.claim_daily_challenge(user)?),
        Commands::Equip { equipment_id } => print_json(&service.equip(user, equipment_id)?),
        Commands::Upgrade { equipment_id } => print_json(&service.upgrade(user, equipment_id)?),
        Commands::Leaderboard { .. } => Ok(()),
    }
}

/// Accept either a player id or a username.
fn resolve_user(accounts: &InMemoryAccounts, user: Option<&str>) -> anyhow::Result<Uuid> {
    let Some(user) = user else {
        bail!("--user is required for this command");
    };
    if let Ok(id) = Uuid::parse_str(user) {
        return Ok(id);
    }
    accounts
        .find_by_username(user)
        .with_context(|| format!("no account named '{}'", user))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
