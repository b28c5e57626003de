pub mod config_cmd;
pub mod interest;
pub mod matches;
pub mod request;
pub mod stats;

use crate::config::SwapConfig;
use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use swapmatch_core::{present, Participant, RedbStore, RequestKind, SwapEngine};

#[derive(Parser, Debug)]
#[command(name = "swapmatch")]
#[command(version, about = "Housing swap matching engine")]
pub struct Cli {
    /// Path to swapmatch.toml
    #[arg(
        long,
        global = true,
        env = "SWAPMATCH_CONFIG",
        default_value = "swapmatch.toml"
    )]
    pub config: PathBuf,

    /// Path to data directory (overrides config file)
    #[arg(long, global = true, env = "SWAPMATCH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Exchange request operations
    #[command(subcommand)]
    Request(RequestCommands),
    /// Match queries
    #[command(subcommand)]
    Matches(MatchCommands),
    /// Interest handshake operations
    #[command(subcommand)]
    Interest(InterestCommands),
    /// Store statistics
    Stats,
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// The participant a command acts as.
#[derive(Args, Debug, Clone)]
pub struct ActorArgs {
    /// Participant id
    #[arg(long = "as", value_name = "ID")]
    pub id: String,
    /// Display name recorded on new requests
    #[arg(long)]
    pub name: Option<String>,
    /// Contact recorded on new requests
    #[arg(long)]
    pub contact: Option<String>,
}

impl ActorArgs {
    pub fn participant(&self) -> Participant {
        Participant::new(
            self.id.clone(),
            self.name.clone().unwrap_or_else(|| self.id.clone()),
            self.contact.clone().unwrap_or_default(),
        )
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Preference,
    Cycle,
}

impl From<KindArg> for RequestKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Preference => RequestKind::Preference,
            KindArg::Cycle => RequestKind::Cycle,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum RequestCommands {
    /// Create the acting participant's request
    Create(RequestCreateArgs),
    /// Update fields of one of the acting participant's requests
    Update(RequestUpdateArgs),
    /// Delete one of the acting participant's requests
    Delete(RequestDeleteArgs),
    /// Show the acting participant's request
    Show(RequestShowArgs),
}

/// Request fields. Which are required depends on the kind.
#[derive(Args, Debug, Clone, Default)]
pub struct RequestFieldArgs {
    /// Resource currently held
    #[arg(long)]
    pub held: Option<String>,
    /// Sub-unit qualifier of the held resource
    #[arg(long)]
    pub detail: Option<String>,
    /// First choice (preference)
    #[arg(long)]
    pub first: Option<String>,
    /// Second choice (preference)
    #[arg(long)]
    pub second: Option<String>,
    /// Third choice (preference)
    #[arg(long)]
    pub third: Option<String>,
    /// Desired resource (cycle)
    #[arg(long)]
    pub desired: Option<String>,
}

#[derive(Args, Debug)]
pub struct RequestCreateArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    #[arg(long, value_enum)]
    pub kind: KindArg,
    #[command(flatten)]
    pub fields: RequestFieldArgs,
}

#[derive(Args, Debug)]
pub struct RequestUpdateArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    /// Request id
    pub id: String,
    #[command(flatten)]
    pub fields: RequestFieldArgs,
}

#[derive(Args, Debug)]
pub struct RequestDeleteArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    /// Request id
    pub id: String,
}

#[derive(Args, Debug)]
pub struct RequestShowArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    #[arg(long, value_enum)]
    pub kind: KindArg,
}

#[derive(Subcommand, Debug)]
pub enum MatchCommands {
    /// Preference matches for the acting participant
    Mutual(ActorArgs),
    /// Direct swaps, or three-way chains, for the acting participant
    Cycle(ActorArgs),
    /// Every mutual pair in the store
    All(MatchAllArgs),
}

#[derive(Args, Debug)]
pub struct MatchAllArgs {
    #[arg(long, value_enum, default_value = "preference")]
    pub kind: KindArg,
}

#[derive(Subcommand, Debug)]
pub enum InterestCommands {
    /// Express interest in another participant
    Express(InterestArgs),
    /// Withdraw a previously expressed interest
    Withdraw(InterestArgs),
    /// Answer another participant's interest
    Accept(InterestArgs),
    /// Remove both directions of interest
    Remove(InterestArgs),
    /// Show the handshake state with another participant
    State(InterestArgs),
}

#[derive(Args, Debug)]
pub struct InterestArgs {
    #[command(flatten)]
    pub actor: ActorArgs,
    /// The other participant's id
    pub other: String,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    Validate,
    Show,
}

/// Resolve configuration and open the store it names.
pub fn open_engine(cli: &Cli) -> Result<SwapEngine<RedbStore>> {
    let config = SwapConfig::load_or_default(&cli.config).with_data_dir(cli.data_dir.clone());
    let errors = config.validate();
    if !errors.is_empty() {
        anyhow::bail!("Invalid configuration: {}", errors.join("; "));
    }
    config.ensure_data_dir()?;

    tracing::debug!("Opening store at {}", config.db_path().display());
    let engine = SwapEngine::open(config.db_path(), config.engine_config())?;
    Ok(engine)
}

/// Print a view as pretty JSON with public ids.
pub fn print_json<T: Serialize + ?Sized>(view: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&present(view)?)?);
    Ok(())
}
