//! `mpk` command line entry point.
//!
//! # Responsibility
//! - Run the HTTP API server.
//! - Offer operator commands over the same core services (import, list,
//!   set and show proposal members) against a database file.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use mpk_api::ApiConfig;
use mpk_core::db::open_db;
use mpk_core::{
    MemberFilter, MemberIdsInput, MemberService, MemberUpsertRow, ProposalService, RawMemberId,
    SqliteMemberRepository, SqliteProposalRepository,
};
use rusqlite::Connection;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mpk")]
#[command(about = "MPK member roster and proposal membership backend", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long = "db", env = "MPK_DB_PATH", default_value = "mpk.sqlite3", global = true)]
    db_path: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "MPK_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr when unset
    #[arg(long, env = "MPK_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API under /api
    Serve(ServeArgs),
    /// Bulk upsert members from a JSON array file of {name, org_unit?}
    ImportMembers {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Print members as JSON, ascending by name
    ListMembers {
        /// Case-insensitive name substring
        #[arg(long)]
        name: Option<String>,
        /// Case-insensitive org unit substring
        #[arg(long)]
        org_unit: Option<String>,
    },
    /// Replace the member set of a proposal
    SetMembers {
        /// Proposal id; created as a draft when unknown
        proposal_id: String,
        /// Member ids (decimal digits)
        member_ids: Vec<String>,
    },
    /// Print a proposal and its member ids as JSON
    ShowProposal {
        /// Proposal id
        proposal_id: String,
    },
    /// Print core linkage probe and version
    Version,
}

#[derive(Args)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Comma separated allowed CORS origins; any origin when unset
    #[arg(long = "cors-origin", env = "CORS_ORIGIN")]
    cors_origin: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Command::Version) {
        println!("mpk_core ping={}", mpk_core::ping());
        println!("mpk_core version={}", mpk_core::core_version());
        return Ok(());
    }

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| mpk_core::default_log_level().to_string());
    if let Command::Serve(args) = cli.command {
        // The server starts logging from its own config.
        return serve(cli.db_path, level, cli.log_dir, args);
    }

    let log_dir = cli
        .log_dir
        .as_deref()
        .map(|dir| dir.to_str().context("log dir must be valid UTF-8"))
        .transpose()?;
    mpk_core::init_logging(&level, log_dir).map_err(anyhow::Error::msg)?;

    match cli.command {
        Command::Serve(_) | Command::Version => Ok(()),
        Command::ImportMembers { file } => import_members(&open(&cli.db_path)?, &file),
        Command::ListMembers { name, org_unit } => {
            list_members(&open(&cli.db_path)?, MemberFilter { name, org_unit })
        }
        Command::SetMembers {
            proposal_id,
            member_ids,
        } => set_members(&mut open(&cli.db_path)?, &proposal_id, member_ids),
        Command::ShowProposal { proposal_id } => {
            show_proposal(&mut open(&cli.db_path)?, &proposal_id)
        }
    }
}

fn serve(
    db_path: PathBuf,
    log_level: String,
    log_dir: Option<PathBuf>,
    args: ServeArgs,
) -> Result<()> {
    let config = ApiConfig {
        listen_addr: SocketAddr::new(args.host, args.port),
        db_path,
        cors_origins: args
            .cors_origin
            .as_deref()
            .map(ApiConfig::parse_origins)
            .unwrap_or_default(),
        log_level,
        log_dir,
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(mpk_api::serve(config))?;
    Ok(())
}

fn open(db_path: &Path) -> Result<Connection> {
    open_db(db_path).with_context(|| format!("failed to open database `{}`", db_path.display()))
}

fn import_members(conn: &Connection, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read `{}`", file.display()))?;
    let rows: Vec<Option<MemberUpsertRow>> =
        serde_json::from_str(&text).context("member file must be a JSON array")?;
    let rows: Vec<MemberUpsertRow> = rows.into_iter().flatten().collect();

    let service = MemberService::new(SqliteMemberRepository::try_new(conn)?);
    let processed = service.bulk_upsert(&rows)?;
    println!("{}", serde_json::json!({ "added_or_updated": processed }));
    Ok(())
}

fn list_members(conn: &Connection, filter: MemberFilter) -> Result<()> {
    let service = MemberService::new(SqliteMemberRepository::try_new(conn)?);
    let members = service.list(&filter)?;
    println!("{}", serde_json::to_string_pretty(&members)?);
    Ok(())
}

fn set_members(conn: &mut Connection, proposal_id: &str, member_ids: Vec<String>) -> Result<()> {
    let input = MemberIdsInput::List(member_ids.into_iter().map(RawMemberId::Text).collect());
    let mut service = ProposalService::new(SqliteProposalRepository::try_new(conn)?);
    let outcome = service.set_members(proposal_id, &input)?;
    println!("{}", serde_json::json!({ "ok": true, "count": outcome.count }));
    Ok(())
}

fn show_proposal(conn: &mut Connection, proposal_id: &str) -> Result<()> {
    let service = ProposalService::new(SqliteProposalRepository::try_new(conn)?);
    let Some(found) = service.members_of(proposal_id)? else {
        bail!("proposal `{proposal_id}` not found");
    };
    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}
