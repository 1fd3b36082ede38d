//! rtdbx CLI
//!
//! Command-line interface for a Firebase Realtime Database with
//! snapshot-before-write and an audit ledger

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "rtdbx")]
#[command(about = "rtdbx - guarded access to a Firebase Realtime Database", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: commands::context::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read the value at a path
    Get(commands::read::GetArgs),
    /// Ordered, ranged, limited children of a path
    Query(commands::read::QueryArgs),
    /// Replace the value at a path
    Put(commands::write::PutArgs),
    /// Replace named children of a path
    Patch(commands::write::PatchArgs),
    /// Remove the value at a path
    Delete(commands::write::DeleteArgs),
    /// Append a value under a generated key
    Push(commands::write::PushArgs),
    /// Import a snapshot document into the path it names
    Load(commands::write::LoadArgs),
    /// Audit ledger operations
    Audit(commands::audit::AuditArgs),
    /// Snapshot operations
    Backup(commands::backup::BackupArgs),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    rtdbx_core::logging_facility::init(cli.global.log.profile());

    let ctx = commands::context::Context::new(cli.global);
    let result = match cli.command {
        Commands::Get(args) => commands::read::execute_get(&ctx, args).await,
        Commands::Query(args) => commands::read::execute_query(&ctx, args).await,
        Commands::Put(args) => commands::write::execute_put(&ctx, args).await,
        Commands::Patch(args) => commands::write::execute_patch(&ctx, args).await,
        Commands::Delete(args) => commands::write::execute_delete(&ctx, args).await,
        Commands::Push(args) => commands::write::execute_push(&ctx, args).await,
        Commands::Load(args) => commands::write::execute_load(&ctx, args).await,
        Commands::Audit(args) => commands::audit::execute(&ctx, args).await,
        Commands::Backup(args) => commands::backup::execute(&ctx, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
