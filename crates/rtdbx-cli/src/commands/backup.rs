//! Snapshot creation, listing and restore

use clap::{Args, Subcommand};
use rtdbx_core::OperationKind;
use rtdbx_engine::WriteCommand;
use rtdbx_store::{SnapshotFilter, SnapshotStore};
use serde_json::json;

use super::context::Context;
use super::{print_json, write, CliResult};

#[derive(Debug, Args)]
pub struct BackupArgs {
    #[command(subcommand)]
    pub command: BackupCommand,
}

#[derive(Debug, Subcommand)]
pub enum BackupCommand {
    /// Snapshot a path now, outside any write
    Create(CreateArgs),
    /// List snapshots, newest first
    List(ListArgs),
    /// Replay a snapshot into the path it names
    Restore(RestoreArgs),
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    pub path: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only snapshots taken before this operation
    #[arg(long)]
    pub op: Option<OperationKind>,

    /// Only snapshots at or beneath this path
    #[arg(long)]
    pub path: Option<String>,
}

#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Snapshot file name as shown by `backup list`
    pub file: String,
}

pub async fn execute(ctx: &Context, args: BackupArgs) -> CliResult {
    match args.command {
        BackupCommand::Create(create_args) => execute_create(ctx, create_args).await,
        BackupCommand::List(list_args) => execute_list(ctx, list_args).await,
        BackupCommand::Restore(restore_args) => execute_restore(ctx, restore_args).await,
    }
}

async fn execute_create(ctx: &Context, args: CreateArgs) -> CliResult {
    let store = ctx.snapshot_store(ctx.client()?).await?;
    let file = store.backup(&args.path, None, None).await?;
    print_json(&json!({ "file": file.display().to_string(), "path": args.path }))
}

async fn execute_list(ctx: &Context, args: ListArgs) -> CliResult {
    // Listing decodes filenames only; no database connection is needed
    let store = SnapshotStore::open(&ctx.store_config().backup_dir, None)
        .await?
        .with_naming(ctx.store_config().naming());
    let filter = SnapshotFilter {
        operation: args.op,
        path: args.path,
    };
    print_json(&store.list(&filter).await?)
}

/// Restores are writes: they are snapshotted and audited as `load`
async fn execute_restore(ctx: &Context, args: RestoreArgs) -> CliResult {
    let file = ctx.store_config().backup_dir.join(&args.file);
    write::run(ctx, WriteCommand::Load { file }).await
}
