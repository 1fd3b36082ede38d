//! Audit ledger listing

use clap::{Args, Subcommand};
use rtdbx_core::OperationKind;
use rtdbx_store::AuditFilter;

use super::context::Context;
use super::{print_json, CliResult};

#[derive(Debug, Args)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub command: AuditCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// List ledger entries, newest first
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only entries for this operation
    #[arg(long)]
    pub op: Option<OperationKind>,

    /// Only entries at or beneath this path
    #[arg(long)]
    pub path: Option<String>,

    #[arg(long)]
    pub limit: Option<usize>,
}

pub async fn execute(ctx: &Context, args: AuditArgs) -> CliResult {
    match args.command {
        AuditCommand::List(list_args) => execute_list(ctx, list_args).await,
    }
}

async fn execute_list(ctx: &Context, args: ListArgs) -> CliResult {
    let ledger = ctx.ledger().await?;
    let filter = AuditFilter {
        operation: args.op,
        path_prefix: args.path,
        limit: args.limit,
    };
    let entries = ledger.list(&filter).await?;
    print_json(&entries)
}
