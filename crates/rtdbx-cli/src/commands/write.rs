//! Write commands, each run under the write guard

use clap::Args;
use rtdbx_engine::{apply_write_command, WriteCommand};
use rtdbx_store::snapshot::{ProgressFn, RestoreProgress};
use std::path::PathBuf;

use super::context::Context;
use super::{parse_value, print_json, CliResult};

#[derive(Debug, Args)]
pub struct PutArgs {
    pub path: String,
    /// New value (JSON, or a bare string)
    pub value: String,
}

#[derive(Debug, Args)]
pub struct PatchArgs {
    pub path: String,
    /// JSON object of children to replace
    pub values: String,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub path: String,
}

#[derive(Debug, Args)]
pub struct PushArgs {
    pub path: String,
    /// Value to append (JSON, or a bare string)
    pub value: String,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Snapshot document to import
    pub file: PathBuf,
}

/// Restore progress on stderr, one line per chunk
pub fn report_progress(progress: &RestoreProgress) {
    eprintln!(
        "restored {}/{} ({})",
        progress.index, progress.total, progress.key
    );
}

pub(crate) async fn run(ctx: &Context, cmd: WriteCommand) -> CliResult {
    let client = ctx.client()?;
    let guard = ctx.guard(client.clone()).await?;
    let observer: &ProgressFn = &report_progress;

    let outcome = apply_write_command(cmd, &client, &guard, Some(observer)).await?;
    print_json(&outcome)
}

pub async fn execute_put(ctx: &Context, args: PutArgs) -> CliResult {
    let cmd = WriteCommand::Put {
        path: args.path,
        value: parse_value(&args.value),
    };
    run(ctx, cmd).await
}

pub async fn execute_patch(ctx: &Context, args: PatchArgs) -> CliResult {
    let values = match parse_value(&args.values) {
        serde_json::Value::Object(values) => values,
        _ => return Err("patch values must be a JSON object".into()),
    };
    let cmd = WriteCommand::Patch {
        path: args.path,
        values,
    };
    run(ctx, cmd).await
}

pub async fn execute_delete(ctx: &Context, args: DeleteArgs) -> CliResult {
    run(ctx, WriteCommand::Delete { path: args.path }).await
}

pub async fn execute_push(ctx: &Context, args: PushArgs) -> CliResult {
    let cmd = WriteCommand::Push {
        path: args.path,
        value: parse_value(&args.value),
    };
    run(ctx, cmd).await
}

pub async fn execute_load(ctx: &Context, args: LoadArgs) -> CliResult {
    run(ctx, WriteCommand::Load { file: args.file }).await
}
