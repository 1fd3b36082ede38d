//! Read commands: get and query

use clap::Args;
use rtdbx_core::{OrderBy, QueryOptions};
use rtdbx_engine::{apply_read_command, ReadCommand};

use super::context::Context;
use super::{parse_value, print_json, CliResult};

#[derive(Debug, Args)]
pub struct GetArgs {
    pub path: String,

    /// Summarize nested children as type and count
    #[arg(long, conflicts_with = "keys")]
    pub shallow: bool,

    /// Return only the child keys
    #[arg(long)]
    pub keys: bool,

    /// Always return the value inline, however large
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    pub path: String,

    /// `$key`, `$value`, or a child name
    #[arg(long)]
    pub order_by: Option<String>,

    /// Lower bound (JSON, or a bare string)
    #[arg(long)]
    pub start_at: Option<String>,

    /// Upper bound (JSON, or a bare string)
    #[arg(long)]
    pub end_at: Option<String>,

    /// Exact match (JSON, or a bare string)
    #[arg(long)]
    pub equal_to: Option<String>,

    #[arg(long, conflicts_with = "limit_to_last")]
    pub limit_to_first: Option<usize>,

    #[arg(long)]
    pub limit_to_last: Option<usize>,

    #[arg(long)]
    pub no_cache: bool,
}

impl QueryArgs {
    fn options(&self) -> QueryOptions {
        QueryOptions {
            order_by: self.order_by.as_deref().map(parse_order_by),
            start_at: self.start_at.as_deref().map(parse_value),
            end_at: self.end_at.as_deref().map(parse_value),
            equal_to: self.equal_to.as_deref().map(parse_value),
            limit_to_first: self.limit_to_first,
            limit_to_last: self.limit_to_last,
        }
    }
}

fn parse_order_by(raw: &str) -> OrderBy {
    match raw {
        "$key" => OrderBy::Key,
        "$value" => OrderBy::Value,
        child => OrderBy::Child(child.to_string()),
    }
}

pub async fn execute_get(ctx: &Context, args: GetArgs) -> CliResult {
    let client = ctx.client()?;
    let cmd = if args.keys {
        ReadCommand::Keys { path: args.path }
    } else {
        ReadCommand::Get {
            path: args.path,
            shallow: args.shallow,
        }
    };
    let cache = if args.no_cache {
        None
    } else {
        Some(ctx.cache().await?)
    };

    let result = apply_read_command(cmd, client.as_ref(), cache.as_ref()).await?;
    print_json(&result)
}

pub async fn execute_query(ctx: &Context, args: QueryArgs) -> CliResult {
    let client = ctx.client()?;
    let options = args.options();
    let cache = if args.no_cache {
        None
    } else {
        Some(ctx.cache().await?)
    };

    let cmd = ReadCommand::Query {
        path: args.path,
        options,
    };
    let result = apply_read_command(cmd, client.as_ref(), cache.as_ref()).await?;
    print_json(&result)
}
