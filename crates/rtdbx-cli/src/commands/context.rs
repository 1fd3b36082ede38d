//! Process configuration shared by every subcommand
//!
//! Flags fall back to `RTDBX_*` environment variables, and `.env` is loaded
//! before parsing.

use clap::{Args, ValueEnum};
use rtdbx_core::logging_facility::Profile;
use rtdbx_core::{RtdbClient, RxError, RxErrorKind};
use rtdbx_core_types::Sensitive;
use rtdbx_engine::config::parse_backup_ops;
use rtdbx_engine::{GuardConfig, WriteGuard};
use rtdbx_rest::RestClient;
use rtdbx_store::{AuditLedger, ResultCache, SnapshotStore, StoreConfig};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable logs on stderr
    Pretty,
    /// JSON logs on stderr
    Json,
    Off,
}

impl LogFormat {
    pub fn profile(self) -> Profile {
        match self {
            LogFormat::Pretty => Profile::Development,
            LogFormat::Json => Profile::Production,
            LogFormat::Off => Profile::Test,
        }
    }
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Database URL, e.g. https://<project>.firebaseio.com
    #[arg(long, global = true, env = "RTDBX_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Database secret or ID token sent as the `auth` parameter
    #[arg(long, global = true, env = "RTDBX_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Directory holding backups/, audit/ and cache/
    #[arg(long, global = true, env = "RTDBX_DATA_DIR", default_value = ".rtdbx")]
    pub data_dir: PathBuf,

    /// Comma-separated operations snapshotted before they run
    #[arg(long, global = true, env = "RTDBX_BACKUP_OPS")]
    pub backup_ops: Option<String>,

    /// Skip pre-write snapshots
    #[arg(long, global = true, env = "RTDBX_NO_BACKUP")]
    pub no_backup: bool,

    /// Skip audit ledger entries
    #[arg(long, global = true, env = "RTDBX_NO_AUDIT")]
    pub no_audit: bool,

    #[arg(long, global = true, env = "RTDBX_LOG", value_enum, default_value = "off")]
    pub log: LogFormat,
}

/// Resolved configuration for one invocation
pub struct Context {
    database_url: Option<String>,
    auth_token: Option<Sensitive<String>>,
    store: StoreConfig,
    backup_ops: Option<String>,
    no_backup: bool,
    no_audit: bool,
}

impl Context {
    pub fn new(args: GlobalArgs) -> Self {
        Self {
            database_url: args.database_url,
            auth_token: args.auth_token.map(Sensitive::new),
            store: StoreConfig::under(&args.data_dir),
            backup_ops: args.backup_ops,
            no_backup: args.no_backup,
            no_audit: args.no_audit,
        }
    }

    pub fn store_config(&self) -> &StoreConfig {
        &self.store
    }

    /// REST client for the configured database
    pub fn client(&self) -> Result<Arc<dyn RtdbClient>, RxError> {
        let url = self.database_url.as_deref().ok_or_else(|| {
            RxError::new(RxErrorKind::NotConfigured)
                .with_op("connect")
                .with_message("no database URL; pass --database-url or set RTDBX_DATABASE_URL")
        })?;
        let client = RestClient::new(url, self.auth_token.clone())?;
        Ok(Arc::new(client))
    }

    pub fn guard_config(&self) -> Result<GuardConfig, RxError> {
        let mut config = GuardConfig::default()
            .with_backup_enabled(!self.no_backup)
            .with_ledger_enabled(!self.no_audit);
        if let Some(list) = &self.backup_ops {
            config = config.with_backup_ops(parse_backup_ops(list)?);
        }
        Ok(config)
    }

    pub async fn snapshot_store(
        &self,
        client: Arc<dyn RtdbClient>,
    ) -> Result<SnapshotStore, RxError> {
        self.store.open_snapshot_store(client).await
    }

    pub async fn ledger(&self) -> Result<AuditLedger, RxError> {
        self.store.open_ledger().await
    }

    pub async fn cache(&self) -> Result<ResultCache, RxError> {
        self.store.open_cache().await
    }

    /// Write guard over the snapshot store and ledger under the data directory
    pub async fn guard(&self, client: Arc<dyn RtdbClient>) -> Result<WriteGuard, RxError> {
        let config = self.guard_config()?;
        let ledger = self.ledger().await?.with_enabled(config.ledger_enabled);
        let snapshots = self.snapshot_store(client).await?;
        Ok(WriteGuard::new(config)
            .with_snapshots(snapshots)
            .with_ledger(ledger))
    }
}
