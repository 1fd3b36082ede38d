use rtdbx_core_types::CorrelationId;

/// Result type alias using RxError
pub type Result<T> = std::result::Result<T, RxError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure raised by the write-safety layer and its collaborators is
/// classified by one of these kinds. Each kind maps to a stable error code
/// that callers (CLI, tests, routing layers) can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxErrorKind {
    // Lookup
    /// Missing snapshot file, missing ledger target, or nothing at a remote path
    NotFound,
    InvalidInput,

    // Write-safety
    /// Snapshot document without the reserved `_path` key
    MalformedSnapshot,
    /// A ledger line could not be parsed
    CorruptLedger,
    /// A snapshot store was used without a codec attached
    NotConfigured,
    /// Pre-write snapshot failed; logged and swallowed by the write guard
    BackupFailed,
    /// The guarded write itself failed
    ActionFailed,

    // Integration/IO
    Io,
    Serialization,
    ExternalService,

    // Internal
    Internal,
}

impl RxErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            RxErrorKind::NotFound => "ERR_NOT_FOUND",
            RxErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            RxErrorKind::MalformedSnapshot => "ERR_MALFORMED_SNAPSHOT",
            RxErrorKind::CorruptLedger => "ERR_CORRUPT_LEDGER",
            RxErrorKind::NotConfigured => "ERR_NOT_CONFIGURED",
            RxErrorKind::BackupFailed => "ERR_BACKUP_FAILED",
            RxErrorKind::ActionFailed => "ERR_ACTION_FAILED",
            RxErrorKind::Io => "ERR_IO",
            RxErrorKind::Serialization => "ERR_SERIALIZATION",
            RxErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            RxErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context (operation, RTDB path, file, correlation ID) for debugging.
#[derive(Debug, Clone)]
pub struct RxError {
    kind: RxErrorKind,
    op: Option<String>,
    path: Option<String>,
    file: Option<String>,
    correlation_id: Option<CorrelationId>,
    message: String,
    source: Option<Box<RxError>>,
}

impl RxError {
    /// Create a new error with the specified kind
    pub fn new(kind: RxErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            file: None,
            correlation_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Shorthand for a failed guarded write carrying only a message
    pub fn action_failed(message: impl Into<String>) -> Self {
        Self::new(RxErrorKind::ActionFailed).with_message(message)
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add RTDB path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add local file context
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Add correlation ID context
    pub fn with_correlation_id(mut self, id: CorrelationId) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: RxError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> RxErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the RTDB path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the file context, if any
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Get the correlation ID context, if any
    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        self.correlation_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&RxError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for RxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(file) = &self.file {
            write!(f, " (file: {})", file)?;
        }
        if let Some(id) = &self.correlation_id {
            write!(f, " (correlation_id: {})", id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<serde_json::Error> for RxError {
    fn from(err: serde_json::Error) -> Self {
        RxError::new(RxErrorKind::Serialization).with_message(err.to_string())
    }
}

// ========== End Error Facility ==========
