//! Domain error types.

/// Failure to turn a rule description into a usable strategy.
///
/// Every variant is recovered at the top of the pipeline: a run with an
/// unparseable strategy yields an empty trade ledger and an error-carrying
/// report instead of propagating outward.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyParseError {
    #[error("unsupported rule type: {0}")]
    UnsupportedRuleType(String),

    #[error("missing required parameter '{param}' for {family}")]
    MissingParam {
        family: &'static str,
        param: &'static str,
    },

    #[error("invalid value for parameter '{param}' of {family}: {value}")]
    InvalidParam {
        family: &'static str,
        param: &'static str,
        value: String,
    },

    #[error("AI-powered parsing not implemented yet")]
    AiNotImplemented,

    #[error("unrecognized strategy rule format")]
    UnrecognizedFormat,
}

/// Top-level error type for stratsim.
#[derive(Debug, thiserror::Error)]
pub enum StratsimError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error(transparent)]
    StrategyParse(#[from] StrategyParseError),

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StratsimError> for std::process::ExitCode {
    fn from(err: &StratsimError) -> Self {
        let code: u8 = match err {
            StratsimError::Io(_) | StratsimError::Report { .. } => 1,
            StratsimError::ConfigParse { .. } | StratsimError::ConfigMissing { .. } => 2,
            StratsimError::Data { .. } => 3,
            StratsimError::StrategyParse(_) => 4,
        };
        std::process::ExitCode::from(code)
    }
}
