use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Directory walk failed: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("Invalid pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Worker task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Tag error: {0}")]
    TagError(#[from] lofty::error::LoftyError),

    #[error("ID3 error: {0}")]
    Id3Error(#[from] id3::Error),

    #[error("Sway IPC error: {0}")]
    SwayError(#[from] swayipc::Error),

    #[error("D-Bus error: {0}")]
    DbusError(#[from] zbus::Error),

    #[error("sway rejected '{command}': {message}")]
    IpcCommandError { command: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("Failed to spawn {program}: {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code:?}")]
    ProcessError {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Integrity check failed: {message}")]
    Mismatch { message: String },

    #[error("Failed to access {}: {message}", path.display())]
    SysfsError { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    System,
    External,
    Integrity,
}

impl ToolError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn mismatch(message: impl Into<String>) -> Self {
        Self::Mismatch {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::InvalidInput { .. } | Self::RegexError(_) => ErrorCategory::Input,
            Self::SpawnError { .. }
            | Self::ProcessError { .. }
            | Self::SwayError(_)
            | Self::IpcCommandError { .. }
            | Self::DbusError(_) => ErrorCategory::External,
            Self::Mismatch { .. }
            | Self::JsonError(_)
            | Self::TagError(_)
            | Self::Id3Error(_) => ErrorCategory::Integrity,
            Self::IoError(_)
            | Self::WalkError(_)
            | Self::JoinError(_)
            | Self::NotFound { .. }
            | Self::SysfsError { .. } => ErrorCategory::System,
        }
    }

    /// Process exit code reported by the launcher.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input => 1,
            ErrorCategory::System => 2,
            ErrorCategory::Configuration => 3,
            ErrorCategory::External => 4,
            ErrorCategory::Integrity => 5,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ProcessError {
                program,
                code,
                stderr,
            } => {
                let detail = stderr.lines().next().unwrap_or("").trim();
                match (code, detail.is_empty()) {
                    (Some(code), true) => format!("{} failed with exit code {}", program, code),
                    (Some(code), false) => {
                        format!("{} failed with exit code {}: {}", program, code, detail)
                    }
                    (None, _) => format!("{} was terminated by a signal", program),
                }
            }
            Self::SpawnError { program, .. } => format!("could not start {}", program),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::SpawnError { .. } => "Make sure the program is installed and in PATH",
            Self::ProcessError { .. } => "Check the output of the external program above",
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Check the TOML configuration file (see `tjtools config`)"
            }
            Self::InvalidInput { .. } => "Check the command line arguments (see --help)",
            Self::NotFound { .. } | Self::SysfsError { .. } => {
                "Check that the device exists and the paths in the configuration are correct"
            }
            Self::Mismatch { .. } => "The data may be corrupted; do not delete the source",
            Self::IoError(_) | Self::WalkError(_) => "Check file permissions and paths",
            Self::JsonError(_) => "The state file is malformed; recreate it",
            Self::TagError(_) | Self::Id3Error(_) => "The file's metadata could not be parsed",
            Self::IpcCommandError { .. } => "Check the output name in the [sway] configuration",
            Self::SwayError(_) => "Make sure sway is running and SWAYSOCK points to its socket",
            Self::DbusError(_) => "Make sure systemd-logind is reachable on the system bus",
            Self::RegexError(_) | Self::JoinError(_) => "This is likely a bug",
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
