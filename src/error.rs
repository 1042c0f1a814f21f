use crate::{
    config::ConfigError, logging::LoggingError, resource::ResourceError, server::ServerError,
};
use sysexits::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NasError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl NasError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            NasError::Resource(e) => match e {
                ResourceError::NotFound(_) => ExitCode::NoInput,
                ResourceError::Transport(_) => ExitCode::Unavailable,
                ResourceError::UnexpectedStatus { .. } => ExitCode::Protocol,
                ResourceError::TypeMismatch { .. } => ExitCode::Software,
                ResourceError::InvalidName(_) => ExitCode::DataErr,
            },
            NasError::Server(e) => match e {
                ServerError::InvalidConfig(_) => ExitCode::Config,
                ServerError::Client(_) => ExitCode::Software,
            },
            NasError::Config(e) => match e {
                ConfigError::Io { .. } => ExitCode::Config,
                ConfigError::Parse(_) => ExitCode::Config,
                ConfigError::Validation(_) => ExitCode::Config,
            },
            NasError::Logging(_) => ExitCode::Software,
            NasError::Io(_) => ExitCode::IoErr,
            NasError::Json(_) => ExitCode::Software,
        }
    }
}

impl std::process::Termination for NasError {
    fn report(self) -> std::process::ExitCode {
        let code = self.exit_code();
        if tracing::dispatcher::has_been_set() {
            tracing::error!(exit_code = u8::from(code), "{}", self);
        } else {
            // Configuration failed before logging was initialized.
            eprintln!("error: {}", self);
        }
        code.into()
    }
}
