use thiserror::Error;

use crate::loader::LoadError;
use crate::output::OutputError;

#[derive(Error, Debug)]
pub enum PermcheckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

pub type Result<T> = std::result::Result<T, PermcheckError>;
