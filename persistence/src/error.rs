//! FILENAME: persistence/src/error.rs

use paradigm_engine::ParadigmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Engine(#[from] ParadigmError),
}
