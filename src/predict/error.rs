use thiserror::Error;

use crate::sgpsdp::TleError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("TLE directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE format in {file}: {message}")]
    InvalidTle { file: String, message: String },
    #[error("TLE error: {0}")]
    Tle(#[from] TleError),
    #[error("No satellites loaded")]
    NoSatellites,
    #[error("Satellite not found: {0}")]
    UnknownSatellite(String),
}
