use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TleError {
    #[error("line {line} is shorter than 69 characters")]
    LineTooShort { line: u8 },
    #[error("checksum mismatch on line {line}")]
    Checksum { line: u8 },
    #[error("unexpected line number marker on line {line}")]
    LineNumber { line: u8 },
    #[error("satellite number differs between line 1 and line 2")]
    CatalogMismatch,
    #[error("misplaced field on line {line}, column {column}")]
    Structure { line: u8, column: usize },
    #[error("ephemeris type field is not \" 0 \"")]
    EphemerisType,
    #[error("element set has already been converted to internal units")]
    AlreadyConverted,
}
