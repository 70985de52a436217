use thiserror::Error;

#[derive(Debug, Error)]
pub enum CfgError {
    #[error("confirmation_threshold must be at least 1")]
    ZeroThreshold,
    #[error("invalid arbiter config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbologyError {
    #[error("unknown barcode symbology `{0}`")]
    Unknown(String),
}
