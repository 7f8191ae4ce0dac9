use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonetaryError {
    #[error("Monetary error: {0}")]
    InvalidFormat(String),
    #[error("Monetary error: value [{0}] has more than two decimal places")]
    TooPrecise(String),
    #[error("Monetary error: {0}")]
    Decimal(#[from] rust_decimal::Error)
}
