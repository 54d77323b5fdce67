//! Commerce error types.

use thiserror::Error;

/// Errors raised while wiring up the storefront.
///
/// User-facing outcomes of cart and checkout operations have their own types
/// ([`CartNotice`](crate::cart::CartNotice),
/// [`CheckoutError`](crate::checkout::CheckoutError)); this enum covers
/// construction and configuration failures.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// HTTP client error.
    #[error("Fetch error: {0}")]
    Fetch(#[from] doorstep_data::FetchError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Observability(#[from] doorstep_observability::ObservabilityError),

    /// Configuration value is unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}
