/// Convenience result type used across backdrop.
pub type BackdropResult<T> = Result<T, BackdropError>;

/// Top-level error taxonomy for the compositing pipeline and its collaborators.
///
/// Every failure surfaces as exactly one of these; the pipeline never returns partial output.
#[derive(thiserror::Error, Debug)]
pub enum BackdropError {
    /// A foreground or background could not be fetched or decoded.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// The background catalog has nothing to offer.
    #[error("empty background catalog")]
    EmptyCatalog,

    /// Zero-area raster, mismatched buffer length, or size overflow.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// No pixel rose above the visibility threshold.
    #[error("no visible content")]
    NoVisibleContent,

    /// Invalid user-provided options.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BackdropError {
    /// Build a [`BackdropError::SourceUnavailable`] value.
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    /// Build a [`BackdropError::InvalidDimensions`] value.
    pub fn invalid_dimensions(msg: impl Into<String>) -> Self {
        Self::InvalidDimensions(msg.into())
    }

    /// Build a [`BackdropError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
