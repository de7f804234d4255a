/// Convenience result type used across voyagemap.
pub type VoyageResult<T> = Result<T, VoyageError>;

/// Top-level error taxonomy.
///
/// Every variant names the pipeline stage that failed so a CLI user can tell a bad input file
/// (`load`) from a bad row (`compose`), a rasterizer failure (`capture`) or an unwritable
/// destination (`export`).
#[derive(thiserror::Error, Debug)]
pub enum VoyageError {
    /// Invalid configuration or API misuse.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or unreadable input (track table, boundary, overlay, font).
    #[error("load error: {0}")]
    Load(String),

    /// Malformed data discovered while building a scene.
    #[error("compose error: {0}")]
    Compose(String),

    /// Failure while rasterizing a scene into a frame.
    #[error("capture error: {0}")]
    Capture(String),

    /// Failure while writing the finished frame sequence.
    #[error("export error: {0}")]
    Export(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VoyageError {
    /// Build a [`VoyageError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VoyageError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`VoyageError::Compose`] value.
    pub fn compose(msg: impl Into<String>) -> Self {
        Self::Compose(msg.into())
    }

    /// Build a [`VoyageError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`VoyageError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Prefix the message with `ctx`, keeping the stage.
    pub fn context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            Self::Validation(m) => Self::Validation(format!("{ctx}: {m}")),
            Self::Load(m) => Self::Load(format!("{ctx}: {m}")),
            Self::Compose(m) => Self::Compose(format!("{ctx}: {m}")),
            Self::Capture(m) => Self::Capture(format!("{ctx}: {m}")),
            Self::Export(m) => Self::Export(format!("{ctx}: {m}")),
            Self::Other(e) => Self::Other(e.context(ctx.to_string())),
        }
    }

    /// Short stage label (`"load"`, `"compose"`, ...) for diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Load(_) => "load",
            Self::Compose(_) => "compose",
            Self::Capture(_) => "capture",
            Self::Export(_) => "export",
            Self::Other(_) => "other",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
