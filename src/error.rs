//! Error types for the Nova renderer
//!
//! Only device-level failures surface as errors. Expected per-frame
//! conditions (missing shader, empty queue, batch overflow, disabled
//! pass) are absorbed where they occur and never reach this type.

use std::fmt;

/// Result type for Nova renderer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nova renderer errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (device lost, allocation failure, etc.)
    BackendError(String),

    /// Invalid resource (texture, buffer, shader, pipeline)
    InvalidResource(String),

    /// A mandatory pass requires a device capability that is absent
    /// (e.g. no swapchain command list to record into)
    CapabilityMissing(String),

    /// Initialization failed (renderer, targets, subsystems)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::CapabilityMissing(msg) => write!(f, "Capability missing: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error and construct an `Error::BackendError` from it.
///
/// # Example
///
/// ```
/// use nova_render::engine_err;
/// use nova_render::nova::Error;
///
/// let name = "scene_color_0";
/// let err = engine_err!("nova::SceneRenderer", "target '{}' lost", name);
/// assert!(matches!(err, Error::BackendError(_)));
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        $crate::engine_error!($source, $($arg)*);
        $crate::nova::Error::BackendError(format!($($arg)*))
    }};
}

/// Log an error and return it from the enclosing function.
///
/// # Example
///
/// ```
/// use nova_render::engine_bail;
/// use nova_render::nova::Result;
///
/// fn create_target(width: u32) -> Result<()> {
///     if width == 0 {
///         engine_bail!("nova::SceneRenderer", "zero-sized target");
///     }
///     Ok(())
/// }
///
/// assert!(create_target(0).is_err());
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
