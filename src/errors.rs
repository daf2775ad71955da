use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for the image analysis client.
///
/// Each variant keeps the context of the step that failed (reading the source
/// image, talking to the vision service, drawing, writing results) so callers
/// can report it without parsing error strings.
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The service answered with a non-success status.
    #[error("Status code: {status}\nReason: {reason}\nMessage: {message}")]
    Http {
        status: u16,
        reason: String,
        message: String,
    },

    #[error("Transport error: {operation} failed")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Decode error: unexpected response document")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, VisionError>;

impl VisionError {
    /// Returns true when the error came from the service rejecting a request,
    /// as opposed to a local or transport failure.
    pub const fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}

/// Convert I/O errors to filesystem errors.
///
/// Code that knows the path and operation should build
/// `VisionError::FileSystem` directly; this is the fallback for `?`.
impl From<std::io::Error> for VisionError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

/// Convert image crate errors to image processing errors.
impl From<image::ImageError> for VisionError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}

impl From<reqwest::Error> for VisionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            operation: "http request".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for VisionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode { source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_renders_status_reason_and_message() {
        let err = VisionError::Http {
            status: 401,
            reason: "Unauthorized".to_string(),
            message: "Access denied due to invalid subscription key.".to_string(),
        };

        assert!(err.is_http());
        assert_eq!(
            err.to_string(),
            "Status code: 401\nReason: Unauthorized\nMessage: Access denied due to invalid subscription key."
        );
    }

    #[test]
    fn io_error_falls_back_to_unknown_path() {
        let err: VisionError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();

        assert!(!err.is_http());
        match err {
            VisionError::FileSystem {
                path, operation, ..
            } => {
                assert_eq!(path, PathBuf::from("unknown"));
                assert_eq!(operation, "unknown");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
