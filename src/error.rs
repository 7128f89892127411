use core::fmt;

/// Errors reported by the resampling core.
///
/// Every error is detected synchronously and returned to the immediate caller.
/// Nothing is retried and nothing is silently downgraded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResampleError {
    /// Source and destination modes differ, or the mode cannot be resampled.
    FormatMismatch,
    /// An argument was out of range, e.g. unequal heights or an unknown filter tag.
    ValueError(String),
    /// A scratch or intermediate buffer could not be obtained.
    AllocationFailure,
}

impl ResampleError {
    pub(crate) fn value(msg: impl Into<String>) -> Self {
        Self::ValueError(msg.into())
    }
}

impl fmt::Display for ResampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormatMismatch => write!(f, "unrecognized or mismatched image mode"),
            Self::ValueError(msg) => write!(f, "{msg}"),
            Self::AllocationFailure => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for ResampleError {}

pub type Result<T, E = ResampleError> = core::result::Result<T, E>;
