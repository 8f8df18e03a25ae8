use thiserror::Error;

/// Failure reported by a kernel.
///
/// `position` is the element of the primary input at which the failure was
/// detected, `attempt` is the offending value when there is one (for example
/// the index that fell out of range).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} in {kernel}{}{}",
    position.map(|p| format!(" at position {p}")).unwrap_or_default(),
    attempt.map(|a| format!(" (attempted {a})")).unwrap_or_default())]
pub struct KernelError {
    pub kernel: &'static str,
    pub message: &'static str,
    pub position: Option<usize>,
    pub attempt: Option<i64>,
}

impl KernelError {
    pub fn new(kernel: &'static str, message: &'static str) -> KernelError {
        KernelError {
            kernel,
            message,
            position: None,
            attempt: None,
        }
    }

    pub fn at(kernel: &'static str, message: &'static str, position: usize, attempt: i64) -> KernelError {
        KernelError {
            kernel,
            message,
            position: Some(position),
            attempt: Some(attempt),
        }
    }
}

pub type KernelResult<T = ()> = std::result::Result<T, KernelError>;
