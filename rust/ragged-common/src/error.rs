use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns `true` for out-of-bounds failures, both the plain kind and the
    /// one that records the node where the violation was detected.
    pub fn is_index_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NestedIndex { .. } | ErrorKind::Index { .. }
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn nested_index(
        node: impl Into<String>,
        index: impl Into<String>,
        details: Option<String>,
    ) -> Error {
        Error(
            ErrorKind::NestedIndex {
                node: node.into(),
                index: index.into(),
                details,
            }
            .into(),
        )
    }

    pub fn index(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Index {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn unsupported_selector(node: impl Into<String>, selector: impl Into<String>) -> Error {
        Error(
            ErrorKind::UnsupportedSelector {
                node: node.into(),
                selector: selector.into(),
            }
            .into(),
        )
    }

    pub fn kernel(
        kernel: impl Into<String>,
        message: impl Into<String>,
        position: Option<usize>,
    ) -> Error {
        Error(
            ErrorKind::Kernel {
                kernel: kernel.into(),
                message: message.into(),
                position,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    /// An out-of-bounds access, attributed to the node in the tree that
    /// detected it.
    #[error(
        "cannot slice {node} by {index}{}",
        details.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    NestedIndex {
        node: String,
        index: String,
        details: Option<String>,
    },

    #[error("index out of range: {message}")]
    Index { message: String },

    #[error("selector {selector} is not supported by {node}")]
    UnsupportedSelector { node: String, selector: String },

    #[error(
        "kernel {kernel} failed: {message}{}",
        position.map(|p| format!(" (at position {p})")).unwrap_or_default())]
    Kernel {
        kernel: String,
        message: String,
        position: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_index_display() {
        let err = Error::nested_index("<RegularArray len=2 size=3>", "2", None);
        assert_eq!(err.to_string(), "cannot slice <RegularArray len=2 size=3> by 2");
        assert!(err.is_index_error());

        let err = Error::nested_index("<EmptyArray>", "0", Some("array is empty".into()));
        assert_eq!(err.to_string(), "cannot slice <EmptyArray> by 0: array is empty");
    }

    #[test]
    fn test_kernel_display() {
        let err = Error::kernel("regular_getitem_next_at", "index out of range", Some(4));
        assert_eq!(
            err.to_string(),
            "kernel regular_getitem_next_at failed: index out of range (at position 4)"
        );
        assert!(!err.is_index_error());
        assert!(matches!(err.into_kind(), ErrorKind::Kernel { .. }));
    }
}
