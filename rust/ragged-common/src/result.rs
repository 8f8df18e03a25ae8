pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Returns `ErrorKind::InvalidArgument` from the enclosing function unless
/// `$cond` holds. The failed condition becomes the message.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $cond:expr) => {
        if !$cond {
            return Err($crate::error::Error::invalid_arg(
                stringify!($name),
                concat!("expected ", stringify!($cond)),
            ));
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn check_size(size: i64) -> super::Result<()> {
        verify_arg!(size, size >= 0);
        Ok(())
    }

    #[test]
    fn test_verify_arg() {
        assert!(check_size(3).is_ok());
        let err = check_size(-1).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidArgument { name, message } => {
                assert_eq!(name, "size");
                assert_eq!(message, "expected size >= 0");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }
}
