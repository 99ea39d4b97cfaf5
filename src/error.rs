use crate::port::PortError;
use thiserror::Error;

/// A specialized `Result` type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors surfaced by the transport.
///
/// The driver's poll-timeout sentinel is never surfaced from a read; it is
/// consumed inside the transport and reported as an empty read instead.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The caller-set deadline had already elapsed; no I/O was attempted.
    #[error("request timed out")]
    RequestTimedOut,

    /// The serial driver reported a failure.
    #[error(transparent)]
    Port(#[from] PortError),
}

impl TransportError {
    /// True when the caller's deadline expired.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestTimedOut)
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Port(PortError::Io(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(TransportError::RequestTimedOut.to_string(), "request timed out");
        assert_eq!(
            TransportError::from(PortError::NotOpen).to_string(),
            "Port is not open"
        );
    }

    #[test]
    fn test_io_conversion() {
        let err: TransportError =
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, TransportError::Port(PortError::Io(_))));
        assert!(!err.is_timeout());
    }
}
