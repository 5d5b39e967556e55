use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("unable to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The stream is in an unknown state relative to its handle and must not
    /// be used any further. Retrying the operation is never correct.
    #[error("{context}: {source}")]
    Fatal {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("cannot peek {requested} bytes with a buffer of {capacity} bytes")]
    BufferFull { requested: usize, capacity: usize },

    #[error("invalid whence value: {0}")]
    InvalidWhence(i32),

    #[error("cannot seek to negative offset {0} from start")]
    NegativeOffset(i64),
}

impl Error {
    /// Returns `true` for errors after which buffered state can no longer be
    /// trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(source)
            | Error::Open { source, .. }
            | Error::Fatal { source, .. } => source,
            Error::BufferFull { .. } => {
                io::Error::new(io::ErrorKind::Other, err)
            }
            Error::InvalidWhence(_) | Error::NegativeOffset(_) => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
        }
    }
}

/// Wraps an I/O failure that leaves the stream inconsistent, logging it on the way.
pub(crate) fn fatal(context: &'static str) -> impl FnOnce(io::Error) -> Error {
    move |source| {
        log::error!("{}: {}", context, source);
        Error::Fatal { context, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fatal_is_fatal() {
        let err = fatal("seeking in output")(io::Error::new(io::ErrorKind::Other, "revoked"));
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "seeking in output: revoked");

        assert!(!Error::InvalidWhence(7).is_fatal());
        assert!(!Error::Io(io::ErrorKind::UnexpectedEof.into()).is_fatal());
    }

    #[test]
    fn io_conversion_keeps_source_kind() {
        let err = fatal("reading input")(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
        assert_eq!(io::Error::from(err).kind(), io::ErrorKind::PermissionDenied);

        let err = Error::NegativeOffset(-3);
        assert_eq!(io::Error::from(err).kind(), io::ErrorKind::InvalidInput);
    }
}
