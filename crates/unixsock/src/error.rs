//! Error types for unixsock

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// The transfer primitive that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Send,
    SendTo,
    Recv,
    RecvFrom,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Send => "send",
            Self::SendTo => "sendto",
            Self::Recv => "recv",
            Self::RecvFrom => "recvfrom",
        })
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to create unix socket")]
    Socket(#[source] io::Error),

    #[error("open hook rejected unix socket")]
    OpenHook(#[source] io::Error),

    #[error("unix socket open throttled for another {remaining:?} after a failed attempt")]
    OpenThrottled {
        remaining: Duration,
        #[source]
        source: io::Error,
    },

    #[error("{op} on unix socket failed")]
    Transfer {
        op: Transfer,
        #[source]
        source: io::Error,
    },

    #[error("unix socket path of {len} bytes does not fit in {capacity} bytes")]
    AddressTooLong { len: usize, capacity: usize },

    #[error("failed to read config file {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl Error {
    /// The OS error code behind this error, if there is one.
    ///
    /// For a throttled open this is the code saved from the attempt that
    /// started the throttle window.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        self.io_error().and_then(io::Error::raw_os_error)
    }

    /// True for the recoverable would-block condition of non-blocking mode.
    #[must_use]
    pub fn is_would_block(&self) -> bool {
        matches!(
            self,
            Self::Transfer { source, .. } if source.kind() == io::ErrorKind::WouldBlock
        )
    }

    /// True if the socket could not be opened, throttled or not.
    #[must_use]
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            Self::Socket(_) | Self::OpenHook(_) | Self::OpenThrottled { .. }
        )
    }

    fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Socket(source)
            | Self::OpenHook(source)
            | Self::OpenThrottled { source, .. }
            | Self::Transfer { source, .. }
            | Self::ConfigRead { source, .. } => Some(source),
            Self::AddressTooLong { .. } | Self::ConfigParse(_) => None,
        }
    }
}
