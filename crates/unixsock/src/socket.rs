//! The self-healing socket handle.
//!
//! # Lifecycle
//!
//! ```text
//! construct ──► closed ──fd()/I/O──► open ──fatal I/O error / close()──► closed
//!                  ▲                                                        │
//!                  └────────────── next fd()/I/O reopens ───────────────────┘
//! ```
//!
//! A failed open is remembered together with its OS error code. Until the
//! retry interval has passed, further opens fail immediately with that code
//! and no syscall is made.

use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::address::SocketAddress;
use crate::config::SocketConfig;
use crate::error::{Error, Result, Transfer};
use crate::hooks::{BindHooks, ConnectHooks, NoHooks, SocketHooks};
use crate::sys;

/// Minimum time between open attempts after a failed one.
pub const DEFAULT_OPEN_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// I/O mode of the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Blocking,
    NonBlocking,
}

/// Socket type passed to `socket(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocketKind {
    #[default]
    Datagram,
    Stream,
}

impl SocketKind {
    pub(crate) fn as_raw(self) -> libc::c_int {
        match self {
            Self::Datagram => libc::SOCK_DGRAM,
            Self::Stream => libc::SOCK_STREAM,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FailedOpen {
    at: Instant,
    errno: i32,
}

/// A UNIX domain socket that opens its descriptor on demand and reopens it
/// after unrecoverable errors.
///
/// The handle is not thread-safe; share it behind a `Mutex`. The descriptor
/// returned by [`fd`](Self::fd) is only valid until the next call that may
/// close the socket.
#[derive(Debug)]
pub struct UnixSocket<H: SocketHooks = NoHooks> {
    fd: Option<OwnedFd>,
    address: SocketAddress,
    mode: Mode,
    kind: SocketKind,
    open_retry_interval: Duration,
    last_failed_open: Option<FailedOpen>,
    hooks: H,
}

impl UnixSocket<NoHooks> {
    /// A socket that only creates the descriptor, with no bind or connect.
    pub fn new(path: impl AsRef<[u8]>, mode: Mode) -> Self {
        Self::with_hooks(path, mode, NoHooks)
    }
}

impl UnixSocket<BindHooks> {
    /// A socket bound to `path` when it opens.
    pub fn bind(path: impl AsRef<[u8]>, mode: Mode) -> Self {
        Self::with_hooks(path, mode, BindHooks)
    }
}

impl UnixSocket<ConnectHooks> {
    /// A socket connected to `path` when it opens.
    pub fn connect(path: impl AsRef<[u8]>, mode: Mode) -> Self {
        Self::with_hooks(path, mode, ConnectHooks)
    }
}

impl<H: SocketHooks> UnixSocket<H> {
    pub fn with_hooks(path: impl AsRef<[u8]>, mode: Mode, hooks: H) -> Self {
        Self::from_address(SocketAddress::new(path), mode, hooks)
    }

    /// Build a handle around an address produced elsewhere.
    pub fn from_address(address: SocketAddress, mode: Mode, hooks: H) -> Self {
        Self {
            fd: None,
            address,
            mode,
            kind: SocketKind::default(),
            open_retry_interval: DEFAULT_OPEN_RETRY_INTERVAL,
            last_failed_open: None,
            hooks,
        }
    }

    pub fn from_config(path: impl AsRef<[u8]>, config: &SocketConfig, hooks: H) -> Self {
        Self::with_hooks(path, config.mode, hooks)
            .with_kind(config.kind)
            .with_open_retry_interval(config.open_retry_interval())
    }

    #[must_use]
    pub fn with_kind(mut self, kind: SocketKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_open_retry_interval(mut self, interval: Duration) -> Self {
        self.open_retry_interval = interval;
        self
    }

    /// The current descriptor, opening the socket if needed.
    pub fn fd(&mut self) -> Result<RawFd> {
        self.open_fd().map(|fd| fd.as_raw_fd())
    }

    pub fn is_open(&self) -> bool {
        self.fd.is_some()
    }

    /// Close the descriptor. Does nothing if the socket is already closed.
    pub fn close(&mut self) {
        if let Some(fd) = self.fd.take() {
            self.hooks.on_close(&self.address);
            debug!(fd = fd.as_raw_fd(), address = %self.address, "closing unix socket");
            drop(fd);
        }
    }

    /// Send on a connected socket.
    pub fn send(&mut self, buf: &[u8]) -> Result<usize> {
        self.transfer(Transfer::Send, |fd| sys::send(fd, buf))
    }

    pub fn send_to(&mut self, buf: &[u8], dest: &SocketAddress) -> Result<usize> {
        self.transfer(Transfer::SendTo, |fd| sys::send_to(fd, buf, dest))
    }

    pub fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.transfer(Transfer::Recv, |fd| sys::recv(fd, buf))
    }

    /// Receive a message and the address of its sender.
    ///
    /// An unbound sender yields an address that decodes to an empty path.
    pub fn recv_from(&mut self, buf: &mut [u8]) -> Result<(usize, SocketAddress)> {
        self.transfer(Transfer::RecvFrom, |fd| sys::recv_from(fd, buf))
    }

    pub fn address(&self) -> &SocketAddress {
        &self.address
    }

    pub fn is_abstract(&self) -> bool {
        self.address.is_abstract()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn kind(&self) -> SocketKind {
        self.kind
    }

    pub fn open_retry_interval(&self) -> Duration {
        self.open_retry_interval
    }

    /// The error of the last failed open, kept until an open succeeds.
    pub fn last_open_error(&self) -> Option<io::Error> {
        self.last_failed_open
            .map(|failed| io::Error::from_raw_os_error(failed.errno))
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    fn open_fd(&mut self) -> Result<BorrowedFd<'_>> {
        let fd = match self.fd.take() {
            Some(fd) => fd,
            None => self.open()?,
        };
        let fd: &OwnedFd = self.fd.insert(fd);
        Ok(fd.as_fd())
    }

    fn open(&mut self) -> Result<OwnedFd> {
        if let Some(failed) = self.last_failed_open {
            let elapsed = failed.at.elapsed();
            if elapsed < self.open_retry_interval {
                let remaining = self.open_retry_interval - elapsed;
                trace!(address = %self.address, ?remaining, "unix socket open throttled");
                return Err(Error::OpenThrottled {
                    remaining,
                    source: io::Error::from_raw_os_error(failed.errno),
                });
            }
        }

        match self.create() {
            Ok(fd) => {
                self.last_failed_open = None;
                debug!(fd = fd.as_raw_fd(), address = %self.address, "opened unix socket");
                Ok(fd)
            }
            Err(err) => {
                let errno = err.raw_os_error().unwrap_or(libc::EIO);
                self.last_failed_open = Some(FailedOpen {
                    at: Instant::now(),
                    errno,
                });
                debug!(address = %self.address, error = %err, errno, "failed to open unix socket");
                Err(err)
            }
        }
    }

    fn create(&mut self) -> Result<OwnedFd> {
        let fd = sys::socket(self.kind, self.mode).map_err(Error::Socket)?;
        self.hooks
            .on_open(fd.as_fd(), &self.address)
            .map_err(Error::OpenHook)?;
        Ok(fd)
    }

    /// Run `call` against the descriptor, retrying on EINTR.
    ///
    /// Errors other than would-block close the socket before being returned.
    fn transfer<T>(
        &mut self,
        op: Transfer,
        mut call: impl FnMut(BorrowedFd<'_>) -> io::Result<T>,
    ) -> Result<T> {
        let result = {
            let fd = self.open_fd()?;
            loop {
                match call(fd) {
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                        trace!(%op, "unix socket transfer interrupted, retrying");
                    }
                    other => break other,
                }
            }
        };

        result.map_err(|source| {
            if source.kind() != io::ErrorKind::WouldBlock {
                debug!(%op, address = %self.address, error = %source, "unix socket transfer failed");
                self.close();
            }
            Error::Transfer { op, source }
        })
    }
}

impl<H: SocketHooks> Drop for UnixSocket<H> {
    fn drop(&mut self) {
        self.close();
    }
}
