//! Extension points invoked around the descriptor lifecycle.
//!
//! A [`UnixSocket`](crate::UnixSocket) only knows how to create an
//! `AF_UNIX` descriptor. What happens to it next (binding, connecting,
//! setting options) is decided by the [`SocketHooks`] implementation the
//! handle carries.

use std::io;
use std::os::fd::BorrowedFd;

use tracing::{debug, warn};

use crate::address::SocketAddress;
use crate::sys;

/// Callbacks run after a descriptor is created and before it is released.
pub trait SocketHooks {
    /// Prepare a freshly created descriptor for use.
    ///
    /// Returning an error vetoes the open: the descriptor is closed, the
    /// error's OS code is remembered, and further opens are throttled.
    fn on_open(&mut self, fd: BorrowedFd<'_>, address: &SocketAddress) -> io::Result<()> {
        let _ = (fd, address);
        Ok(())
    }

    /// Clean up before the descriptor is closed.
    fn on_close(&mut self, address: &SocketAddress) {
        let _ = address;
    }
}

/// Accepts every descriptor and does nothing on close.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl SocketHooks for NoHooks {}

/// Binds the descriptor to the handle's address.
///
/// For path-based addresses a stale socket file is removed before binding,
/// and the file is removed again when the socket closes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindHooks;

impl SocketHooks for BindHooks {
    fn on_open(&mut self, fd: BorrowedFd<'_>, address: &SocketAddress) -> io::Result<()> {
        if !address.is_abstract() {
            unlink(address);
        }
        sys::bind(fd, address)
    }

    fn on_close(&mut self, address: &SocketAddress) {
        if !address.is_abstract() {
            unlink(address);
        }
    }
}

/// Connects the descriptor to the handle's address.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectHooks;

impl SocketHooks for ConnectHooks {
    fn on_open(&mut self, fd: BorrowedFd<'_>, address: &SocketAddress) -> io::Result<()> {
        sys::connect(fd, address)
    }
}

fn unlink(address: &SocketAddress) {
    use std::os::unix::ffi::OsStrExt;

    let path = address.path();
    if path.is_empty() {
        return;
    }
    let path = std::path::Path::new(std::ffi::OsStr::from_bytes(&path));
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed unix socket file"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(path = %path.display(), error = %err, "failed to remove unix socket file"),
    }
}
