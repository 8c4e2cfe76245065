//! A self-healing UNIX domain socket handle.
//!
//! [`UnixSocket`] owns at most one descriptor. It is opened lazily on first
//! use, closed whenever a transfer fails for a reason other than signal
//! interruption or would-block, and reopened by the next call. Repeated open
//! failures are throttled so that a missing peer is not hammered with
//! syscalls.
//!
//! What an open actually does beyond `socket(2)` is decided by the
//! [`SocketHooks`] the handle carries: [`BindHooks`] for the receiving end,
//! [`ConnectHooks`] for a client, [`NoHooks`] for an unbound socket that only
//! uses `send_to`.
//!
//! ```no_run
//! use unixsock::{Mode, UnixSocket};
//!
//! let mut server = UnixSocket::bind(b"\0example-service", Mode::Blocking);
//! let mut client = UnixSocket::connect(b"\0example-service", Mode::Blocking);
//!
//! server.fd()?;
//! client.send(b"ping")?;
//!
//! let mut buf = [0u8; 64];
//! let n = server.recv(&mut buf)?;
//! assert_eq!(&buf[..n], b"ping");
//! # Ok::<(), unixsock::Error>(())
//! ```
//!
//! ## Addresses
//!
//! Paths starting with a NUL byte are abstract (Linux only) and all of their
//! bytes are significant. Other paths name a filesystem entry. See the
//! [`address`] module for the codec.

#![cfg(any(target_os = "linux", target_os = "android"))]

pub mod address;
pub mod config;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod socket;
#[allow(unsafe_code)]
mod sys;

pub use address::{SocketAddress, get_address, is_abstract, set_address};
pub use config::{Config, SocketConfig};
pub use error::{Error, Result, Transfer};
pub use hooks::{BindHooks, ConnectHooks, NoHooks, SocketHooks};
pub use socket::{DEFAULT_OPEN_RETRY_INTERVAL, Mode, SocketKind, UnixSocket};
