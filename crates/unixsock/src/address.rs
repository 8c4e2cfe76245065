//! Encoding and decoding of `sockaddr_un` addresses.
//!
//! Two address flavours are supported:
//!
//! - **Path-based**: the first byte is not NUL. The address names a file in
//!   the filesystem and is stored with an implicit NUL terminator.
//! - **Abstract** (Linux): the first byte is NUL. Every byte of the name is
//!   significant, embedded NULs included, and nothing appears in the
//!   filesystem.
//!
//! The free functions operate directly on `libc::sockaddr_un` so that
//! addresses produced by the kernel (e.g. from `recvfrom(2)`) can be decoded
//! without copying. [`SocketAddress`] bundles the structure with its
//! meaningful length.

use std::fmt;
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::error::{Error, Result};

/// Size in bytes of the `sun_family` field.
pub const FAMILY_LEN: usize = mem::size_of::<libc::sa_family_t>();

/// Capacity in bytes of the `sun_path` field.
pub const PATH_CAPACITY: usize = mem::size_of::<libc::sockaddr_un>() - FAMILY_LEN;

/// Size in bytes of a whole `sockaddr_un`.
pub const MAX_ADDRESS_LEN: usize = mem::size_of::<libc::sockaddr_un>();

/// A `sockaddr_un` with every byte cleared and the family left unset.
#[must_use]
pub fn empty_sockaddr() -> libc::sockaddr_un {
    libc::sockaddr_un {
        sun_family: 0,
        sun_path: [0; PATH_CAPACITY],
    }
}

/// Write `path` into `addr` and return the number of meaningful bytes,
/// family field included.
///
/// A leading NUL selects an abstract address and the bytes are copied
/// verbatim. Any other non-empty path gets a NUL terminator appended. When
/// the result would not fit in `sun_path`, zero is returned and the first
/// path byte is cleared.
pub fn set_address(path: &[u8], addr: &mut libc::sockaddr_un) -> usize {
    let mut size = path.len();
    if size != 0 && path[0] != 0 {
        size += 1;
    }
    addr.sun_family = libc::AF_UNIX as libc::sa_family_t;
    if size <= addr.sun_path.len() {
        let bytes = path.iter().copied().chain(std::iter::once(0));
        for (dst, src) in addr.sun_path.iter_mut().zip(bytes).take(size) {
            *dst = src as libc::c_char;
        }
        FAMILY_LEN + size
    } else {
        addr.sun_path[0] = 0;
        0
    }
}

/// True if `addr` is abstract, i.e. has no filesystem representation.
#[must_use]
pub fn is_abstract(addr: &libc::sockaddr_un) -> bool {
    addr.sun_path[0] == 0
}

/// Read the path back out of `addr`, given its meaningful length `len`.
///
/// Abstract addresses come back with their leading NUL. Any malformed input
/// (wrong family, `len` not covering at least one path byte, or `len` larger
/// than the structure) yields an empty vector.
#[must_use]
pub fn get_address(addr: &libc::sockaddr_un, len: usize) -> Vec<u8> {
    if len <= FAMILY_LEN
        || len > MAX_ADDRESS_LEN
        || addr.sun_family != libc::AF_UNIX as libc::sa_family_t
    {
        return Vec::new();
    }
    let limit = len - FAMILY_LEN;
    let path = &addr.sun_path[..limit];
    let size = if is_abstract(addr) {
        limit
    } else {
        path.iter().position(|&c| c == 0).unwrap_or(limit)
    };
    path[..size].iter().map(|&c| c as u8).collect()
}

/// A UNIX socket address together with its meaningful length.
///
/// A zero length marks an address that failed to encode; such an address
/// decodes to an empty path and is rejected by the kernel.
#[derive(Clone, Copy)]
pub struct SocketAddress {
    raw: libc::sockaddr_un,
    len: usize,
}

impl SocketAddress {
    /// Encode `path`. Oversized paths produce an address with zero length.
    pub fn new(path: impl AsRef<[u8]>) -> Self {
        let mut raw = empty_sockaddr();
        let len = set_address(path.as_ref(), &mut raw);
        Self { raw, len }
    }

    /// Encode `path`, failing if it does not fit in `sun_path`.
    pub fn try_new(path: impl AsRef<[u8]>) -> Result<Self> {
        let path = path.as_ref();
        let address = Self::new(path);
        if address.is_empty() {
            return Err(Error::AddressTooLong {
                len: path.len(),
                capacity: PATH_CAPACITY,
            });
        }
        Ok(address)
    }

    /// Encode a filesystem path.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::try_new(path.as_os_str().as_bytes())
    }

    /// Wrap a structure produced elsewhere, e.g. by `accept(2)`.
    ///
    /// `len` is clamped to the size of the structure.
    #[must_use]
    pub fn from_raw(raw: libc::sockaddr_un, len: usize) -> Self {
        Self {
            raw,
            len: len.min(MAX_ADDRESS_LEN),
        }
    }

    /// The decoded path; empty if the address is malformed or unnamed.
    #[must_use]
    pub fn path(&self) -> Vec<u8> {
        get_address(&self.raw, self.len)
    }

    /// Number of meaningful bytes, family field included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        is_abstract(&self.raw)
    }

    #[must_use]
    pub fn as_raw(&self) -> &libc::sockaddr_un {
        &self.raw
    }
}

impl PartialEq for SocketAddress {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self.raw.sun_family == other.raw.sun_family
            && self.path() == other.path()
    }
}

impl Eq for SocketAddress {}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path();
        match path.split_first() {
            None => f.write_str("(unnamed)"),
            Some((0, name)) => write!(f, "@{}", String::from_utf8_lossy(name)),
            Some(_) => f.write_str(&String::from_utf8_lossy(&path)),
        }
    }
}

impl fmt::Debug for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketAddress")
            .field("path", &self.to_string())
            .field("len", &self.len)
            .finish()
    }
}
