//! Thin wrappers over the libc socket calls.
//!
//! Each wrapper issues exactly one syscall and maps a negative return to
//! `io::Error::last_os_error()`. Retrying is the caller's business.

use std::io;
use std::mem;
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd};

use crate::address::SocketAddress;
use crate::socket::{Mode, SocketKind};

fn cvt(result: libc::ssize_t) -> io::Result<usize> {
    if result < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(result as usize)
    }
}

fn cvt_unit(result: libc::c_int) -> io::Result<()> {
    if result < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

fn sockaddr_ptr(address: &SocketAddress) -> *const libc::sockaddr {
    (address.as_raw() as *const libc::sockaddr_un).cast()
}

fn socklen(address: &SocketAddress) -> libc::socklen_t {
    address.len() as libc::socklen_t
}

pub(crate) fn socket(kind: SocketKind, mode: Mode) -> io::Result<OwnedFd> {
    let mut ty = kind.as_raw() | libc::SOCK_CLOEXEC;
    if mode == Mode::NonBlocking {
        ty |= libc::SOCK_NONBLOCK;
    }
    // SAFETY: socket(2) takes no pointers.
    let fd = unsafe { libc::socket(libc::AF_UNIX, ty, 0) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: socket(2) just returned this descriptor and nothing else owns it.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

pub(crate) fn bind(fd: BorrowedFd<'_>, address: &SocketAddress) -> io::Result<()> {
    // SAFETY: `fd` is open for the borrow; the pointer refers to a live
    // sockaddr_un and the length never exceeds its size.
    cvt_unit(unsafe { libc::bind(fd.as_raw_fd(), sockaddr_ptr(address), socklen(address)) })
}

pub(crate) fn connect(fd: BorrowedFd<'_>, address: &SocketAddress) -> io::Result<()> {
    // SAFETY: as for bind.
    cvt_unit(unsafe { libc::connect(fd.as_raw_fd(), sockaddr_ptr(address), socklen(address)) })
}

pub(crate) fn send(fd: BorrowedFd<'_>, buf: &[u8]) -> io::Result<usize> {
    // SAFETY: `buf` is valid for reads of `buf.len()` bytes.
    cvt(unsafe {
        libc::send(
            fd.as_raw_fd(),
            buf.as_ptr().cast(),
            buf.len(),
            libc::MSG_NOSIGNAL,
        )
    })
}

pub(crate) fn send_to(fd: BorrowedFd<'_>, buf: &[u8], dest: &SocketAddress) -> io::Result<usize> {
    // SAFETY: `buf` is valid for reads of `buf.len()` bytes; `dest` points to
    // a live sockaddr_un whose length is clamped to its size.
    cvt(unsafe {
        libc::sendto(
            fd.as_raw_fd(),
            buf.as_ptr().cast(),
            buf.len(),
            libc::MSG_NOSIGNAL,
            sockaddr_ptr(dest),
            socklen(dest),
        )
    })
}

pub(crate) fn recv(fd: BorrowedFd<'_>, buf: &mut [u8]) -> io::Result<usize> {
    // SAFETY: `buf` is valid for writes of `buf.len()` bytes.
    cvt(unsafe { libc::recv(fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len(), 0) })
}

pub(crate) fn recv_from(fd: BorrowedFd<'_>, buf: &mut [u8]) -> io::Result<(usize, SocketAddress)> {
    let mut raw = crate::address::empty_sockaddr();
    let mut len = mem::size_of::<libc::sockaddr_un>() as libc::socklen_t;
    // SAFETY: `buf` is valid for writes of `buf.len()` bytes; `raw` is a
    // local sockaddr_un and `len` starts at its exact size, so the kernel
    // never writes past it.
    let received = cvt(unsafe {
        libc::recvfrom(
            fd.as_raw_fd(),
            buf.as_mut_ptr().cast(),
            buf.len(),
            0,
            (&mut raw as *mut libc::sockaddr_un).cast(),
            &mut len,
        )
    })?;
    Ok((received, SocketAddress::from_raw(raw, len as usize)))
}
