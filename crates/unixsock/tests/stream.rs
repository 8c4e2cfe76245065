#![cfg(any(target_os = "linux", target_os = "android"))]

mod common;

use std::io::{Read, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::net::UnixListener;

use unixsock::{Config, Mode, SocketKind, UnixSocket};

use common::init_test_logging;

#[test]
fn stream_client_round_trip() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let mut client = UnixSocket::connect(path.as_os_str().as_bytes(), Mode::Blocking)
        .with_kind(SocketKind::Stream);
    assert_eq!(client.send(b"ping").unwrap(), 4);

    let (mut peer, _) = listener.accept().unwrap();
    let mut inbound = [0u8; 4];
    peer.read_exact(&mut inbound).unwrap();
    assert_eq!(&inbound, b"ping");

    peer.write_all(b"pong").unwrap();
    let mut buf = [0u8; 4];
    let n = client.recv(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"pong");
}

#[test]
fn stream_client_reconnects_after_broken_pipe() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let mut client = UnixSocket::connect(path.as_os_str().as_bytes(), Mode::Blocking)
        .with_kind(SocketKind::Stream);
    client.send(b"first").unwrap();
    let (peer, _) = listener.accept().unwrap();
    drop(peer);

    // Writing to a closed peer must surface an error, not raise SIGPIPE.
    let err = client.send(b"lost").unwrap_err();
    assert!(!err.is_would_block());
    assert!(!client.is_open());

    client.send(b"second").unwrap();
    assert!(client.is_open());
    let (mut peer, _) = listener.accept().unwrap();
    let mut inbound = [0u8; 6];
    peer.read_exact(&mut inbound).unwrap();
    assert_eq!(&inbound, b"second");
}

#[test]
fn orderly_shutdown_reads_zero_and_stays_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eof.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let mut client = UnixSocket::connect(path.as_os_str().as_bytes(), Mode::Blocking)
        .with_kind(SocketKind::Stream);
    client.fd().unwrap();
    let (peer, _) = listener.accept().unwrap();
    drop(peer);

    let mut buf = [0u8; 8];
    assert_eq!(client.recv(&mut buf).unwrap(), 0);
    assert!(client.is_open());
}

#[test]
fn config_selects_stream_kind() {
    let config = Config::from_toml_str(
        r#"
        [socket]
        kind = "stream"
        mode = "non_blocking"
        "#,
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configured.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let mut client = UnixSocket::from_config(
        path.as_os_str().as_bytes(),
        &config.socket,
        unixsock::ConnectHooks,
    );
    assert_eq!(client.kind(), SocketKind::Stream);
    client.fd().unwrap();
    let _peer = listener.accept().unwrap();

    let mut buf = [0u8; 8];
    let err = client.recv(&mut buf).unwrap_err();
    assert!(err.is_would_block());
    assert!(client.is_open());
}
