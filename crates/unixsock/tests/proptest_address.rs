//! Property-based tests for the `address` codec.
//!
//! Covers:
//! - Path-based addresses decode to exactly what was encoded
//! - Abstract names (embedded NULs included) survive encoding unchanged
//! - Oversized paths fail to encode
//! - Decoding rejects out-of-range lengths and foreign families

#![cfg(any(target_os = "linux", target_os = "android"))]

use proptest::prelude::*;
use unixsock::address::{FAMILY_LEN, MAX_ADDRESS_LEN, PATH_CAPACITY, empty_sockaddr};
use unixsock::{SocketAddress, get_address, is_abstract, set_address};

// =============================================================================
// Strategies
// =============================================================================

/// Non-empty path whose first byte is not NUL and that leaves room for the
/// terminator.
fn arb_path() -> impl Strategy<Value = Vec<u8>> {
    (1u8..=255, prop::collection::vec(1u8..=255, 0..PATH_CAPACITY - 1)).prop_map(
        |(first, mut rest)| {
            rest.insert(0, first);
            rest
        },
    )
}

/// Abstract name: leading NUL, arbitrary bytes after it.
fn arb_abstract_name() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..PATH_CAPACITY).prop_map(|mut rest| {
        rest.insert(0, 0);
        rest
    })
}

proptest! {
    #[test]
    fn path_round_trips(path in arb_path()) {
        let mut addr = empty_sockaddr();
        let len = set_address(&path, &mut addr);
        prop_assert_eq!(len, FAMILY_LEN + path.len() + 1);
        prop_assert!(!is_abstract(&addr));
        prop_assert_eq!(get_address(&addr, len), path);
    }

    #[test]
    fn abstract_round_trips(name in arb_abstract_name()) {
        let address = SocketAddress::new(&name);
        prop_assert_eq!(address.len(), FAMILY_LEN + name.len());
        prop_assert!(address.is_abstract());
        prop_assert_eq!(address.path(), name);
    }

    #[test]
    fn oversized_path_encodes_to_zero(
        extra in 0usize..64,
        fill in 1u8..=255,
    ) {
        let path = vec![fill; PATH_CAPACITY + extra];
        let mut addr = empty_sockaddr();
        prop_assert_eq!(set_address(&path, &mut addr), 0);
        prop_assert!(is_abstract(&addr));
    }

    #[test]
    fn decode_rejects_out_of_range_lengths(
        path in arb_path(),
        len in prop_oneof![0usize..=FAMILY_LEN, (MAX_ADDRESS_LEN + 1)..4096],
    ) {
        let mut addr = empty_sockaddr();
        set_address(&path, &mut addr);
        prop_assert!(get_address(&addr, len).is_empty());
    }

    #[test]
    fn decode_rejects_foreign_family(path in arb_path(), family in 0u16..64) {
        prop_assume!(family != libc::AF_UNIX as u16);
        let mut addr = empty_sockaddr();
        let len = set_address(&path, &mut addr);
        addr.sun_family = family as libc::sa_family_t;
        prop_assert!(get_address(&addr, len).is_empty());
    }

    #[test]
    fn truncated_length_yields_prefix(path in arb_path(), cut in 1usize..PATH_CAPACITY) {
        let mut addr = empty_sockaddr();
        let len = set_address(&path, &mut addr);
        let short = (FAMILY_LEN + cut).min(len);
        let decoded = get_address(&addr, short);
        prop_assert!(path.starts_with(&decoded));
    }
}

#[test]
fn concrete_abstract_service_name() {
    let mut addr = empty_sockaddr();
    let len = set_address(b"\0myservice", &mut addr);
    assert_eq!(len, FAMILY_LEN + 1 + "myservice".len());
    assert!(is_abstract(&addr));
    assert_eq!(get_address(&addr, len), b"\0myservice");
}

#[test]
fn concrete_tmp_path() {
    let mut addr = empty_sockaddr();
    let len = set_address(b"/tmp/sock", &mut addr);
    assert_eq!(len, FAMILY_LEN + "/tmp/sock".len() + 1);
    assert_eq!(get_address(&addr, len), b"/tmp/sock");
}
