#![no_main]

use libfuzzer_sys::fuzz_target;
use unixsock::address::{FAMILY_LEN, MAX_ADDRESS_LEN, PATH_CAPACITY, empty_sockaddr};
use unixsock::{SocketAddress, get_address, is_abstract, set_address};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };

    // Encoding: anything that fits must decode back to its significant bytes.
    let mut addr = empty_sockaddr();
    let len = set_address(rest, &mut addr);
    if len == 0 {
        assert!(rest.len() >= PATH_CAPACITY);
        assert!(is_abstract(&addr));
    } else {
        assert!(len >= FAMILY_LEN && len <= MAX_ADDRESS_LEN);
        let decoded = get_address(&addr, len);
        match rest.first() {
            None => assert!(decoded.is_empty()),
            Some(0) => assert_eq!(decoded, rest),
            Some(_) => {
                let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
                assert_eq!(decoded, &rest[..end]);
            }
        }
    }

    // Decoding kernel-shaped input must never panic or overrun.
    let mut raw = empty_sockaddr();
    raw.sun_family = if selector & 1 == 0 {
        libc::AF_UNIX as libc::sa_family_t
    } else {
        libc::sa_family_t::from(selector)
    };
    for (dst, src) in raw.sun_path.iter_mut().zip(rest) {
        *dst = *src as libc::c_char;
    }
    let claimed = usize::from(selector) % (MAX_ADDRESS_LEN + 8);
    let decoded = get_address(&raw, claimed);
    assert!(decoded.len() <= PATH_CAPACITY);
    let _ = SocketAddress::from_raw(raw, claimed).to_string();
});
