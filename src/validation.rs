//! Text validators for the proxy address form.
//!
//! Both validators are pure predicates over the raw text a user typed. They
//! decide whether "save" is enabled and never raise.

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;
const MAX_PORT: &str = "65535";

/// Returns `true` if `s` is a dotted-quad IPv4 address or a hostname.
pub fn valid_host(s: &str) -> bool {
    valid_ipv4(s) || valid_hostname(s)
}

/// Returns `true` if `s` is a port number in `[0, 65535]` written with 1 to 5 digits.
///
/// The bound is checked on the digit shape: a five digit numeral is compared
/// digit by digit against `65535`, so `"65536"` and `"99999"` are rejected and
/// anything longer than five digits (e.g. `"00009050"`) never matches.
pub fn valid_port(s: &str) -> bool {
    if s.trim().is_empty() || s.len() > MAX_PORT.len() {
        return false;
    }

    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    // equal-length digit strings order the same way as their values
    s.len() < MAX_PORT.len() || s <= MAX_PORT
}

/// Returns `true` if `s` is four dot-separated octets in `[0, 255]`.
///
/// Octets are plain decimal: `0` is allowed, `01` is not.
pub fn valid_ipv4(s: &str) -> bool {
    let octets: Vec<&str> = s.split('.').collect();

    octets.len() == 4 && octets.iter().all(|octet| valid_octet(octet))
}

fn valid_octet(octet: &str) -> bool {
    let bytes = octet.as_bytes();

    match bytes {
        [] => false,
        [b'0'..=b'9'] => true,
        [b'1'..=b'9', b'0'..=b'9'] => true,
        [b'1', b'0'..=b'9', b'0'..=b'9'] => true,
        [b'2', b'0'..=b'4', b'0'..=b'9'] => true,
        [b'2', b'5', b'0'..=b'5'] => true,
        _ => false,
    }
}

/// Returns `true` if `s` is a dot-separated list of labels where every label is
/// alphanumeric with optional inner hyphens.
///
/// The last label must not be purely numeric, otherwise `256.1.1.1` would pass
/// as a name after failing as an address.
pub fn valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    let labels: Vec<&str> = s.split('.').collect();

    if !labels.iter().all(|label| valid_label(label)) {
        return false;
    }

    labels
        .last()
        .is_some_and(|last| !last.bytes().all(|b| b.is_ascii_digit()))
}

fn valid_label(label: &str) -> bool {
    let bytes = label.as_bytes();

    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };

    bytes.len() <= MAX_LABEL_LEN
        && first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
}
