//! Unpadded, lowercase RFC 4648 base32.

const ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// 0x1f
const MASK_SYMBOL: u32 = 0b1_1111;

/// Encodes `data` without padding.
///
/// ```
/// use tjson::base32;
///
/// assert_eq!(base32::encode(b"foo"), "mzxw6");
/// ```
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buf: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in data {
        buf = (buf << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buf >> bits) & MASK_SYMBOL) as usize] as char);
        }
        buf &= (1 << bits) - 1;
    }

    if bits > 0 {
        out.push(ALPHABET[((buf << (5 - bits)) & MASK_SYMBOL) as usize] as char);
    }

    out
}

fn symbol_value(c: u8) -> Option<u32> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as u32),
        b'2'..=b'7' => Some((c - b'2') as u32 + 26),
        _ => None,
    }
}

/// Decodes unpadded lowercase base32, returns `None` on any symbol outside the
/// alphabet, an impossible length, or non-zero trailing bits.
///
/// ```
/// use tjson::base32;
///
/// assert_eq!(base32::decode("mzxw6").unwrap(), b"foo");
/// assert!(base32::decode("MZXW6").is_none());
/// ```
pub fn decode(text: &str) -> Option<Vec<u8>> {
    // a final group of 1, 3 or 6 symbols cannot end on a byte boundary
    match text.len() % 8 {
        1 | 3 | 6 => return None,
        _ => {}
    }

    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buf: u32 = 0;
    let mut bits: u32 = 0;

    for c in text.bytes() {
        buf = (buf << 5) | symbol_value(c)?;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buf >> bits) as u8);
            buf &= (1 << bits) - 1;
        }
    }

    if buf != 0 {
        return None;
    }

    Some(out)
}
