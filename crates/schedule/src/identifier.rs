//! Child and record identifiers.
//!
//! Children are keyed by `CHR-XXXX-XXXX`, drawn from an alphabet without the
//! easily-confused characters 0/O, 1/I/L so identifiers can be read aloud.

use rand::Rng;

/// 31 characters, no 0, O, 1, I or L.
pub const ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";

const CHILD_PREFIX: &str = "CHR-";
const RECORD_PREFIX: &str = "VAC-";

fn random_chars<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Trim and uppercase, the form identifiers are stored and looked up in.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Checks the exact `CHR-XXXX-XXXX` shape. Does not normalize.
pub fn is_valid_identifier(id: &str) -> bool {
    let Some(rest) = id.strip_prefix(CHILD_PREFIX) else {
        return false;
    };
    let bytes = rest.as_bytes();
    bytes.len() == 9
        && bytes[4] == b'-'
        && bytes[..4].iter().chain(&bytes[5..]).all(|b| ALPHABET.contains(b))
}

pub fn generate_identifier_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let raw = random_chars(rng, 8);
    format!("{CHILD_PREFIX}{}-{}", &raw[..4], &raw[4..])
}

/// New child identifier. Uniqueness against existing children is the
/// caller's job.
pub fn generate_identifier() -> String {
    generate_identifier_with(&mut rand::thread_rng())
}

/// New vaccination record id, `VAC-XXXXXXXX`.
pub fn generate_record_id() -> String {
    format!("{RECORD_PREFIX}{}", random_chars(&mut rand::thread_rng(), 8))
}
