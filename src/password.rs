//! Salted, iterated SHA-256 password hashes.
//!
//! Stored as `sha256$<rounds>$<salt hex>$<digest hex>`.

use rand::Rng;
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const ROUNDS: u32 = 10_000;
const SALT_LEN: usize = 16;

fn stretch(password: &[u8], salt: &[u8], rounds: u32) -> [u8; 32] {
    let mut digest: [u8; 32] = Sha256::new()
        .chain_update(salt)
        .chain_update(password)
        .finalize()
        .into();
    for _ in 1..rounds {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(password)
            .finalize()
            .into();
    }
    digest
}

pub fn hash(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill(&mut salt);
    let digest = stretch(password.as_bytes(), &salt, ROUNDS);
    format!(
        "{SCHEME}${ROUNDS}${}${}",
        hex::encode(salt),
        hex::encode(digest)
    )
}

/// Well-formed hash that matches no password. Checked when a login names
/// an unknown user so both paths cost the same number of rounds.
const DUMMY_HASH: &str = concat!(
    "sha256$10000$",
    "00000000000000000000000000000000",
    "$",
    "0000000000000000000000000000000000000000000000000000000000000000"
);

struct Parsed {
    rounds: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

fn parse(stored: &str) -> Option<Parsed> {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(rounds), Some(salt), Some(digest), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return None;
    };
    let rounds = rounds.parse::<u32>().ok().filter(|rounds| *rounds > 0)?;
    let salt = hex::decode(salt).ok()?;
    let digest = hex::decode(digest).ok().filter(|digest| digest.len() == 32)?;
    Some(Parsed {
        rounds,
        salt,
        digest,
    })
}

/// Check `password` against a stored hash. Malformed hashes never verify.
pub fn verify(password: &str, stored: &str) -> bool {
    let Some(parsed) = parse(stored) else {
        return false;
    };
    let actual = stretch(password.as_bytes(), &parsed.salt, parsed.rounds);
    // constant time over the digest length
    actual
        .iter()
        .zip(parsed.digest.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Spend the same work as [`verify`] when there is no stored hash.
pub fn verify_missing(password: &str) {
    std::hint::black_box(verify(password, DUMMY_HASH));
}
