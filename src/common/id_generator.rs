// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates prefixed, human-readable IDs (`U_K7NP3X`) and raw random strings
//! used as CSRF nonces and storage path salts.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Photo (P_)
    Photo,
    /// Journal entry (J_)
    JournalEntry,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Photo => "P",
            EntityPrefix::JournalEntry => "J",
        }
    }
}

/// Random Crockford Base32 string drawn from the thread-local CSPRNG
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CROCKFORD_ALPHABET[rng.gen_range(0..32)] as char)
        .collect()
}

/// Generate a prefixed ID in format "PREFIX_XXXXXX"
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

/// Generate a raw Crockford Base32 string without prefix.
/// Each character carries 5 bits of entropy.
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

pub fn generate_photo_id() -> String {
    generate_id(EntityPrefix::Photo)
}

pub fn generate_journal_entry_id() -> String {
    generate_id(EntityPrefix::JournalEntry)
}
