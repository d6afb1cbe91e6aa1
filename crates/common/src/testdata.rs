//! Random test data and date-of-birth formatting

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::DateOfBirth;

/// Characters a generated string may contain
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Prefix used when a caller has no preference
pub const DEFAULT_EMAIL_PREFIX: &str = "user";

/// Length used when a caller has no preference
pub const DEFAULT_STRING_LENGTH: usize = 8;

/// Exclusive upper bound of the number embedded in generated emails
const EMAIL_NUMBER_RANGE: u32 = 10_000;

/// Build a deterministic randomness source from a seed
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Generate `{prefix}{N}@example.com` with N drawn uniformly from `[0, 10000)`.
///
/// The prefix is used verbatim. Collisions are improbable, not impossible.
pub fn generate_random_email<R: Rng + ?Sized>(rng: &mut R, prefix: &str) -> String {
    let number = rng.gen_range(0..EMAIL_NUMBER_RANGE);
    format!("{prefix}{number}@example.com")
}

/// Generate a string of exactly `length` characters drawn from [`ALPHABET`]
pub fn generate_random_string<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}

/// Split a date into the day/month/year strings the signup form expects.
///
/// The day has no leading zero and the month is the full English name.
pub fn format_date_of_birth(date: NaiveDate) -> DateOfBirth {
    DateOfBirth {
        day: date.day().to_string(),
        month: date.format("%B").to_string(),
        year: date.year().to_string(),
    }
}
