//! Autoex Common Library
//!
//! Test data generation and the value records shared by the end-to-end flows.
//! Everything here is pure: randomness always comes from a caller-supplied
//! source so a run can be replayed from its seed.

pub mod testdata;
pub mod types;

pub use testdata::{
    format_date_of_birth, generate_random_email, generate_random_string, seeded_rng, ALPHABET,
    DEFAULT_EMAIL_PREFIX, DEFAULT_STRING_LENGTH,
};
pub use types::*;

/// Autoex version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
