/// Murmur Crypto Library
///
/// Password hashing for stored credentials: Argon2id, a fresh random salt per
/// record, and PHC-format strings so parameters travel with the hash.

pub mod password;

pub use password::{PasswordError, hash_password, verify_password};
