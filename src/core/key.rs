//! Deterministic message ids.
//!
//! An id is the first [`KEY_LENGTH`] characters of the base64-encoded SHA-512
//! digest of the message text. Ids must stay identical across runs and
//! platforms, since catalogs are keyed by them.
//!
//! Collisions are possible and are not detected: two messages sharing a prefix
//! end up under the same catalog entry.

use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha512};

/// Number of base64 characters kept from the digest.
pub const KEY_LENGTH: usize = 6;

/// Generate the id for a source-language message.
///
/// # Examples
///
/// ```
/// use intl_extractor::core::generate_key;
///
/// assert_eq!(generate_key("Hey!"), "+YJVTi");
/// assert_eq!(generate_key("Hello!"), "OpKKos");
/// ```
pub fn generate_key(message: &str) -> String {
    let digest = Sha512::digest(message.as_bytes());
    let mut encoded = STANDARD.encode(digest);
    encoded.truncate(KEY_LENGTH);
    encoded
}
