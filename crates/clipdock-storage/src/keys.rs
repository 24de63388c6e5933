use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;

const KEY_RANDOM_BYTES: usize = 32;

/// Builds an object key `{prefix}/{suffix}` where the suffix encodes 32
/// random bytes as unpadded URL-safe base64 (43 characters). Keys are not
/// checked for collisions; the space is large enough that two uploads never
/// meet.
pub fn generate_asset_key(prefix: &str) -> String {
    let mut raw = [0u8; KEY_RANDOM_BYTES];
    rand::rng().fill_bytes(&mut raw);
    format!("{}/{}", prefix, URL_SAFE_NO_PAD.encode(raw))
}
