use base64::Engine;
use sha2::{Digest, Sha256};

pub const TOKEN_BYTES: usize = 32;

/// Generate an opaque URL-safe bearer token. Also used for e-mail
/// verification links, so no padding or reserved characters.
pub fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a token for storage. Only hashes touch the database, so a leaked
/// table cannot be replayed as credentials.
pub fn hash_token(token: &str) -> String {
    let hash = Sha256::digest(token.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(hash)
}
