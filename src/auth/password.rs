use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const SALT_LENGTH: usize = 32;
pub const HASH_LENGTH: usize = 32;

/// Stored as `pbkdf2-sha256$<iterations>$<salt>$<hash>`, both parts base64.
const SCHEME: &str = "pbkdf2-sha256";

/// Hash a password with a fresh random salt using PBKDF2-SHA256.
pub fn hash_password(password: &str) -> String {
    let salt = generate_salt();
    let hash = derive(password, &salt, PBKDF2_ITERATIONS);
    encode_hash(PBKDF2_ITERATIONS, &salt, &hash)
}

/// Check a password against a stored hash. Re-derives with the iteration
/// count recorded in the hash, so records written under an older cost
/// setting keep verifying. Any malformed stored value fails closed.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((iterations, salt, expected)) = decode_hash(stored) else {
        return false;
    };
    let candidate = derive(password, &salt, iterations);
    constant_time_eq(&candidate, &expected)
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut hash);
    hash
}

/// Generate a cryptographically random salt
fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

fn encode_hash(iterations: u32, salt: &[u8], hash: &[u8]) -> String {
    let engine = base64::engine::general_purpose::STANDARD;
    format!(
        "{SCHEME}${iterations}${}${}",
        engine.encode(salt),
        engine.encode(hash)
    )
}

fn decode_hash(stored: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let engine = base64::engine::general_purpose::STANDARD;
    let mut parts = stored.split('$');
    if parts.next()? != SCHEME {
        return None;
    }
    let iterations: u32 = parts.next()?.parse().ok()?;
    let salt = engine.decode(parts.next()?).ok()?;
    let hash = engine.decode(parts.next()?).ok()?;
    if parts.next().is_some() || iterations == 0 {
        return None;
    }
    Some((iterations, salt, hash))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low iteration count keeps the structural tests fast.
    const TEST_ITERATIONS: u32 = 1_000;

    fn cheap_hash(password: &str) -> String {
        let salt = generate_salt();
        let hash = derive(password, &salt, TEST_ITERATIONS);
        encode_hash(TEST_ITERATIONS, &salt, &hash)
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let stored = cheap_hash("ClinicSecret!42");
        assert!(verify_password("ClinicSecret!42", &stored));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let stored = cheap_hash("ClinicSecret!42");
        assert!(!verify_password("clinicsecret!42", &stored));
    }

    #[test]
    fn same_password_hashes_differently() {
        assert_ne!(cheap_hash("secret"), cheap_hash("secret"));
    }

    #[test]
    fn stored_format_carries_scheme_and_iterations() {
        let stored = cheap_hash("secret");
        let mut parts = stored.split('$');
        assert_eq!(parts.next(), Some("pbkdf2-sha256"));
        assert_eq!(parts.next(), Some("1000"));
        assert!(parts.next().is_some());
        assert!(parts.next().is_some());
        assert_eq!(parts.next(), None);
    }

    #[test]
    fn legacy_iteration_count_still_verifies() {
        let salt = [7u8; SALT_LENGTH];
        let hash = derive("secret", &salt, 500);
        let stored = encode_hash(500, &salt, &hash);
        assert!(verify_password("secret", &stored));
    }

    #[test]
    fn garbage_stored_values_fail_closed() {
        assert!(!verify_password("secret", ""));
        assert!(!verify_password("secret", "bcrypt$10$abc$def"));
        assert!(!verify_password("secret", "pbkdf2-sha256$notanumber$AA==$AA=="));
        assert!(!verify_password("secret", "pbkdf2-sha256$1000$!!!$AA=="));
        assert!(!verify_password("secret", "pbkdf2-sha256$0$AA==$AA=="));
    }

    #[test]
    fn production_cost_round_trip() {
        let stored = hash_password("ClinicSecret!42");
        assert!(stored.starts_with("pbkdf2-sha256$600000$"));
        assert!(verify_password("ClinicSecret!42", &stored));
    }
}
