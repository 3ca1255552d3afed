use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length, in hex characters, of generated request ids.
pub const REQUEST_ID_LEN: usize = 32;

/// Generate a correlation id from the current time, an optional
/// client-identifying hint (e.g. a forwarded-for address) and a random
/// suffix, hashed to a fixed-length hex token.
pub fn generate(client_hint: Option<&str>) -> String {
    let now = Utc::now();
    let mut seed = format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros());
    if let Some(hint) = client_hint {
        seed.push_str(hint);
    }
    let suffix: u16 = rand::thread_rng().gen_range(100..1000);
    seed.push_str(&format!("{}{}", Utc::now().timestamp_micros(), suffix));

    let digest = Sha256::digest(seed.as_bytes());
    let mut token = hex::encode(digest);
    token.truncate(REQUEST_ID_LEN);
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_fixed_length_hex() {
        for hint in [None, Some("10.0.0.1"), Some("")] {
            let id = generate(hint);
            assert_eq!(id.len(), REQUEST_ID_LEN);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn successive_tokens_differ() {
        let ids: std::collections::HashSet<_> = (0..32).map(|_| generate(Some("h"))).collect();
        assert!(ids.len() > 1);
    }
}
