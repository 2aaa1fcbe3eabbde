//! ID generation utilities for devhub
//!
//! Provides functions for generating identifiers for environments and
//! simulated messages.

use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Random lowercase base36 string of the given length
pub fn random_base36(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

/// Generate a unique environment ID
///
/// Format: `env_{timestamp_ms}_{9 base36 chars}`
/// Example: `env_1738300800123_k3j9x0qpa`
pub fn generate_env_id() -> String {
    format!("env_{}_{}", now_ms(), random_base36(9))
}

/// Generate a simulated message ID
///
/// Format: `msg-{timestamp_ms}-{9 base36 chars}`
pub fn generate_message_id() -> String {
    format!("msg-{}-{}", now_ms(), random_base36(9))
}

/// Generate a simulated lock token
///
/// Format: `lock-{16 base36 chars}`
pub fn generate_lock_token() -> String {
    format!("lock-{}", random_base36(16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_returns_reasonable_timestamp() {
        let ts = now_ms();
        assert!(ts > 1577836800000); // 2020-01-01
        assert!(ts < 4102444800000); // 2100-01-01
    }

    #[test]
    fn test_random_base36_charset() {
        let s = random_base36(64);
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_generate_env_id_format() {
        let id = generate_env_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "env");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 9);
    }

    #[test]
    fn test_generate_env_id_uniqueness() {
        assert_ne!(generate_env_id(), generate_env_id());
    }

    #[test]
    fn test_generate_message_id_format() {
        let id = generate_message_id();
        assert!(id.starts_with("msg-"));
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 9);
    }

    #[test]
    fn test_generate_lock_token_format() {
        let token = generate_lock_token();
        assert!(token.starts_with("lock-"));
        assert_eq!(token.len(), "lock-".len() + 16);
    }
}
