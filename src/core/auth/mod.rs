use serde::{Deserialize, Serialize};
use uuid::Uuid;

const USERNAME_PREFIX: &str = "Player";

/// Offline identity passed to the game on launch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OfflineAccount {
    pub username: String,
    /// 32 lowercase hex digits, no hyphens.
    pub uuid: String,
}

impl OfflineAccount {
    /// A fresh `Player<NNNNN>` identity with a random uuid.
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4();
        // 10000..=99999
        let suffix = 10_000 + (uuid.as_u128() % 90_000) as u32;
        Self {
            username: format!("{USERNAME_PREFIX}{suffix}"),
            uuid: uuid.simple().to_string(),
        }
    }

    /// Use `username` when given, otherwise a generated one.
    pub fn with_username(username: Option<&str>) -> Self {
        let generated = Self::generate();
        match username.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => Self {
                username: name.to_string(),
                ..generated
            },
            None => generated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_identity_shape() {
        for _ in 0..50 {
            let account = OfflineAccount::generate();
            let digits = account.username.strip_prefix("Player").unwrap();
            let n: u32 = digits.parse().unwrap();
            assert!((10_000..=99_999).contains(&n));
            assert_eq!(account.uuid.len(), 32);
            assert!(account.uuid.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn configured_username_is_kept() {
        let account = OfflineAccount::with_username(Some("  Steve "));
        assert_eq!(account.username, "Steve");

        let blank = OfflineAccount::with_username(Some("   "));
        assert!(blank.username.starts_with("Player"));
    }
}
