//! Custom serde helpers for configuration and JSON fixtures.

/// Serializes a `Pubkey` as its base58 string instead of a byte array.
pub mod pubkey_str {
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer};
    use solana_pubkey::Pubkey;

    pub fn serialize<S>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(pubkey)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pubkey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s)
            .map_err(|e| serde::de::Error::custom(format!("Invalid pubkey {}: {}", s, e)))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use solana_pubkey::Pubkey;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super::pubkey_str")]
        key: Pubkey,
    }

    #[test]
    fn test_pubkey_str_round_trip() {
        let w = Wrapper {
            key: Pubkey::new_from_array([3u8; 32]),
        };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, format!("{{\"key\":\"{}\"}}", w.key));
        assert_eq!(serde_json::from_str::<Wrapper>(&json).unwrap(), w);
    }

    #[test]
    fn test_pubkey_str_rejects_garbage() {
        assert!(serde_json::from_str::<Wrapper>("{\"key\":\"not-a-key\"}").is_err());
    }
}
