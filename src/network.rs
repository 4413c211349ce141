//! Network URL constants for the field authority SDK.

/// Solana devnet RPC URL.
pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";

/// Solana mainnet-beta RPC URL.
pub const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Local validator RPC URL.
pub const LOCALNET_RPC_URL: &str = "http://127.0.0.1:8899";

/// Default RPC URL.
pub const DEFAULT_RPC_URL: &str = DEVNET_RPC_URL;
