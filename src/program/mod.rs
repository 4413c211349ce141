//! On-chain program interaction module for the field authority interface.
//!
//! This module provides the codecs, address derivation, instruction builders,
//! and storage strategies for per-field update authorities on token metadata.

pub mod accounts;
#[cfg(feature = "solana-rpc")]
pub mod client;
pub mod constants;
pub mod error;
pub mod instructions;
pub mod migration;
pub mod pda;
pub mod space;
pub mod store;
pub mod tlv;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use accounts::{
    build_metadata_account_data, FieldAuthorityAccount, MetadataAccount, TokenMetadata,
    TokenMetadataExt,
};
#[cfg(feature = "solana-rpc")]
pub use client::FieldAuthorityClient;
pub use constants::*;
pub use error::{SdkError, SdkResult};
pub use instructions::*;
pub use migration::{plan_v1_to_v2, MigrationPlan};
pub use pda::*;
pub use space::*;
pub use store::{
    AccountSource, AuthorityStore, PdaAuthorityStore, StorageStrategy, TlvAuthorityStore,
};
pub use tlv::{
    append_entry, entry_len, find_entry, pack_entry, require_entry, LengthWidth, TlvEntries,
    TlvEntry, TlvLayout, TlvReader,
};
pub use types::*;
pub use utils::{decode_exact, decode_prefix, encode};
