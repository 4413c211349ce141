//! # Field Authority Rust SDK
//!
//! A Rust SDK for per-field update authorities on TLV token metadata.
//!
//! ## Modules
//!
//! - [`program`]: Codecs, address derivation, instruction builders, and the
//!   V1 (per-field record) and V2 (packed list) storage strategies
//! - [`config`]: SDK configuration
//! - [`network`]: RPC URL constants
//! - [`shared`]: Shared serde helpers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use field_authority_sdk::prelude::*;
//! use solana_pubkey::Pubkey;
//!
//! let store = TlvAuthorityStore::new(program_id, metadata, update_authority);
//! let grant = FieldAuthority::new(Field::key("bio"), delegate);
//!
//! // Size the metadata account for the grant, then build the instruction
//! let required = store.space_after_add(&snapshot, &grant, &solana_rent::Rent::default())?;
//! let ixs = store.add(&grant)?;
//!
//! // The delegate may now rewrite the field
//! let ix = store.update_field(&delegate, &Field::key("bio"), "hello")?;
//! ```
//!
//! ## Reading State
//!
//! ```rust,ignore
//! use field_authority_sdk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> SdkResult<()> {
//!     let config = FieldAuthorityConfig::from_env()?;
//!     let client = FieldAuthorityClient::from_config(&config);
//!
//!     let authorities = client.get_field_authorities(&metadata).await?;
//!     println!("{:?}", authorities);
//!     Ok(())
//! }
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// On-chain program interaction module.
/// Contains the codecs, builders, and stores for the field authority interface.
pub mod program;

/// SDK configuration (program ID, RPC URL, metadata layout).
pub mod config;

/// Shared utilities used across SDK modules.
pub mod shared;

/// Network URL constants.
pub mod network;

// ============================================================================
// PRELUDE
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use field_authority_sdk::prelude::*;
/// ```
pub mod prelude {
    pub use crate::program::{
        // Types
        Field, FieldAuthorities, FieldAuthority,
        AddFieldAuthorityParams, FieldAuthorityV2Params, UpdateFieldParams,
        // Accounts
        FieldAuthorityAccount, MetadataAccount, TokenMetadata, TokenMetadataExt,
        // Errors
        SdkError, SdkResult,
        // TLV
        find_entry, require_entry, LengthWidth, TlvLayout, TlvReader,
        // PDA functions
        get_field_authority_pda, Pda,
        // Instructions
        FieldAuthorityInstruction,
        build_initialize_field_authorities_ix, build_add_field_authority_v2_ix,
        build_update_field_with_field_authority_v2_ix, build_remove_field_authority_v2_ix,
        build_add_field_authority_ix, build_update_field_with_field_authority_ix,
        build_remove_field_authority_ix, build_ensure_rent_ix,
        // Space
        size_of, rent_for, MinimumBalance, SpaceRent,
        // Stores
        AccountSource, AuthorityStore, PdaAuthorityStore, StorageStrategy, TlvAuthorityStore,
        plan_v1_to_v2, MigrationPlan,
        // Discriminators
        FIELD_AUTHORITIES_DISCRIMINATOR, TOKEN_METADATA_DISCRIMINATOR,
    };

    // Client (conditionally exported)
    #[cfg(feature = "solana-rpc")]
    pub use crate::program::FieldAuthorityClient;

    // Configuration
    pub use crate::config::{Commitment, FieldAuthorityConfig, FieldAuthorityConfigBuilder};

    // Network constants
    pub use crate::network::DEFAULT_RPC_URL;
}
