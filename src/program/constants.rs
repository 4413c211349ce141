//! Constants for the field authority interface.
//!
//! This module contains the seeds, discriminators, and size constants that
//! must match the external metadata program exactly.

use solana_pubkey::Pubkey;
use spl_discriminator::SplDiscriminate;
use spl_token_metadata_interface::state::TokenMetadata;

use crate::program::types::FieldAuthorities;

// ============================================================================
// Program IDs
// ============================================================================

/// System Program ID (allocator for V1 field authority records)
pub const SYSTEM_PROGRAM_ID: Pubkey = solana_sdk_ids::system_program::ID;

// ============================================================================
// Sizes
// ============================================================================

/// Width of every TLV and instruction discriminator.
pub const DISCRIMINATOR_LEN: usize = 8;
/// Width of the TLV length field inside a metadata account.
pub const TLV_LENGTH_LEN: usize = 4;
/// Discriminator plus length field.
pub const TLV_HEADER_LEN: usize = DISCRIMINATOR_LEN + TLV_LENGTH_LEN;
/// Raw address width.
pub const PUBKEY_LEN: usize = 32;
/// V1 field authority record size (a single authority address).
pub const FIELD_AUTHORITY_ACCOUNT_SIZE: usize = PUBKEY_LEN;
/// Upper bound on a single derivation seed.
pub const MAX_SEED_LEN: usize = 32;

// ============================================================================
// Field Tags
// ============================================================================

/// Variant tags of the encoded `Field` enum.
pub mod field_tag {
    pub const NAME: u8 = 0;
    pub const SYMBOL: u8 = 1;
    pub const URI: u8 = 2;
    pub const KEY: u8 = 3;
}

// ============================================================================
// PDA Seeds
// ============================================================================

/// V1 field authority record PDA seed
pub const FIELD_AUTHORITY_PDA_SEED: &[u8] = b"field-authority-pda";

/// Prefix of the seed string of an arbitrary `Key` field.
pub const KEY_SEED_PREFIX: &str = "key:";

// ============================================================================
// Discriminators
// ============================================================================

/// An 8-byte TLV or instruction discriminator.
pub type Discriminator = [u8; DISCRIMINATOR_LEN];

/// All-zero discriminator marking uninitialized TLV space.
pub const UNINITIALIZED_DISCRIMINATOR: Discriminator = [0u8; DISCRIMINATOR_LEN];

/// Discriminator of any [`SplDiscriminate`] type, as raw bytes.
pub fn discriminator_of<T: SplDiscriminate>() -> Discriminator {
    let mut discriminator = [0u8; DISCRIMINATOR_LEN];
    discriminator.copy_from_slice(T::SPL_DISCRIMINATOR_SLICE);
    discriminator
}

lazy_static::lazy_static! {
    /// TLV discriminator of the packed field authorities list
    pub static ref FIELD_AUTHORITIES_DISCRIMINATOR: Discriminator =
        discriminator_of::<FieldAuthorities>();

    /// TLV discriminator of the token metadata payload
    pub static ref TOKEN_METADATA_DISCRIMINATOR: Discriminator =
        discriminator_of::<TokenMetadata>();
}

/// Instruction discriminators (8-byte hash prefixes)
pub mod instruction {
    use spl_discriminator::SplDiscriminate;

    use super::{discriminator_of, Discriminator};

    #[derive(SplDiscriminate)]
    #[discriminator_hash_input("field_authority_interface:initialize_field_authorities")]
    pub struct InitializeFieldAuthorities;

    #[derive(SplDiscriminate)]
    #[discriminator_hash_input("field_authority_interface:add_field_authority")]
    pub struct AddFieldAuthority;

    #[derive(SplDiscriminate)]
    #[discriminator_hash_input("field_authority_interface:add_field_authority_v2")]
    pub struct AddFieldAuthorityV2;

    #[derive(SplDiscriminate)]
    #[discriminator_hash_input("field_authority_interface:update_field_with_field_authority")]
    pub struct UpdateFieldWithFieldAuthority;

    #[derive(SplDiscriminate)]
    #[discriminator_hash_input("field_authority_interface:update_field_with_field_authority_v2")]
    pub struct UpdateFieldWithFieldAuthorityV2;

    #[derive(SplDiscriminate)]
    #[discriminator_hash_input("field_authority_interface:remove_field_authority")]
    pub struct RemoveFieldAuthority;

    #[derive(SplDiscriminate)]
    #[discriminator_hash_input("field_authority_interface:remove_field_authority_v2")]
    pub struct RemoveFieldAuthorityV2;

    lazy_static::lazy_static! {
        pub static ref INITIALIZE_FIELD_AUTHORITIES: Discriminator =
            discriminator_of::<InitializeFieldAuthorities>();
        pub static ref ADD_FIELD_AUTHORITY: Discriminator =
            discriminator_of::<AddFieldAuthority>();
        pub static ref ADD_FIELD_AUTHORITY_V2: Discriminator =
            discriminator_of::<AddFieldAuthorityV2>();
        pub static ref UPDATE_FIELD_WITH_FIELD_AUTHORITY: Discriminator =
            discriminator_of::<UpdateFieldWithFieldAuthority>();
        pub static ref UPDATE_FIELD_WITH_FIELD_AUTHORITY_V2: Discriminator =
            discriminator_of::<UpdateFieldWithFieldAuthorityV2>();
        pub static ref REMOVE_FIELD_AUTHORITY: Discriminator =
            discriminator_of::<RemoveFieldAuthority>();
        pub static ref REMOVE_FIELD_AUTHORITY_V2: Discriminator =
            discriminator_of::<RemoveFieldAuthorityV2>();
    }
}
