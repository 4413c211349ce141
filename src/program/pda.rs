//! PDA (Program Derived Address) derivation functions.
//!
//! V1 stores each field authority in its own record account derived from the
//! field and the metadata account.

use solana_pubkey::Pubkey;

use crate::program::constants::{FIELD_AUTHORITY_PDA_SEED, MAX_SEED_LEN};
use crate::program::error::{SdkError, SdkResult};
use crate::program::types::Field;

/// Get a V1 Field Authority record PDA.
///
/// Seeds: ["field-authority-pda", field seed string, metadata]
///
/// Fails with [`SdkError::SeedTooLong`] when the field seed exceeds 32 bytes
/// (a `Key` longer than 28 bytes).
pub fn get_field_authority_pda(
    field: &Field,
    metadata: &Pubkey,
    program_id: &Pubkey,
) -> SdkResult<(Pubkey, u8)> {
    let seed = field.to_seed();
    if seed.len() > MAX_SEED_LEN {
        let len = seed.len();
        return Err(SdkError::SeedTooLong { seed, len });
    }
    Pubkey::try_find_program_address(
        &[FIELD_AUTHORITY_PDA_SEED, seed.as_bytes(), metadata.as_ref()],
        program_id,
    )
    .ok_or(SdkError::NoViableBump)
}

/// Get the V1 record PDAs for several fields of one metadata account.
pub fn get_field_authority_pdas<'a>(
    fields: impl IntoIterator<Item = &'a Field>,
    metadata: &Pubkey,
    program_id: &Pubkey,
) -> SdkResult<Vec<(Pubkey, u8)>> {
    fields
        .into_iter()
        .map(|field| get_field_authority_pda(field, metadata, program_id))
        .collect()
}

/// Collection of all PDA derivation functions for convenient access.
pub struct Pda;

impl Pda {
    /// Get a V1 Field Authority record PDA.
    pub fn field_authority(
        field: &Field,
        metadata: &Pubkey,
        program_id: &Pubkey,
    ) -> SdkResult<(Pubkey, u8)> {
        get_field_authority_pda(field, metadata, program_id)
    }

    /// Get the V1 record PDAs for several fields.
    pub fn field_authorities<'a>(
        fields: impl IntoIterator<Item = &'a Field>,
        metadata: &Pubkey,
        program_id: &Pubkey,
    ) -> SdkResult<Vec<(Pubkey, u8)>> {
        get_field_authority_pdas(fields, metadata, program_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn test_program_id() -> Pubkey {
        Pubkey::from_str("EfRvELrn4b5aJRwddD1VUrqzsfm1pewBLPebq3iMPDp2").unwrap()
    }

    fn metadata() -> Pubkey {
        Pubkey::new_from_array([5u8; 32])
    }

    #[test]
    fn test_field_authority_pda_is_deterministic() {
        let program_id = test_program_id();
        let (pda1, bump1) =
            get_field_authority_pda(&Field::Name, &metadata(), &program_id).unwrap();
        let (pda2, bump2) =
            get_field_authority_pda(&Field::Name, &metadata(), &program_id).unwrap();

        assert_eq!(pda1, pda2);
        assert_eq!(bump1, bump2);
    }

    #[test]
    fn test_field_authority_pda_matches_manual_derivation() {
        let program_id = test_program_id();
        let (expected, bump) = Pubkey::find_program_address(
            &[b"field-authority-pda", b"key:bio", metadata().as_ref()],
            &program_id,
        );
        assert_eq!(
            get_field_authority_pda(&Field::key("bio"), &metadata(), &program_id).unwrap(),
            (expected, bump)
        );
    }

    #[test]
    fn test_different_fields_produce_different_pdas() {
        let program_id = test_program_id();
        let fields = [Field::Name, Field::Symbol, Field::Uri, Field::key("a"), Field::key("b")];
        let pdas = get_field_authority_pdas(&fields, &metadata(), &program_id).unwrap();

        for (i, a) in pdas.iter().enumerate() {
            for b in &pdas[i + 1..] {
                assert_ne!(a.0, b.0);
            }
        }
    }

    #[test]
    fn test_different_metadata_produce_different_pdas() {
        let program_id = test_program_id();
        let other = Pubkey::new_from_array([6u8; 32]);
        let (pda1, _) = get_field_authority_pda(&Field::Uri, &metadata(), &program_id).unwrap();
        let (pda2, _) = get_field_authority_pda(&Field::Uri, &other, &program_id).unwrap();

        assert_ne!(pda1, pda2);
    }

    #[test]
    fn test_seed_length_limit() {
        let program_id = test_program_id();
        // "key:" + 28 bytes is exactly 32
        let longest = Field::key("a".repeat(28));
        assert!(get_field_authority_pda(&longest, &metadata(), &program_id).is_ok());

        let err = get_field_authority_pda(&Field::key("a".repeat(29)), &metadata(), &program_id)
            .unwrap_err();
        assert!(matches!(err, SdkError::SeedTooLong { len: 33, .. }));
    }

    #[test]
    fn test_pda_struct_methods() {
        let program_id = test_program_id();

        // Verify Pda struct methods match the standalone functions
        assert_eq!(
            Pda::field_authority(&Field::Symbol, &metadata(), &program_id).unwrap(),
            get_field_authority_pda(&Field::Symbol, &metadata(), &program_id).unwrap()
        );
        assert_eq!(
            Pda::field_authorities([&Field::Name], &metadata(), &program_id)
                .unwrap()
                .len(),
            1
        );
    }
}
