//! V1 → V2 migration planning.
//!
//! Reads the V1 records a [`PdaAuthorityStore`] tracks and plans the
//! instructions that carry them into the packed list of a
//! [`TlvAuthorityStore`], then close the records.

use solana_instruction::Instruction;

use crate::program::accounts::MetadataAccount;
use crate::program::error::{SdkError, SdkResult};
use crate::program::space::{rent_for, size_of_in, MinimumBalance, SpaceRent};
use crate::program::store::{AccountSource, AuthorityStore, PdaAuthorityStore, TlvAuthorityStore};
use crate::program::types::FieldAuthorities;

/// Instructions and sizing for moving one metadata account from V1 to V2.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    /// Authorities read from the V1 records
    pub authorities: FieldAuthorities,
    /// Initialize the list, or idempotent adds into an existing list
    pub instructions: Vec<Instruction>,
    /// V1 record removals, to run after `instructions` succeed
    pub removals: Vec<Instruction>,
    /// Space and funding the metadata account needs afterwards
    pub required: SpaceRent,
    /// Current metadata account length
    pub current_len: usize,
}

impl MigrationPlan {
    /// Whether the metadata account must grow before the list is written.
    pub fn needs_realloc(&self) -> bool {
        self.required.space > self.current_len
    }

    /// Whether there is nothing to migrate.
    pub fn is_empty(&self) -> bool {
        self.authorities.is_empty()
    }
}

/// Plan moving `v1`'s records into `v2`'s packed list.
///
/// Authorities already in the list are skipped. Both stores must target the
/// same metadata account.
pub fn plan_v1_to_v2(
    v1: &PdaAuthorityStore,
    v2: &TlvAuthorityStore,
    source: &dyn AccountSource,
    rent: &impl MinimumBalance,
) -> SdkResult<MigrationPlan> {
    if v1.metadata != v2.metadata {
        return Err(SdkError::Config(format!(
            "V1 store targets {} but V2 store targets {}",
            v1.metadata, v2.metadata
        )));
    }

    let authorities = v1.list(source)?;
    let data = source
        .account_data(&v2.metadata)
        .ok_or_else(|| SdkError::NotFound(format!("metadata account {}", v2.metadata)))?;
    let account = MetadataAccount::new(data, v2.layout);
    let token_metadata = account.token_metadata()?;
    let existing = account.try_field_authorities()?;

    let (instructions, merged) = match existing {
        None => (vec![v2.initialize(&authorities)?], authorities.clone()),
        Some(mut list) => {
            let adder = v2.clone().with_idempotent(true);
            let mut instructions = Vec::new();
            for fa in &authorities {
                if list.add(fa.clone()) {
                    instructions.extend(adder.add(fa)?);
                }
            }
            (instructions, list)
        }
    };

    let mut removals = Vec::with_capacity(authorities.len());
    for fa in &authorities {
        removals.extend(v1.remove(fa)?);
    }

    let space = size_of_in(&v2.layout, Some(&token_metadata), Some(&merged))?;
    let plan = MigrationPlan {
        authorities,
        instructions,
        removals,
        required: SpaceRent {
            space,
            lamports: rent_for(space, rent),
        },
        current_len: data.len(),
    };

    tracing::debug!(
        metadata = %v2.metadata,
        migrated = plan.authorities.len(),
        instructions = plan.instructions.len(),
        required = plan.required.space,
        current = plan.current_len,
        "planned V1 to V2 field authority migration"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::accounts::{build_metadata_account_data, TokenMetadata};
    use crate::program::constants::instruction;
    use crate::program::instructions::FieldAuthorityInstruction;
    use crate::program::tlv::TlvLayout;
    use crate::program::types::{Field, FieldAuthority};
    use solana_pubkey::Pubkey;
    use spl_pod::optional_keys::OptionalNonZeroPubkey;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn test_program_id() -> Pubkey {
        Pubkey::from_str("EfRvELrn4b5aJRwddD1VUrqzsfm1pewBLPebq3iMPDp2").unwrap()
    }

    fn pk(n: u8) -> Pubkey {
        Pubkey::new_from_array([n; 32])
    }

    fn token_metadata() -> TokenMetadata {
        TokenMetadata {
            update_authority: OptionalNonZeroPubkey(pk(2)),
            mint: pk(3),
            name: "Token".to_string(),
            symbol: "TKN".to_string(),
            uri: "https://t".to_string(),
            additional_metadata: vec![("bio".to_string(), "hi".to_string())],
        }
    }

    fn stores() -> (PdaAuthorityStore, TlvAuthorityStore) {
        let v1 = PdaAuthorityStore::new(test_program_id(), pk(1), pk(2), pk(4))
            .with_fields([Field::Name, Field::key("bio"), Field::Uri]);
        let v2 = TlvAuthorityStore::new(test_program_id(), pk(1), pk(2));
        (v1, v2)
    }

    fn source_with(
        v1: &PdaAuthorityStore,
        existing: Option<&FieldAuthorities>,
    ) -> HashMap<Pubkey, Vec<u8>> {
        let mut source = HashMap::new();
        source.insert(
            pk(1),
            build_metadata_account_data(&token_metadata(), existing, &TlvLayout::default())
                .unwrap(),
        );
        source.insert(v1.record_address(&Field::Name).unwrap(), pk(10).to_bytes().to_vec());
        source.insert(v1.record_address(&Field::key("bio")).unwrap(), pk(11).to_bytes().to_vec());
        source
    }

    #[test]
    fn test_plan_initializes_absent_list() {
        let (v1, v2) = stores();
        let source = source_with(&v1, None);
        let per_byte = |len: usize| len as u64;

        let plan = plan_v1_to_v2(&v1, &v2, &source, &per_byte).unwrap();

        assert_eq!(
            plan.authorities.authorities,
            vec![
                FieldAuthority::new(Field::Name, pk(10)),
                FieldAuthority::new(Field::key("bio"), pk(11)),
            ]
        );
        assert_eq!(plan.instructions.len(), 1);
        assert_eq!(
            FieldAuthorityInstruction::unpack(&plan.instructions[0].data).unwrap(),
            FieldAuthorityInstruction::InitializeFieldAuthorities(plan.authorities.clone())
        );
        assert_eq!(plan.removals.len(), 2);
        for ix in &plan.removals {
            assert_eq!(&ix.data[..8], &instruction::REMOVE_FIELD_AUTHORITY[..]);
        }
        assert!(plan.needs_realloc());
        assert_eq!(plan.required.space - plan.current_len, 12 + plan.authorities.packed_len());
        assert_eq!(plan.required.lamports, plan.required.space as u64);
    }

    #[test]
    fn test_plan_skips_authorities_already_listed() {
        let (v1, v2) = stores();
        let existing = FieldAuthorities::new(vec![FieldAuthority::new(Field::Name, pk(10))]);
        let source = source_with(&v1, Some(&existing));
        let per_byte = |len: usize| len as u64;

        let plan = plan_v1_to_v2(&v1, &v2, &source, &per_byte).unwrap();

        assert_eq!(plan.instructions.len(), 1);
        match FieldAuthorityInstruction::unpack(&plan.instructions[0].data).unwrap() {
            FieldAuthorityInstruction::AddFieldAuthorityV2(args) => {
                assert!(args.idempotent);
                assert_eq!(args.field_authority, FieldAuthority::new(Field::key("bio"), pk(11)));
            }
            other => panic!("unexpected instruction: {other:?}"),
        }
        assert_eq!(
            plan.required.space - plan.current_len,
            FieldAuthority::new(Field::key("bio"), pk(11)).encoded_len()
        );
    }

    #[test]
    fn test_plan_with_no_records() {
        let (v1, v2) = stores();
        let mut source = HashMap::new();
        source.insert(
            pk(1),
            build_metadata_account_data(&token_metadata(), None, &TlvLayout::default()).unwrap(),
        );
        let plan = plan_v1_to_v2(&v1, &v2, &source, &|len: usize| len as u64).unwrap();

        assert!(plan.is_empty());
        assert!(plan.removals.is_empty());
        // An empty list is still initialized
        assert_eq!(plan.instructions.len(), 1);
    }

    #[test]
    fn test_plan_rejects_mismatched_stores() {
        let (v1, _) = stores();
        let other = TlvAuthorityStore::new(test_program_id(), pk(9), pk(2));
        let source = source_with(&v1, None);
        assert!(matches!(
            plan_v1_to_v2(&v1, &other, &source, &|len: usize| len as u64),
            Err(SdkError::Config(_))
        ));
    }

    #[test]
    fn test_plan_requires_metadata_account() {
        let (v1, v2) = stores();
        let source: HashMap<Pubkey, Vec<u8>> = HashMap::new();
        assert!(plan_v1_to_v2(&v1, &v2, &source, &|len: usize| len as u64)
            .unwrap_err()
            .is_not_found());
    }
}
