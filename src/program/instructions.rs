//! Instruction builders and decoder for the field authority interface.
//!
//! Instruction data is the 8-byte discriminator followed by the borsh-encoded
//! arguments. V1 instructions address the per-field record account; V2
//! instructions rewrite the packed list inside the metadata account.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_instruction::{AccountMeta, Instruction};
use solana_pubkey::Pubkey;

use crate::program::constants::{instruction, Discriminator, DISCRIMINATOR_LEN, SYSTEM_PROGRAM_ID};
use crate::program::error::{SdkError, SdkResult};
use crate::program::pda::get_field_authority_pda;
use crate::program::types::{
    AddFieldAuthorityParams, Field, FieldAuthorities, FieldAuthority, FieldAuthorityV2Params,
    UpdateFieldParams,
};
use crate::program::utils::{decode_exact, encode_into};

// ============================================================================
// Helper Functions
// ============================================================================

/// Create an account meta for a signer+writable account.
fn signer_mut(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, true)
}

/// Create an account meta for a read-only signer.
fn signer(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, true)
}

/// Create an account meta for a writable account.
fn writable(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, false)
}

/// Create an account meta for a read-only account.
fn readonly(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, false)
}

// ============================================================================
// Instruction Arguments
// ============================================================================

/// Arguments of `AddFieldAuthority` (V1)
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct AddFieldAuthorityArgs {
    pub field: Field,
    pub authority: Pubkey,
}

/// Arguments of `UpdateFieldWithFieldAuthority` (V1 and V2)
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct UpdateFieldArgs {
    pub field: Field,
    pub value: String,
}

/// Arguments of `RemoveFieldAuthority` (V1)
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RemoveFieldAuthorityArgs {
    pub field: Field,
}

/// Arguments of `AddFieldAuthorityV2` and `RemoveFieldAuthorityV2`
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct FieldAuthorityV2Args {
    pub idempotent: bool,
    pub field_authority: FieldAuthority,
}

/// Every instruction of the interface, with its decoded arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAuthorityInstruction {
    InitializeFieldAuthorities(FieldAuthorities),
    AddFieldAuthority(AddFieldAuthorityArgs),
    AddFieldAuthorityV2(FieldAuthorityV2Args),
    UpdateFieldWithFieldAuthority(UpdateFieldArgs),
    UpdateFieldWithFieldAuthorityV2(UpdateFieldArgs),
    RemoveFieldAuthority(RemoveFieldAuthorityArgs),
    RemoveFieldAuthorityV2(FieldAuthorityV2Args),
}

impl FieldAuthorityInstruction {
    pub fn discriminator(&self) -> Discriminator {
        match self {
            Self::InitializeFieldAuthorities(_) => *instruction::INITIALIZE_FIELD_AUTHORITIES,
            Self::AddFieldAuthority(_) => *instruction::ADD_FIELD_AUTHORITY,
            Self::AddFieldAuthorityV2(_) => *instruction::ADD_FIELD_AUTHORITY_V2,
            Self::UpdateFieldWithFieldAuthority(_) => {
                *instruction::UPDATE_FIELD_WITH_FIELD_AUTHORITY
            }
            Self::UpdateFieldWithFieldAuthorityV2(_) => {
                *instruction::UPDATE_FIELD_WITH_FIELD_AUTHORITY_V2
            }
            Self::RemoveFieldAuthority(_) => *instruction::REMOVE_FIELD_AUTHORITY,
            Self::RemoveFieldAuthorityV2(_) => *instruction::REMOVE_FIELD_AUTHORITY_V2,
        }
    }

    /// Serialize to instruction data.
    pub fn pack(&self) -> SdkResult<Vec<u8>> {
        let mut data = Vec::with_capacity(64);
        data.extend_from_slice(&self.discriminator());
        match self {
            Self::InitializeFieldAuthorities(args) => encode_into(&mut data, args)?,
            Self::AddFieldAuthority(args) => encode_into(&mut data, args)?,
            Self::AddFieldAuthorityV2(args) | Self::RemoveFieldAuthorityV2(args) => {
                encode_into(&mut data, args)?
            }
            Self::UpdateFieldWithFieldAuthority(args)
            | Self::UpdateFieldWithFieldAuthorityV2(args) => encode_into(&mut data, args)?,
            Self::RemoveFieldAuthority(args) => encode_into(&mut data, args)?,
        }
        Ok(data)
    }

    /// Parse instruction data.
    pub fn unpack(data: &[u8]) -> SdkResult<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(SdkError::Decode {
                offset: data.len(),
                reason: format!(
                    "instruction data is {} byte(s), shorter than the discriminator",
                    data.len()
                ),
            });
        }
        let (tag, rest) = data.split_at(DISCRIMINATOR_LEN);

        let parsed = if tag == &instruction::INITIALIZE_FIELD_AUTHORITIES[..] {
            decode_exact(rest).map(Self::InitializeFieldAuthorities)
        } else if tag == &instruction::ADD_FIELD_AUTHORITY[..] {
            decode_exact(rest).map(Self::AddFieldAuthority)
        } else if tag == &instruction::ADD_FIELD_AUTHORITY_V2[..] {
            decode_exact(rest).map(Self::AddFieldAuthorityV2)
        } else if tag == &instruction::UPDATE_FIELD_WITH_FIELD_AUTHORITY[..] {
            decode_exact(rest).map(Self::UpdateFieldWithFieldAuthority)
        } else if tag == &instruction::UPDATE_FIELD_WITH_FIELD_AUTHORITY_V2[..] {
            decode_exact(rest).map(Self::UpdateFieldWithFieldAuthorityV2)
        } else if tag == &instruction::REMOVE_FIELD_AUTHORITY[..] {
            decode_exact(rest).map(Self::RemoveFieldAuthority)
        } else if tag == &instruction::REMOVE_FIELD_AUTHORITY_V2[..] {
            decode_exact(rest).map(Self::RemoveFieldAuthorityV2)
        } else {
            return Err(SdkError::UnknownInstruction {
                discriminator: hex::encode(tag),
            });
        };

        parsed.map_err(|e| e.at_offset(DISCRIMINATOR_LEN))
    }
}

// ============================================================================
// V2 Instruction Builders
// ============================================================================

/// Build InitializeFieldAuthorities instruction.
///
/// Writes the packed list into the metadata account.
///
/// Accounts:
/// 0. metadata (mut) - Metadata account
/// 1. update_authority (signer) - Metadata update authority
pub fn build_initialize_field_authorities_ix(
    metadata: &Pubkey,
    update_authority: &Pubkey,
    authorities: &FieldAuthorities,
    program_id: &Pubkey,
) -> SdkResult<Instruction> {
    let keys = vec![writable(*metadata), signer(*update_authority)];

    // Data: [discriminator (8), count (u32), field_authority...]
    let data = FieldAuthorityInstruction::InitializeFieldAuthorities(authorities.clone()).pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    })
}

/// Build AddFieldAuthorityV2 instruction.
///
/// Accounts:
/// 0. metadata (mut) - Metadata account holding the list
/// 1. update_authority (signer) - Metadata update authority
pub fn build_add_field_authority_v2_ix(
    params: &FieldAuthorityV2Params,
    program_id: &Pubkey,
) -> SdkResult<Instruction> {
    let keys = vec![writable(params.metadata), signer(params.update_authority)];

    // Data: [discriminator (8), idempotent (u8), field, authority (32)]
    let data = FieldAuthorityInstruction::AddFieldAuthorityV2(FieldAuthorityV2Args {
        idempotent: params.idempotent,
        field_authority: params.field_authority.clone(),
    })
    .pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    })
}

/// Build UpdateFieldWithFieldAuthorityV2 instruction.
///
/// Accounts:
/// 0. metadata (mut) - Metadata account
/// 1. field_authority (signer) - Authority listed for the field
pub fn build_update_field_with_field_authority_v2_ix(
    params: &UpdateFieldParams,
    program_id: &Pubkey,
) -> SdkResult<Instruction> {
    let keys = vec![writable(params.metadata), signer(params.field_authority)];

    // Data: [discriminator (8), field, value (string)]
    let data = FieldAuthorityInstruction::UpdateFieldWithFieldAuthorityV2(UpdateFieldArgs {
        field: params.field.clone(),
        value: params.value.clone(),
    })
    .pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    })
}

/// Build RemoveFieldAuthorityV2 instruction.
///
/// Accounts:
/// 0. metadata (mut) - Metadata account holding the list
/// 1. update_authority (signer) - Metadata update authority
pub fn build_remove_field_authority_v2_ix(
    params: &FieldAuthorityV2Params,
    program_id: &Pubkey,
) -> SdkResult<Instruction> {
    let keys = vec![writable(params.metadata), signer(params.update_authority)];

    // Data: [discriminator (8), idempotent (u8), field, authority (32)]
    let data = FieldAuthorityInstruction::RemoveFieldAuthorityV2(FieldAuthorityV2Args {
        idempotent: params.idempotent,
        field_authority: params.field_authority.clone(),
    })
    .pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    })
}

// ============================================================================
// V1 Instruction Builders
// ============================================================================

/// Build AddFieldAuthority instruction.
///
/// Creates the field's record account holding the authority.
///
/// Accounts:
/// 0. payer (signer, mut) - Funds the record
/// 1. metadata (readonly) - Metadata account
/// 2. update_authority (signer) - Metadata update authority
/// 3. field_authority (mut) - Field authority record PDA
/// 4. system_program (readonly)
pub fn build_add_field_authority_ix(
    params: &AddFieldAuthorityParams,
    program_id: &Pubkey,
) -> SdkResult<Instruction> {
    let (record, _) = get_field_authority_pda(&params.field, &params.metadata, program_id)?;

    let keys = vec![
        signer_mut(params.payer),
        readonly(params.metadata),
        signer(params.update_authority),
        writable(record),
        readonly(SYSTEM_PROGRAM_ID),
    ];

    // Data: [discriminator (8), field, authority (32)]
    let data = FieldAuthorityInstruction::AddFieldAuthority(AddFieldAuthorityArgs {
        field: params.field.clone(),
        authority: params.authority,
    })
    .pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    })
}

/// Build UpdateFieldWithFieldAuthority instruction.
///
/// Accounts:
/// 0. metadata (mut) - Metadata account
/// 1. field_authority (signer) - Authority stored in the record
/// 2. field_authority_record (readonly) - Field authority record PDA
pub fn build_update_field_with_field_authority_ix(
    params: &UpdateFieldParams,
    program_id: &Pubkey,
) -> SdkResult<Instruction> {
    let (record, _) = get_field_authority_pda(&params.field, &params.metadata, program_id)?;

    let keys = vec![
        writable(params.metadata),
        signer(params.field_authority),
        readonly(record),
    ];

    // Data: [discriminator (8), field, value (string)]
    let data = FieldAuthorityInstruction::UpdateFieldWithFieldAuthority(UpdateFieldArgs {
        field: params.field.clone(),
        value: params.value.clone(),
    })
    .pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    })
}

/// Build RemoveFieldAuthority instruction.
///
/// Closes the field's record account.
///
/// Accounts:
/// 0. metadata (mut) - Metadata account
/// 1. update_authority (signer) - Metadata update authority
/// 2. field_authority_record (mut) - Field authority record PDA
pub fn build_remove_field_authority_ix(
    metadata: &Pubkey,
    update_authority: &Pubkey,
    field: &Field,
    program_id: &Pubkey,
) -> SdkResult<Instruction> {
    let (record, _) = get_field_authority_pda(field, metadata, program_id)?;

    let keys = vec![
        writable(*metadata),
        signer(*update_authority),
        writable(record),
    ];

    // Data: [discriminator (8), field]
    let data = FieldAuthorityInstruction::RemoveFieldAuthority(RemoveFieldAuthorityArgs {
        field: field.clone(),
    })
    .pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    })
}

// ============================================================================
// Rent
// ============================================================================

/// Build a system transfer topping `account` up to `required_lamports`.
///
/// Returns `None` when the account already holds enough.
///
/// Accounts:
/// 0. payer (signer, mut)
/// 1. account (mut)
pub fn build_ensure_rent_ix(
    payer: &Pubkey,
    account: &Pubkey,
    current_lamports: u64,
    required_lamports: u64,
) -> Option<Instruction> {
    let shortfall = required_lamports.checked_sub(current_lamports)?;
    if shortfall == 0 {
        return None;
    }
    Some(solana_system_interface::instruction::transfer(
        payer, account, shortfall,
    ))
}
