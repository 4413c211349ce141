//! Authority stores over the two storage strategies.
//!
//! [`PdaAuthorityStore`] keeps one record account per field (V1).
//! [`TlvAuthorityStore`] keeps a packed list inside the metadata account (V2).
//! Both build instructions and read state through [`AuthorityStore`], so
//! callers can be written once against either strategy.

use std::collections::{BTreeMap, HashMap};

use solana_instruction::Instruction;
use solana_pubkey::Pubkey;

use crate::program::accounts::{FieldAuthorityAccount, MetadataAccount};
use crate::program::error::{SdkError, SdkResult};
use crate::program::instructions::{
    build_add_field_authority_ix, build_add_field_authority_v2_ix,
    build_initialize_field_authorities_ix, build_remove_field_authority_ix,
    build_remove_field_authority_v2_ix, build_update_field_with_field_authority_ix,
    build_update_field_with_field_authority_v2_ix,
};
use crate::program::pda::get_field_authority_pda;
use crate::program::space::{rent_for, size_of_in, MinimumBalance, SpaceRent};
use crate::program::tlv::TlvLayout;
use crate::program::types::{
    AddFieldAuthorityParams, Field, FieldAuthorities, FieldAuthority, FieldAuthorityV2Params,
    UpdateFieldParams,
};

// ============================================================================
// Account Source
// ============================================================================

/// Raw account bytes by address, typically a snapshot fetched over RPC.
pub trait AccountSource {
    /// Account data, or `None` if the account does not exist.
    fn account_data(&self, address: &Pubkey) -> Option<&[u8]>;
}

impl AccountSource for HashMap<Pubkey, Vec<u8>> {
    fn account_data(&self, address: &Pubkey) -> Option<&[u8]> {
        self.get(address).map(Vec::as_slice)
    }
}

impl AccountSource for BTreeMap<Pubkey, Vec<u8>> {
    fn account_data(&self, address: &Pubkey) -> Option<&[u8]> {
        self.get(address).map(Vec::as_slice)
    }
}

/// Metadata account bytes from `source`; absence is [`SdkError::NotFound`].
fn metadata_data<'a>(source: &'a dyn AccountSource, metadata: &Pubkey) -> SdkResult<&'a [u8]> {
    source
        .account_data(metadata)
        .ok_or_else(|| SdkError::NotFound(format!("metadata account {metadata}")))
}

// ============================================================================
// Store Trait
// ============================================================================

/// Storage strategy of an [`AuthorityStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStrategy {
    /// One record account per field
    V1,
    /// Packed list inside the metadata account
    V2,
}

/// Field authority operations over one metadata account.
pub trait AuthorityStore {
    fn strategy(&self) -> StorageStrategy;

    /// Metadata account the store operates on.
    fn metadata(&self) -> &Pubkey;

    /// Instructions granting `field_authority`.
    fn add(&self, field_authority: &FieldAuthority) -> SdkResult<Vec<Instruction>>;

    /// Instructions granting `field_authority`, chosen against the state in `source`.
    fn add_from(
        &self,
        _source: &dyn AccountSource,
        field_authority: &FieldAuthority,
    ) -> SdkResult<Vec<Instruction>> {
        self.add(field_authority)
    }

    /// Instructions revoking `field_authority`.
    fn remove(&self, field_authority: &FieldAuthority) -> SdkResult<Vec<Instruction>>;

    /// Instruction rewriting `field` to `value`, signed by `field_authority`.
    fn update_field(
        &self,
        field_authority: &Pubkey,
        field: &Field,
        value: &str,
    ) -> SdkResult<Instruction>;

    /// Current authorities, read from `source`.
    fn list(&self, source: &dyn AccountSource) -> SdkResult<FieldAuthorities>;

    /// Every account the store reads or writes: the metadata account and any records.
    fn addresses_involved(&self) -> SdkResult<Vec<Pubkey>>;
}

// ============================================================================
// V1: Per-Field Records
// ============================================================================

/// V1 store: one record account per field.
///
/// Record accounts cannot be enumerated, so the store tracks the fields whose
/// records it reads.
#[derive(Debug, Clone)]
pub struct PdaAuthorityStore {
    pub program_id: Pubkey,
    pub metadata: Pubkey,
    pub update_authority: Pubkey,
    pub payer: Pubkey,
    pub fields: Vec<Field>,
}

impl PdaAuthorityStore {
    pub fn new(
        program_id: Pubkey,
        metadata: Pubkey,
        update_authority: Pubkey,
        payer: Pubkey,
    ) -> Self {
        Self {
            program_id,
            metadata,
            update_authority,
            payer,
            fields: Vec::new(),
        }
    }

    /// Track `fields` when listing.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        for field in fields {
            if !self.fields.contains(&field) {
                self.fields.push(field);
            }
        }
        self
    }

    /// Record address of `field`.
    pub fn record_address(&self, field: &Field) -> SdkResult<Pubkey> {
        get_field_authority_pda(field, &self.metadata, &self.program_id).map(|(pda, _)| pda)
    }
}

impl AuthorityStore for PdaAuthorityStore {
    fn strategy(&self) -> StorageStrategy {
        StorageStrategy::V1
    }

    fn metadata(&self) -> &Pubkey {
        &self.metadata
    }

    fn add(&self, field_authority: &FieldAuthority) -> SdkResult<Vec<Instruction>> {
        let ix = build_add_field_authority_ix(
            &AddFieldAuthorityParams {
                payer: self.payer,
                metadata: self.metadata,
                update_authority: self.update_authority,
                field: field_authority.field.clone(),
                authority: field_authority.authority,
            },
            &self.program_id,
        )?;
        Ok(vec![ix])
    }

    fn remove(&self, field_authority: &FieldAuthority) -> SdkResult<Vec<Instruction>> {
        let ix = build_remove_field_authority_ix(
            &self.metadata,
            &self.update_authority,
            &field_authority.field,
            &self.program_id,
        )?;
        Ok(vec![ix])
    }

    fn update_field(
        &self,
        field_authority: &Pubkey,
        field: &Field,
        value: &str,
    ) -> SdkResult<Instruction> {
        build_update_field_with_field_authority_ix(
            &UpdateFieldParams {
                metadata: self.metadata,
                field_authority: *field_authority,
                field: field.clone(),
                value: value.to_string(),
            },
            &self.program_id,
        )
    }

    fn list(&self, source: &dyn AccountSource) -> SdkResult<FieldAuthorities> {
        let mut authorities = FieldAuthorities::default();
        for field in &self.fields {
            let record = self.record_address(field)?;
            if let Some(data) = source.account_data(&record) {
                let account = FieldAuthorityAccount::deserialize(data)?;
                authorities
                    .authorities
                    .push(FieldAuthority::new(field.clone(), account.authority));
            }
        }
        tracing::debug!(
            metadata = %self.metadata,
            tracked = self.fields.len(),
            found = authorities.len(),
            "listed V1 field authority records"
        );
        Ok(authorities)
    }

    fn addresses_involved(&self) -> SdkResult<Vec<Pubkey>> {
        let mut addresses = Vec::with_capacity(self.fields.len() + 1);
        addresses.push(self.metadata);
        for field in &self.fields {
            addresses.push(self.record_address(field)?);
        }
        Ok(addresses)
    }
}

// ============================================================================
// V2: Packed List
// ============================================================================

/// V2 store: the packed list inside the metadata account.
#[derive(Debug, Clone)]
pub struct TlvAuthorityStore {
    pub program_id: Pubkey,
    pub metadata: Pubkey,
    pub update_authority: Pubkey,
    pub layout: TlvLayout,
    /// Passed through on add/remove
    pub idempotent: bool,
}

impl TlvAuthorityStore {
    pub fn new(program_id: Pubkey, metadata: Pubkey, update_authority: Pubkey) -> Self {
        Self {
            program_id,
            metadata,
            update_authority,
            layout: TlvLayout::default(),
            idempotent: false,
        }
    }

    pub fn with_layout(mut self, layout: TlvLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }

    /// Instruction writing the initial list.
    pub fn initialize(&self, authorities: &FieldAuthorities) -> SdkResult<Instruction> {
        build_initialize_field_authorities_ix(
            &self.metadata,
            &self.update_authority,
            authorities,
            &self.program_id,
        )
    }

    /// The list, or `None` if it was never initialized.
    pub fn try_list(&self, source: &dyn AccountSource) -> SdkResult<Option<FieldAuthorities>> {
        let data = metadata_data(source, &self.metadata)?;
        MetadataAccount::new(data, self.layout).try_field_authorities()
    }

    /// Space and funding the metadata account needs once `field_authority` is added.
    pub fn space_after_add(
        &self,
        source: &dyn AccountSource,
        field_authority: &FieldAuthority,
        rent: &impl MinimumBalance,
    ) -> SdkResult<SpaceRent> {
        let data = metadata_data(source, &self.metadata)?;
        let account = MetadataAccount::new(data, self.layout);
        let token_metadata = account.token_metadata()?;
        let mut authorities = account.try_field_authorities()?.unwrap_or_default();
        authorities.add(field_authority.clone());

        let space = size_of_in(&self.layout, Some(&token_metadata), Some(&authorities))?;
        let required = SpaceRent {
            space,
            lamports: rent_for(space, rent),
        };
        tracing::debug!(
            metadata = %self.metadata,
            current = data.len(),
            required = required.space,
            "sized V2 field authority add"
        );
        Ok(required)
    }

    fn v2_params(&self, field_authority: &FieldAuthority) -> FieldAuthorityV2Params {
        FieldAuthorityV2Params {
            metadata: self.metadata,
            update_authority: self.update_authority,
            field_authority: field_authority.clone(),
            idempotent: self.idempotent,
        }
    }
}

impl AuthorityStore for TlvAuthorityStore {
    fn strategy(&self) -> StorageStrategy {
        StorageStrategy::V2
    }

    fn metadata(&self) -> &Pubkey {
        &self.metadata
    }

    /// Assumes the list exists; the program rejects an add into an uninitialized
    /// list. Use [`AuthorityStore::add_from`] when that is not known.
    fn add(&self, field_authority: &FieldAuthority) -> SdkResult<Vec<Instruction>> {
        Ok(vec![build_add_field_authority_v2_ix(
            &self.v2_params(field_authority),
            &self.program_id,
        )?])
    }

    /// Initializes the list with `field_authority` if it does not exist yet.
    fn add_from(
        &self,
        source: &dyn AccountSource,
        field_authority: &FieldAuthority,
    ) -> SdkResult<Vec<Instruction>> {
        if self.try_list(source)?.is_some() {
            return self.add(field_authority);
        }
        tracing::debug!(
            metadata = %self.metadata,
            "field authorities list absent, initializing with the grant"
        );
        let initial = FieldAuthorities::new(vec![field_authority.clone()]);
        Ok(vec![self.initialize(&initial)?])
    }

    fn remove(&self, field_authority: &FieldAuthority) -> SdkResult<Vec<Instruction>> {
        Ok(vec![build_remove_field_authority_v2_ix(
            &self.v2_params(field_authority),
            &self.program_id,
        )?])
    }

    fn update_field(
        &self,
        field_authority: &Pubkey,
        field: &Field,
        value: &str,
    ) -> SdkResult<Instruction> {
        build_update_field_with_field_authority_v2_ix(
            &UpdateFieldParams {
                metadata: self.metadata,
                field_authority: *field_authority,
                field: field.clone(),
                value: value.to_string(),
            },
            &self.program_id,
        )
    }

    /// An uninitialized list reads as empty.
    fn list(&self, source: &dyn AccountSource) -> SdkResult<FieldAuthorities> {
        Ok(self.try_list(source)?.unwrap_or_default())
    }

    fn addresses_involved(&self) -> SdkResult<Vec<Pubkey>> {
        Ok(vec![self.metadata])
    }
}
