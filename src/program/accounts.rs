//! Account structures and deserialization for the field authority interface.
//!
//! This module contains the V1 field authority record, the token metadata
//! payload, and a typed view over a metadata account's TLV regions.

use solana_pubkey::Pubkey;
use spl_type_length_value::variable_len_pack::VariableLenPack;

pub use spl_token_metadata_interface::state::TokenMetadata;

use crate::program::constants::{
    FIELD_AUTHORITIES_DISCRIMINATOR, FIELD_AUTHORITY_ACCOUNT_SIZE, TOKEN_METADATA_DISCRIMINATOR,
};
use crate::program::error::{SdkError, SdkResult};
use crate::program::tlv::{append_entry, TlvLayout, TlvReader};
use crate::program::types::{Field, FieldAuthorities};
use crate::program::utils::{decode_exact, encode, read_pubkey};

// ============================================================================
// Field Authority Record (32 bytes)
// ============================================================================

/// V1 field authority record
///
/// Layout:
/// - [0..32] authority (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAuthorityAccount {
    /// Authority allowed to update the field
    pub authority: Pubkey,
}

impl FieldAuthorityAccount {
    /// Account size in bytes
    pub const LEN: usize = FIELD_AUTHORITY_ACCOUNT_SIZE;

    pub fn new(authority: Pubkey) -> Self {
        Self { authority }
    }

    /// Deserialize from account data
    pub fn deserialize(data: &[u8]) -> SdkResult<Self> {
        if data.len() != Self::LEN {
            return Err(SdkError::InvalidDataLength {
                expected: Self::LEN,
                actual: data.len(),
            });
        }

        Ok(Self {
            authority: read_pubkey(data, 0)?,
        })
    }

    pub fn serialize(&self) -> [u8; FIELD_AUTHORITY_ACCOUNT_SIZE] {
        self.authority.to_bytes()
    }
}

// ============================================================================
// Token Metadata
// ============================================================================

/// Reads and prospective edits over the interface's [`TokenMetadata`].
///
/// Layout of the payload:
/// - update_authority (32 bytes, all-zero = none)
/// - mint (32 bytes)
/// - name, symbol, uri (u32-length-prefixed strings)
/// - additional_metadata (u32 count, then key/value string pairs)
pub trait TokenMetadataExt: Sized {
    /// Current value of `field`, if set.
    fn value_of(&self, field: &Field) -> Option<&str>;

    /// Copy with `field` set to `value`.
    fn with_update(&self, field: &Field, value: impl Into<String>) -> Self;

    /// Update authority, if any.
    fn authority(&self) -> Option<Pubkey>;

    fn pack(&self) -> SdkResult<Vec<u8>>;

    fn unpack(data: &[u8]) -> SdkResult<Self>;

    /// Exact packed length.
    fn packed_len(&self) -> SdkResult<usize>;
}

impl TokenMetadataExt for TokenMetadata {
    fn value_of(&self, field: &Field) -> Option<&str> {
        match field {
            Field::Name => Some(&self.name),
            Field::Symbol => Some(&self.symbol),
            Field::Uri => Some(&self.uri),
            Field::Key(key) => self
                .additional_metadata
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
        }
    }

    fn with_update(&self, field: &Field, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.update(field.clone().into(), value.into());
        next
    }

    fn authority(&self) -> Option<Pubkey> {
        Option::<Pubkey>::from(self.update_authority)
    }

    fn pack(&self) -> SdkResult<Vec<u8>> {
        encode(self)
    }

    fn unpack(data: &[u8]) -> SdkResult<Self> {
        decode_exact(data)
    }

    fn packed_len(&self) -> SdkResult<usize> {
        self.get_packed_len()
            .map_err(|e| SdkError::Serialization(e.to_string()))
    }
}

// ============================================================================
// Metadata Account
// ============================================================================

/// Typed view over a metadata account's TLV regions.
#[derive(Debug, Clone, Copy)]
pub struct MetadataAccount<'a> {
    reader: TlvReader<'a>,
}

impl<'a> MetadataAccount<'a> {
    pub fn new(data: &'a [u8], layout: TlvLayout) -> Self {
        Self {
            reader: TlvReader::new(data, layout),
        }
    }

    pub fn reader(&self) -> &TlvReader<'a> {
        &self.reader
    }

    /// Token metadata region. Absence is [`SdkError::NotFound`].
    pub fn token_metadata(&self) -> SdkResult<TokenMetadata> {
        self.reader
            .value::<TokenMetadata>()?
            .ok_or_else(|| SdkError::NotFound("token metadata region".to_string()))
    }

    /// Field authorities region. Absence is [`SdkError::NotFound`].
    pub fn field_authorities(&self) -> SdkResult<FieldAuthorities> {
        self.try_field_authorities()?
            .ok_or_else(|| SdkError::NotFound("field authorities region".to_string()))
    }

    /// Field authorities region, or `None` if the list was never initialized.
    ///
    /// Decode failures carry their offset within the account data.
    pub fn try_field_authorities(&self) -> SdkResult<Option<FieldAuthorities>> {
        let layout = self.reader.layout();
        match self.reader.find_entry(&FIELD_AUTHORITIES_DISCRIMINATOR)? {
            Some(entry) => FieldAuthorities::unpack(entry.payload)
                .map(Some)
                .map_err(|e| e.at_offset(entry.payload_offset(&layout))),
            None => Ok(None),
        }
    }

    /// Offset one past the last initialized entry.
    pub fn initialized_len(&self) -> SdkResult<usize> {
        self.reader.initialized_len()
    }
}

/// Build the image of a metadata account holding `metadata` and, if given, `authorities`.
///
/// Bytes before `layout.offset` are zero.
pub fn build_metadata_account_data(
    metadata: &TokenMetadata,
    authorities: Option<&FieldAuthorities>,
    layout: &TlvLayout,
) -> SdkResult<Vec<u8>> {
    let mut data = vec![0u8; layout.offset];
    append_entry(&mut data, &TOKEN_METADATA_DISCRIMINATOR, layout, &TokenMetadataExt::pack(metadata)?)?;
    if let Some(authorities) = authorities {
        append_entry(
            &mut data,
            &FIELD_AUTHORITIES_DISCRIMINATOR,
            layout,
            &authorities.pack()?,
        )?;
    }
    Ok(data)
}
