//! Type definitions for the field authority interface.
//!
//! This module contains the `Field` identifier, the `(field, authority)`
//! record, the packed authorities list, and the parameter structs used by the
//! instruction builders.

use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_program_error::ProgramError;
use solana_pubkey::Pubkey;
use spl_discriminator::SplDiscriminate;
use spl_token_metadata_interface::state::Field as SplField;
use spl_type_length_value::variable_len_pack::VariableLenPack;

use crate::program::constants::{field_tag, KEY_SEED_PREFIX, PUBKEY_LEN};
use crate::program::error::SdkResult;
use crate::program::utils::{decode_exact, decode_prefix, encode, string_len, unknown_tag_error};
use crate::shared::serde_util::pubkey_str;

// ============================================================================
// Field
// ============================================================================

/// An addressable unit of a token metadata record.
///
/// Wire-compatible with the token metadata interface's `Field`: a one-byte
/// variant tag, followed for `Key` by a u32-length-prefixed UTF-8 string.
/// Ordering is by variant, then by key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// The metadata name
    Name,
    /// The metadata symbol
    Symbol,
    /// The metadata URI
    Uri,
    /// An arbitrary additional-metadata key
    Key(String),
}

impl Field {
    /// Convenience constructor for a `Key` field.
    pub fn key(key: impl Into<String>) -> Self {
        Field::Key(key.into())
    }

    /// Seed string used for V1 record derivation.
    ///
    /// `Name → "name"`, `Symbol → "symbol"`, `Uri → "uri"`, `Key(k) → "key:" + k`.
    pub fn to_seed(&self) -> String {
        match self {
            Field::Name => "name".to_string(),
            Field::Symbol => "symbol".to_string(),
            Field::Uri => "uri".to_string(),
            Field::Key(key) => format!("{KEY_SEED_PREFIX}{key}"),
        }
    }

    /// Variant tag byte.
    pub fn tag(&self) -> u8 {
        match self {
            Field::Name => field_tag::NAME,
            Field::Symbol => field_tag::SYMBOL,
            Field::Uri => field_tag::URI,
            Field::Key(_) => field_tag::KEY,
        }
    }

    /// Encoded length in bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Field::Key(key) => 1 + string_len(key),
            _ => 1,
        }
    }

    pub fn encode(&self) -> SdkResult<Vec<u8>> {
        encode(self)
    }

    /// Decode a field from the front of `data`, returning it with the bytes consumed.
    pub fn decode(data: &[u8]) -> SdkResult<(Self, usize)> {
        decode_prefix(data)
    }
}

impl From<Field> for SplField {
    fn from(field: Field) -> Self {
        match field {
            Field::Name => SplField::Name,
            Field::Symbol => SplField::Symbol,
            Field::Uri => SplField::Uri,
            Field::Key(key) => SplField::Key(key),
        }
    }
}

impl From<SplField> for Field {
    fn from(field: SplField) -> Self {
        match field {
            SplField::Name => Field::Name,
            SplField::Symbol => Field::Symbol,
            SplField::Uri => Field::Uri,
            SplField::Key(key) => Field::Key(key),
        }
    }
}

impl BorshSerialize for Field {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        SplField::from(self.clone()).serialize(writer)
    }
}

impl BorshDeserialize for Field {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let tag = u8::deserialize_reader(reader)?;
        if tag > field_tag::KEY {
            return Err(unknown_tag_error(tag));
        }
        // Hand the tag back so the interface type decodes the whole variant
        let tag = [tag];
        let mut chained = tag.as_slice().chain(reader);
        SplField::deserialize_reader(&mut chained).map(Field::from)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_seed())
    }
}

impl FromStr for Field {
    type Err = std::convert::Infallible;

    /// Inverse of [`Field::to_seed`]; any other string is taken as a bare key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "name" => Field::Name,
            "symbol" => Field::Symbol,
            "uri" => Field::Uri,
            _ => match s.strip_prefix(KEY_SEED_PREFIX) {
                Some(key) => Field::Key(key.to_string()),
                None => Field::Key(s.to_string()),
            },
        })
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(field) => field,
            Err(never) => match never {},
        }
    }
}

// ============================================================================
// FieldAuthority
// ============================================================================

/// Grants `authority` permission to update `field`.
///
/// Layout: `field` encoding followed by the 32 raw authority bytes.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct FieldAuthority {
    pub field: Field,
    #[serde(with = "pubkey_str")]
    pub authority: Pubkey,
}

impl FieldAuthority {
    pub fn new(field: Field, authority: Pubkey) -> Self {
        Self { field, authority }
    }

    pub fn encoded_len(&self) -> usize {
        self.field.encoded_len() + PUBKEY_LEN
    }

    pub fn encode(&self) -> SdkResult<Vec<u8>> {
        encode(self)
    }

    /// Decode a record from the front of `data`, returning it with the bytes consumed.
    pub fn decode(data: &[u8]) -> SdkResult<(Self, usize)> {
        decode_prefix(data)
    }
}

// ============================================================================
// FieldAuthorities
// ============================================================================

/// The V2 packed list of field authorities.
///
/// Packed as a u32 count followed by each [`FieldAuthority`]. The codec keeps
/// insertion order and duplicates; the list helpers below reproduce the
/// external program's add/remove semantics for computing prospective state.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
    SplDiscriminate,
)]
#[discriminator_hash_input("field_authorities")]
pub struct FieldAuthorities {
    pub authorities: Vec<FieldAuthority>,
}

impl FieldAuthorities {
    pub fn new(authorities: Vec<FieldAuthority>) -> Self {
        Self { authorities }
    }

    /// Pack into the TLV payload (without discriminator and length framing).
    pub fn pack(&self) -> SdkResult<Vec<u8>> {
        encode(self)
    }

    /// Unpack a TLV payload. Truncated entries and trailing bytes are errors.
    pub fn unpack(data: &[u8]) -> SdkResult<Self> {
        decode_exact(data)
    }

    /// Exact packed length.
    pub fn packed_len(&self) -> usize {
        4 + self
            .authorities
            .iter()
            .map(FieldAuthority::encoded_len)
            .sum::<usize>()
    }

    pub fn len(&self) -> usize {
        self.authorities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authorities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldAuthority> {
        self.authorities.iter()
    }

    /// Whether the exact `(field, authority)` pair is present.
    pub fn contains(&self, field_authority: &FieldAuthority) -> bool {
        self.authorities.contains(field_authority)
    }

    /// Append the pair unless it is already present. Returns true if appended.
    pub fn add(&mut self, field_authority: FieldAuthority) -> bool {
        if self.contains(&field_authority) {
            return false;
        }
        self.authorities.push(field_authority);
        true
    }

    /// Remove every occurrence of the pair. Returns true if any was found.
    pub fn remove(&mut self, field_authority: &FieldAuthority) -> bool {
        let before = self.authorities.len();
        self.authorities.retain(|fa| fa != field_authority);
        self.authorities.len() != before
    }

    /// Authorities granted on `field`, in list order.
    pub fn authorities_for<'a>(
        &'a self,
        field: &'a Field,
    ) -> impl Iterator<Item = &'a Pubkey> + 'a {
        self.authorities
            .iter()
            .filter(move |fa| &fa.field == field)
            .map(|fa| &fa.authority)
    }

    /// Fields `authority` may update, in list order.
    pub fn fields_for<'a>(
        &'a self,
        authority: &'a Pubkey,
    ) -> impl Iterator<Item = &'a Field> + 'a {
        self.authorities
            .iter()
            .filter(move |fa| &fa.authority == authority)
            .map(|fa| &fa.field)
    }
}

impl VariableLenPack for FieldAuthorities {
    fn pack_into_slice(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        borsh::to_writer(&mut dst[..], self).map_err(|_| ProgramError::AccountDataTooSmall)
    }

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        Self::unpack(src).map_err(|_| ProgramError::InvalidAccountData)
    }

    fn get_packed_len(&self) -> Result<usize, ProgramError> {
        Ok(self.packed_len())
    }
}

impl From<Vec<FieldAuthority>> for FieldAuthorities {
    fn from(authorities: Vec<FieldAuthority>) -> Self {
        Self { authorities }
    }
}

impl FromIterator<FieldAuthority> for FieldAuthorities {
    fn from_iter<I: IntoIterator<Item = FieldAuthority>>(iter: I) -> Self {
        Self {
            authorities: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FieldAuthorities {
    type Item = FieldAuthority;
    type IntoIter = std::vec::IntoIter<FieldAuthority>;

    fn into_iter(self) -> Self::IntoIter {
        self.authorities.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldAuthorities {
    type Item = &'a FieldAuthority;
    type IntoIter = std::slice::Iter<'a, FieldAuthority>;

    fn into_iter(self) -> Self::IntoIter {
        self.authorities.iter()
    }
}

// ============================================================================
// Parameter Structs
// ============================================================================

/// Parameters for adding a V1 field authority record
#[derive(Debug, Clone)]
pub struct AddFieldAuthorityParams {
    /// Funds the record account (signer, mut)
    pub payer: Pubkey,
    /// Metadata account the field belongs to
    pub metadata: Pubkey,
    /// Metadata update authority (signer)
    pub update_authority: Pubkey,
    /// Field being delegated
    pub field: Field,
    /// Delegated authority
    pub authority: Pubkey,
}

/// Parameters for adding or removing a V2 field authority
#[derive(Debug, Clone)]
pub struct FieldAuthorityV2Params {
    /// Metadata account holding the packed list
    pub metadata: Pubkey,
    /// Metadata update authority (signer)
    pub update_authority: Pubkey,
    /// The `(field, authority)` pair
    pub field_authority: FieldAuthority,
    /// Ask the program to no-op instead of failing on a duplicate/missing pair
    pub idempotent: bool,
}

/// Parameters for updating a field value through its field authority
#[derive(Debug, Clone)]
pub struct UpdateFieldParams {
    /// Metadata account
    pub metadata: Pubkey,
    /// Field authority (signer)
    pub field_authority: Pubkey,
    /// Field to rewrite
    pub field: Field,
    /// New value
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::error::SdkError;

    fn pk(n: u8) -> Pubkey {
        Pubkey::new_from_array([n; 32])
    }

    #[test]
    fn test_field_seeds_are_stable() {
        assert_eq!(Field::Name.to_seed(), "name");
        assert_eq!(Field::Symbol.to_seed(), "symbol");
        assert_eq!(Field::Uri.to_seed(), "uri");
        assert_eq!(Field::key("x").to_seed(), "key:x");
        assert_eq!(Field::key("").to_seed(), "key:");
    }

    #[test]
    fn test_field_encoding_layout() {
        assert_eq!(Field::Name.encode().unwrap(), vec![0]);
        assert_eq!(Field::Symbol.encode().unwrap(), vec![1]);
        assert_eq!(Field::Uri.encode().unwrap(), vec![2]);
        assert_eq!(Field::key("bio").encode().unwrap(), vec![3, 3, 0, 0, 0, b'b', b'i', b'o']);
    }

    #[test]
    fn test_field_decode_reports_consumed() {
        let mut data = Field::key("bio").encode().unwrap();
        data.extend_from_slice(&[0xaa, 0xbb]);
        let (field, consumed) = Field::decode(&data).unwrap();
        assert_eq!(field, Field::key("bio"));
        assert_eq!(consumed, 8);
    }

    #[test]
    fn test_field_decode_edge_keys() {
        for key in ["", "a\0b", "ключ", "🔑 emoji", "\0"] {
            let field = Field::key(key);
            let encoded = field.encode().unwrap();
            assert_eq!(encoded.len(), field.encoded_len());
            assert_eq!(Field::decode(&encoded).unwrap(), (field, encoded.len()));
        }
    }

    #[test]
    fn test_field_decode_unknown_tag() {
        let err = Field::decode(&[4]).unwrap_err();
        assert!(matches!(err, SdkError::UnknownFieldTag { tag: 4, offset: 0 }));

        let err = Field::decode(&[0xff, 1, 2]).unwrap_err();
        assert!(matches!(err, SdkError::UnknownFieldTag { tag: 0xff, .. }));
    }

    #[test]
    fn test_field_decode_truncated() {
        assert!(matches!(Field::decode(&[]), Err(SdkError::Decode { .. })));
        assert!(matches!(Field::decode(&[3, 5, 0, 0, 0, b'a']), Err(SdkError::Decode { .. })));
        // Invalid UTF-8
        assert!(matches!(Field::decode(&[3, 1, 0, 0, 0, 0xff]), Err(SdkError::Decode { .. })));
    }

    #[test]
    fn test_field_display_and_parse() {
        for field in [Field::Name, Field::Symbol, Field::Uri, Field::key("name"), Field::key("")] {
            let parsed: Field = field.to_string().parse().unwrap();
            assert_eq!(parsed, field);
        }
        assert_eq!(Field::from("bio"), Field::key("bio"));
        assert_eq!(Field::from("key:bio"), Field::key("bio"));
    }

    #[test]
    fn test_field_ordering() {
        let mut fields = vec![
            Field::key("b"),
            Field::Uri,
            Field::key("a"),
            Field::Name,
            Field::Symbol,
        ];
        fields.sort();
        assert_eq!(
            fields,
            vec![Field::Name, Field::Symbol, Field::Uri, Field::key("a"), Field::key("b")]
        );
    }

    #[test]
    fn test_field_serde_json() {
        assert_eq!(serde_json::to_string(&Field::Name).unwrap(), "\"name\"");
        assert_eq!(serde_json::to_string(&Field::key("bio")).unwrap(), "{\"key\":\"bio\"}");
        let field: Field = serde_json::from_str("{\"key\":\"bio\"}").unwrap();
        assert_eq!(field, Field::key("bio"));
    }

    #[test]
    fn test_field_authority_layout() {
        let fa = FieldAuthority::new(Field::Uri, pk(9));
        let encoded = fa.encode().unwrap();
        assert_eq!(encoded.len(), 33);
        assert_eq!(encoded[0], 2);
        assert_eq!(&encoded[1..], &[9u8; 32]);
        assert_eq!(FieldAuthority::decode(&encoded).unwrap(), (fa, 33));
    }

    #[test]
    fn test_field_authority_accepts_any_32_bytes() {
        let mut data = vec![0u8];
        data.extend_from_slice(&[0u8; 32]);
        let (fa, _) = FieldAuthority::decode(&data).unwrap();
        assert_eq!(fa.authority, Pubkey::default());
    }

    #[test]
    fn test_field_authority_truncated_authority() {
        let mut data = vec![1u8];
        data.extend_from_slice(&[1u8; 31]);
        assert!(matches!(FieldAuthority::decode(&data), Err(SdkError::Decode { .. })));
    }

    #[test]
    fn test_field_authorities_pack_layout() {
        let list = FieldAuthorities::new(vec![
            FieldAuthority::new(Field::Name, pk(1)),
            FieldAuthority::new(Field::key("k"), pk(2)),
        ]);
        let packed = list.pack().unwrap();
        assert_eq!(&packed[..4], &[2, 0, 0, 0]);
        assert_eq!(packed[4], 0);
        assert_eq!(&packed[5..37], &[1u8; 32]);
        assert_eq!(&packed[37..43], &[3, 1, 0, 0, 0, b'k']);
        assert_eq!(packed.len(), list.packed_len());
        assert_eq!(FieldAuthorities::unpack(&packed).unwrap(), list);
    }

    #[test]
    fn test_field_authorities_empty_and_duplicates() {
        let empty = FieldAuthorities::default();
        assert_eq!(empty.pack().unwrap(), vec![0, 0, 0, 0]);
        assert_eq!(FieldAuthorities::unpack(&[0, 0, 0, 0]).unwrap(), empty);

        let fa = FieldAuthority::new(Field::Symbol, pk(3));
        let dup = FieldAuthorities::new(vec![fa.clone(), fa.clone(), fa]);
        let packed = dup.pack().unwrap();
        assert_eq!(FieldAuthorities::unpack(&packed).unwrap(), dup);
    }

    #[test]
    fn test_field_authorities_unpack_rejects_garbage() {
        let list = FieldAuthorities::new(vec![FieldAuthority::new(Field::Name, pk(1))]);
        let mut packed = list.pack().unwrap();

        let mut trailing = packed.clone();
        trailing.push(0);
        assert!(matches!(
            FieldAuthorities::unpack(&trailing),
            Err(SdkError::Decode { offset: 37, .. })
        ));

        packed.truncate(packed.len() - 1);
        assert!(matches!(FieldAuthorities::unpack(&packed), Err(SdkError::Decode { .. })));

        // Count claims two entries, only one present
        let mut short = list.pack().unwrap();
        short[0] = 2;
        assert!(matches!(FieldAuthorities::unpack(&short), Err(SdkError::Decode { .. })));
    }

    #[test]
    fn test_field_authorities_unpack_unknown_nested_tag() {
        let mut packed = FieldAuthorities::new(vec![FieldAuthority::new(Field::Name, pk(1))])
            .pack()
            .unwrap();
        packed[4] = 9;
        assert!(matches!(
            FieldAuthorities::unpack(&packed),
            Err(SdkError::UnknownFieldTag { tag: 9, offset: 4 })
        ));
    }

    #[test]
    fn test_field_authorities_add_remove_semantics() {
        let a = FieldAuthority::new(Field::key("bio"), pk(1));
        let b = FieldAuthority::new(Field::key("bio"), pk(2));
        let mut list = FieldAuthorities::default();

        assert!(list.add(a.clone()));
        assert!(!list.add(a.clone()));
        assert!(list.add(b.clone()));
        assert_eq!(list.len(), 2);

        let bio = Field::key("bio");
        assert_eq!(list.authorities_for(&bio).count(), 2);
        assert_eq!(list.fields_for(&pk(2)).collect::<Vec<_>>(), vec![&bio]);

        assert!(list.remove(&a));
        assert!(!list.remove(&a));
        assert_eq!(list.authorities, vec![b]);
    }

    #[test]
    fn test_field_authorities_remove_clears_duplicates() {
        let fa = FieldAuthority::new(Field::Uri, pk(4));
        let mut list = FieldAuthorities::new(vec![fa.clone(), fa.clone()]);
        assert!(list.remove(&fa));
        assert!(list.is_empty());
    }

    #[test]
    fn test_field_authority_serde_uses_base58() {
        let fa = FieldAuthority::new(Field::Name, pk(1));
        let json = serde_json::to_value(&fa).unwrap();
        assert_eq!(json["field"], "name");
        assert_eq!(json["authority"], pk(1).to_string());
        let back: FieldAuthority = serde_json::from_value(json).unwrap();
        assert_eq!(back, fa);
    }
}
