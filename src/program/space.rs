//! Account space and rent calculations.
//!
//! Sizes are exact: each present TLV region costs its header plus the packed
//! payload length.

use solana_rent::Rent;

use crate::program::accounts::{TokenMetadata, TokenMetadataExt};
use crate::program::constants::FIELD_AUTHORITY_ACCOUNT_SIZE;
use crate::program::error::{SdkError, SdkResult};
use crate::program::tlv::{LengthWidth, TlvLayout};
use crate::program::types::{FieldAuthorities, FieldAuthority};

/// Source of the rent-exempt minimum balance for a data length.
pub trait MinimumBalance {
    fn minimum_balance(&self, data_len: usize) -> u64;
}

impl MinimumBalance for Rent {
    fn minimum_balance(&self, data_len: usize) -> u64 {
        Rent::minimum_balance(self, data_len)
    }
}

impl<F> MinimumBalance for F
where
    F: Fn(usize) -> u64,
{
    fn minimum_balance(&self, data_len: usize) -> u64 {
        self(data_len)
    }
}

/// Space to allocate and lamports to fund.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceRent {
    pub space: usize,
    pub lamports: u64,
}

fn region_len(layout: &TlvLayout, payload_len: usize) -> SdkResult<usize> {
    let max = match layout.length_width {
        LengthWidth::U16 => u16::MAX as u64,
        LengthWidth::U32 => u32::MAX as u64,
        LengthWidth::U64 => u64::MAX,
    };
    if payload_len as u64 > max {
        return Err(SdkError::Overflow);
    }
    Ok(layout.entry_len(payload_len))
}

/// Space of the metadata account's TLV regions under `layout`.
pub fn size_of_in(
    layout: &TlvLayout,
    metadata: Option<&TokenMetadata>,
    authorities: Option<&FieldAuthorities>,
) -> SdkResult<usize> {
    let mut total = layout.offset;
    if let Some(metadata) = metadata {
        total = total
            .checked_add(region_len(layout, metadata.packed_len()?)?)
            .ok_or(SdkError::Overflow)?;
    }
    if let Some(authorities) = authorities {
        total = total
            .checked_add(region_len(layout, authorities.packed_len())?)
            .ok_or(SdkError::Overflow)?;
    }
    Ok(total)
}

/// Space of the metadata account's TLV regions: `8 + 4 + payload` per present region.
pub fn size_of(
    metadata: Option<&TokenMetadata>,
    authorities: Option<&FieldAuthorities>,
) -> SdkResult<usize> {
    size_of_in(&TlvLayout::default(), metadata, authorities)
}

/// Rent-exempt minimum for `len` bytes.
pub fn rent_for(len: usize, rent: &impl MinimumBalance) -> u64 {
    rent.minimum_balance(len)
}

/// Space and funding for a metadata account.
///
/// Allocates for `current`. Funds for the larger of `current` and
/// `prospective`, the metadata after a pending field update.
pub fn metadata_account_space(
    current: &TokenMetadata,
    prospective: Option<&TokenMetadata>,
    authorities: Option<&FieldAuthorities>,
    rent: &impl MinimumBalance,
) -> SdkResult<SpaceRent> {
    let space = size_of(Some(current), authorities)?;
    let funded = match prospective {
        Some(prospective) => space.max(size_of(Some(prospective), authorities)?),
        None => space,
    };
    Ok(SpaceRent {
        space,
        lamports: rent_for(funded, rent),
    })
}

/// Space of a V1 field authority record.
pub fn field_authority_record_space() -> usize {
    FIELD_AUTHORITY_ACCOUNT_SIZE
}

/// Space and rent of a V1 field authority record.
pub fn field_authority_record_rent(rent: &impl MinimumBalance) -> SpaceRent {
    let space = field_authority_record_space();
    SpaceRent {
        space,
        lamports: rent_for(space, rent),
    }
}

/// Bytes the metadata account grows by when `field_authority` is added.
///
/// Adding to an absent list creates the region; an existing pair adds nothing.
pub fn authorities_growth_in(
    layout: &TlvLayout,
    authorities: Option<&FieldAuthorities>,
    field_authority: &FieldAuthority,
) -> usize {
    match authorities {
        Some(list) if list.contains(field_authority) => 0,
        Some(_) => field_authority.encoded_len(),
        None => {
            layout.entry_len(FieldAuthorities::default().packed_len())
                + field_authority.encoded_len()
        }
    }
}

/// [`authorities_growth_in`] under the default layout.
pub fn authorities_growth(
    authorities: Option<&FieldAuthorities>,
    field_authority: &FieldAuthority,
) -> usize {
    authorities_growth_in(&TlvLayout::default(), authorities, field_authority)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::accounts::build_metadata_account_data;
    use crate::program::types::Field;
    use solana_pubkey::Pubkey;
    use spl_pod::optional_keys::OptionalNonZeroPubkey;

    fn pk(n: u8) -> Pubkey {
        Pubkey::new_from_array([n; 32])
    }

    fn metadata() -> TokenMetadata {
        TokenMetadata {
            update_authority: OptionalNonZeroPubkey(pk(1)),
            mint: pk(2),
            name: "Name".to_string(),
            symbol: "SYM".to_string(),
            uri: "uri".to_string(),
            additional_metadata: vec![],
        }
    }

    #[test]
    fn test_size_of_matches_account_image() {
        let md = metadata();
        let list = FieldAuthorities::new(vec![
            FieldAuthority::new(Field::Name, pk(3)),
            FieldAuthority::new(Field::key("bio"), pk(4)),
        ]);
        let layout = TlvLayout::default();

        for authorities in [None, Some(&list)] {
            let image = build_metadata_account_data(&md, authorities, &layout).unwrap();
            assert_eq!(size_of(Some(&md), authorities).unwrap(), image.len());
        }
    }

    #[test]
    fn test_size_of_regions() {
        assert_eq!(size_of(None, None).unwrap(), 0);
        assert_eq!(size_of(None, Some(&FieldAuthorities::default())).unwrap(), 12 + 4);
        assert_eq!(
            size_of(Some(&metadata()), None).unwrap(),
            12 + metadata().packed_len().unwrap()
        );
        let empty = FieldAuthorities::default();
        assert_eq!(
            size_of_in(&TlvLayout::with_header(8), None, Some(&empty)).unwrap(),
            8 + 16
        );
    }

    #[test]
    fn test_growth_per_authority() {
        let mut list = FieldAuthorities::default();
        let mut previous = size_of(None, Some(&list)).unwrap();
        let fields = [Field::Name, Field::Symbol, Field::key("website")];
        for (i, field) in fields.into_iter().enumerate() {
            let fa = FieldAuthority::new(field, pk(i as u8 + 10));
            let growth = authorities_growth(Some(&list), &fa);
            list.add(fa.clone());
            let current = size_of(None, Some(&list)).unwrap();
            assert_eq!(current - previous, fa.encoded_len());
            assert_eq!(growth, fa.encoded_len());
            previous = current;
        }

        let existing = list.authorities[0].clone();
        assert_eq!(authorities_growth(Some(&list), &existing), 0);

        let fa = FieldAuthority::new(Field::Uri, pk(9));
        assert_eq!(authorities_growth(None, &fa), 16 + 33);
    }

    #[test]
    fn test_growth_follows_layout() {
        let fa = FieldAuthority::new(Field::Name, pk(9));
        let list = FieldAuthorities::new(vec![fa.clone()]);

        for layout in [
            TlvLayout::new(0, LengthWidth::U16),
            TlvLayout::default(),
            TlvLayout::new(8, LengthWidth::U64),
        ] {
            let without = size_of_in(&layout, None, None).unwrap();
            let with = size_of_in(&layout, None, Some(&list)).unwrap();
            assert_eq!(authorities_growth_in(&layout, None, &fa), with - without);
        }
        // u16 lengths: 8 + 2 + 4 + 33
        assert_eq!(
            authorities_growth_in(&TlvLayout::new(0, LengthWidth::U16), None, &fa),
            47
        );
    }

    #[test]
    fn test_rent_delegates_to_collaborator() {
        let per_byte = |len: usize| len as u64 * 10;
        assert_eq!(rent_for(32, &per_byte), 320);
        assert_eq!(field_authority_record_rent(&per_byte), SpaceRent { space: 32, lamports: 320 });

        let rent = Rent::default();
        assert_eq!(rent_for(100, &rent), rent.minimum_balance(100));
        assert!(rent_for(200, &rent) > rent_for(100, &rent));
    }

    #[test]
    fn test_metadata_account_space_funds_prospective() {
        let per_byte = |len: usize| len as u64;
        let current = metadata();
        let prospective = current.with_update(&Field::key("twitter"), "@handle");

        let sr = metadata_account_space(&current, Some(&prospective), None, &per_byte).unwrap();
        assert_eq!(sr.space, size_of(Some(&current), None).unwrap());
        assert_eq!(sr.lamports, size_of(Some(&prospective), None).unwrap() as u64);

        let same = metadata_account_space(&current, None, None, &per_byte).unwrap();
        assert_eq!(same.lamports, same.space as u64);
    }
}
