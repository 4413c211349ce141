//! Utility functions for the field authority SDK.
//!
//! This module provides the borsh encode/decode helpers shared by every codec,
//! translating I/O errors into positional [`SdkError`]s.

use std::io;

use borsh::{BorshDeserialize, BorshSerialize};
use thiserror::Error;

use crate::program::constants::PUBKEY_LEN;
use crate::program::error::{SdkError, SdkResult};
use solana_pubkey::Pubkey;

/// Raised from inside `Field` deserialization and recovered by [`decode_prefix`].
#[derive(Debug, Error)]
#[error("unknown field tag {0}")]
pub(crate) struct UnknownTag(pub u8);

/// Wrap an unknown field tag so it survives the borsh reader boundary.
pub(crate) fn unknown_tag_error(tag: u8) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, UnknownTag(tag))
}

fn map_io_error(err: io::Error, consumed: usize) -> SdkError {
    if let Some(UnknownTag(tag)) = err.get_ref().and_then(|e| e.downcast_ref::<UnknownTag>()) {
        // The tag byte itself has already been consumed.
        return SdkError::UnknownFieldTag {
            tag: *tag,
            offset: consumed.saturating_sub(1),
        };
    }
    let reason = match err.kind() {
        io::ErrorKind::UnexpectedEof => "unexpected end of data".to_string(),
        _ => err.to_string(),
    };
    SdkError::Decode {
        offset: consumed,
        reason,
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Serialize a value with borsh.
pub fn encode<T: BorshSerialize>(value: &T) -> SdkResult<Vec<u8>> {
    borsh::to_vec(value).map_err(|e| SdkError::Serialization(e.to_string()))
}

/// Serialize a value with borsh, appending to `buf`.
pub fn encode_into<T: BorshSerialize>(buf: &mut Vec<u8>, value: &T) -> SdkResult<()> {
    value
        .serialize(buf)
        .map_err(|e| SdkError::Serialization(e.to_string()))
}

/// Encoded size of a u32-length-prefixed UTF-8 string.
pub fn string_len(s: &str) -> usize {
    4 + s.len()
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode one value from the front of `data`.
///
/// Returns the value and the number of bytes consumed. Trailing bytes are left
/// for the caller.
pub fn decode_prefix<T: BorshDeserialize>(data: &[u8]) -> SdkResult<(T, usize)> {
    let mut cursor = data;
    match T::deserialize(&mut cursor) {
        Ok(value) => Ok((value, data.len() - cursor.len())),
        Err(err) => Err(map_io_error(err, data.len() - cursor.len())),
    }
}

/// Decode exactly one value spanning all of `data`.
pub fn decode_exact<T: BorshDeserialize>(data: &[u8]) -> SdkResult<T> {
    let (value, consumed) = decode_prefix(data)?;
    if consumed != data.len() {
        return Err(SdkError::Decode {
            offset: consumed,
            reason: format!("{} trailing byte(s)", data.len() - consumed),
        });
    }
    Ok(value)
}

/// Read a raw 32-byte address at `offset`.
pub fn read_pubkey(data: &[u8], offset: usize) -> SdkResult<Pubkey> {
    let end = offset.checked_add(PUBKEY_LEN).ok_or(SdkError::Overflow)?;
    let bytes = data.get(offset..end).ok_or(SdkError::InvalidDataLength {
        expected: end,
        actual: data.len(),
    })?;
    let mut arr = [0u8; PUBKEY_LEN];
    arr.copy_from_slice(bytes);
    Ok(Pubkey::new_from_array(arr))
}
