//! Discriminator-keyed TLV scanning over metadata account data.
//!
//! A metadata account is a sequence of `[discriminator (8)][length][payload]`
//! entries. The scan stops at the end of data, at an all-zero discriminator,
//! or at a zero-filled tail too short for a header.
//!
//! Regions with u32 lengths are read through `spl_type_length_value`'s
//! [`TlvStateBorrowed`]; other widths use the local scanner. The local scanner
//! also pins decode failures to a byte offset.

use serde::{Deserialize, Serialize};
use solana_program_error::ProgramError;
use spl_discriminator::{ArrayDiscriminator, SplDiscriminate};
use spl_type_length_value::error::TlvError;
use spl_type_length_value::state::{TlvState, TlvStateBorrowed};
use spl_type_length_value::variable_len_pack::VariableLenPack;

use crate::program::constants::{
    discriminator_of, Discriminator, DISCRIMINATOR_LEN, UNINITIALIZED_DISCRIMINATOR,
};
use crate::program::error::{SdkError, SdkResult};

// ============================================================================
// Layout
// ============================================================================

/// Width of the little-endian length field following each discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthWidth {
    U16,
    #[default]
    U32,
    U64,
}

impl LengthWidth {
    pub fn bytes(self) -> usize {
        match self {
            LengthWidth::U16 => 2,
            LengthWidth::U32 => 4,
            LengthWidth::U64 => 8,
        }
    }

    /// Read a length of this width from the front of `data`. `data` must be long enough.
    fn read(self, data: &[u8]) -> u64 {
        match self {
            LengthWidth::U16 => u16::from_le_bytes([data[0], data[1]]) as u64,
            LengthWidth::U32 => u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as u64,
            LengthWidth::U64 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&data[..8]);
                u64::from_le_bytes(buf)
            }
        }
    }

    fn write(self, buf: &mut Vec<u8>, len: usize) -> SdkResult<()> {
        match self {
            LengthWidth::U16 => {
                let len = u16::try_from(len).map_err(|_| SdkError::Overflow)?;
                buf.extend_from_slice(&len.to_le_bytes());
            }
            LengthWidth::U32 => {
                let len = u32::try_from(len).map_err(|_| SdkError::Overflow)?;
                buf.extend_from_slice(&len.to_le_bytes());
            }
            LengthWidth::U64 => {
                let len = u64::try_from(len).map_err(|_| SdkError::Overflow)?;
                buf.extend_from_slice(&len.to_le_bytes());
            }
        }
        Ok(())
    }
}

/// Where the TLV region starts and how wide its length fields are.
///
/// The default (offset 0, u32 lengths) matches metadata accounts written by the
/// token metadata interface, whose first 8 bytes are the first entry's
/// discriminator. Use [`TlvLayout::with_header`] for accounts carrying a fixed
/// prefix before the TLV region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlvLayout {
    pub offset: usize,
    pub length_width: LengthWidth,
}

impl TlvLayout {
    pub fn new(offset: usize, length_width: LengthWidth) -> Self {
        Self {
            offset,
            length_width,
        }
    }

    /// Default u32 lengths, starting after a `header`-byte prefix.
    pub fn with_header(header: usize) -> Self {
        Self {
            offset: header,
            length_width: LengthWidth::U32,
        }
    }

    /// Discriminator plus length field.
    pub fn header_len(&self) -> usize {
        DISCRIMINATOR_LEN + self.length_width.bytes()
    }

    /// Full size of an entry carrying `payload_len` bytes.
    pub fn entry_len(&self, payload_len: usize) -> usize {
        self.header_len() + payload_len
    }
}

// ============================================================================
// Entries
// ============================================================================

/// One TLV entry, borrowed from the account data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvEntry<'a> {
    pub discriminator: Discriminator,
    /// Offset of the discriminator within the account data
    pub offset: usize,
    pub payload: &'a [u8],
}

impl TlvEntry<'_> {
    /// Offset of the payload within the account data.
    pub fn payload_offset(&self, layout: &TlvLayout) -> usize {
        self.offset + layout.header_len()
    }

    /// Offset one past this entry's payload.
    pub fn end(&self, layout: &TlvLayout) -> usize {
        self.payload_offset(layout) + self.payload.len()
    }
}

/// Iterator over the TLV entries of an account.
///
/// Yields an error once and then stops if the data is malformed.
pub struct TlvEntries<'a> {
    data: &'a [u8],
    layout: TlvLayout,
    cursor: usize,
    done: bool,
}

impl<'a> TlvEntries<'a> {
    fn next_entry(&mut self) -> SdkResult<Option<TlvEntry<'a>>> {
        let offset = self.cursor;
        if offset > self.data.len() {
            return Err(SdkError::Decode {
                offset,
                reason: format!("TLV region starts past the end of {} byte(s)", self.data.len()),
            });
        }
        let remaining = self.data.len() - offset;
        if remaining == 0 {
            return Ok(None);
        }

        let rest = &self.data[offset..];
        if remaining < DISCRIMINATOR_LEN {
            if rest.iter().all(|b| *b == 0) {
                tracing::trace!(offset, remaining, "TLV scan stopped at zero-filled tail");
                return Ok(None);
            }
            return Err(SdkError::Decode {
                offset,
                reason: format!("{remaining} byte(s) remain, too short for a discriminator"),
            });
        }

        let mut discriminator = [0u8; DISCRIMINATOR_LEN];
        discriminator.copy_from_slice(&rest[..DISCRIMINATOR_LEN]);
        if discriminator == UNINITIALIZED_DISCRIMINATOR {
            tracing::trace!(offset, "TLV scan stopped at uninitialized discriminator");
            return Ok(None);
        }

        let header_len = self.layout.header_len();
        if remaining < header_len {
            return Err(SdkError::Decode {
                offset,
                reason: format!("{remaining} byte(s) remain, entry header needs {header_len}"),
            });
        }

        let declared = self.layout.length_width.read(&rest[DISCRIMINATOR_LEN..]);
        let available = remaining - header_len;
        let len = usize::try_from(declared)
            .ok()
            .filter(|len| *len <= available)
            .ok_or_else(|| SdkError::Decode {
                offset,
                reason: format!(
                    "entry declares {declared} payload byte(s) but only {available} remain"
                ),
            })?;

        let payload_start = offset + header_len;
        self.cursor = payload_start + len;
        Ok(Some(TlvEntry {
            discriminator,
            offset,
            payload: &self.data[payload_start..payload_start + len],
        }))
    }
}

impl<'a> Iterator for TlvEntries<'a> {
    type Item = SdkResult<TlvEntry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Read-only view over the TLV region of account data.
#[derive(Debug, Clone, Copy)]
pub struct TlvReader<'a> {
    data: &'a [u8],
    layout: TlvLayout,
}

impl<'a> TlvReader<'a> {
    pub fn new(data: &'a [u8], layout: TlvLayout) -> Self {
        Self { data, layout }
    }

    pub fn layout(&self) -> TlvLayout {
        self.layout
    }

    pub fn entries(&self) -> TlvEntries<'a> {
        TlvEntries {
            data: self.data,
            layout: self.layout,
            cursor: self.layout.offset,
            done: false,
        }
    }

    /// The TLV region, from the layout offset to the end of data.
    fn region(&self) -> SdkResult<&'a [u8]> {
        self.data.get(self.layout.offset..).ok_or_else(|| SdkError::Decode {
            offset: self.layout.offset,
            reason: format!("TLV region starts past the end of {} byte(s)", self.data.len()),
        })
    }

    /// Interface TLV state over the region, for u32-length layouts.
    fn state(&self) -> SdkResult<Option<TlvStateBorrowed<'a>>> {
        if self.layout.length_width != LengthWidth::U32 {
            return Ok(None);
        }
        let region = self.region()?;
        TlvStateBorrowed::unpack(region)
            .map(Some)
            .map_err(|err| self.locate(err))
    }

    /// Pin a TLV state error to the first malformed entry.
    fn locate(&self, err: ProgramError) -> SdkError {
        match self.entries().find_map(Result::err) {
            Some(located) => located,
            None => SdkError::Decode {
                offset: self.layout.offset,
                reason: err.to_string(),
            },
        }
    }

    /// Check that the whole region is well-formed.
    pub fn validate(&self) -> SdkResult<()> {
        if self.state()?.is_some() {
            return Ok(());
        }
        self.entries().try_for_each(|entry| entry.map(drop))
    }

    /// First entry with `discriminator`, or `None` if the region holds no match.
    ///
    /// A malformed entry anywhere in the region is an error.
    pub fn find_entry(&self, discriminator: &Discriminator) -> SdkResult<Option<TlvEntry<'a>>> {
        match self.state()? {
            Some(state) => {
                let wanted = ArrayDiscriminator::new(*discriminator);
                let present = state
                    .get_discriminators()
                    .map_err(|err| self.locate(err))?
                    .contains(&wanted);
                if !present {
                    return Ok(None);
                }
            }
            None => self.validate()?,
        }
        for entry in self.entries() {
            let entry = entry?;
            if &entry.discriminator == discriminator {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    /// Payload of the first entry with `discriminator`.
    pub fn find(&self, discriminator: &Discriminator) -> SdkResult<Option<&'a [u8]>> {
        Ok(self.find_entry(discriminator)?.map(|entry| entry.payload))
    }

    /// Like [`TlvReader::find`], but absence is [`SdkError::NotFound`].
    pub fn require(&self, discriminator: &Discriminator) -> SdkResult<&'a [u8]> {
        self.find(discriminator)?.ok_or_else(|| {
            SdkError::NotFound(format!("TLV entry {}", hex::encode(discriminator)))
        })
    }

    /// First value of type `V`, unpacked with its interface codec.
    ///
    /// Unpack failures are [`SdkError::Decode`] at the payload offset.
    pub fn value<V: SplDiscriminate + VariableLenPack>(&self) -> SdkResult<Option<V>> {
        let discriminator = discriminator_of::<V>();
        let Some(state) = self.state()? else {
            return match self.find_entry(&discriminator)? {
                Some(entry) => V::unpack_from_slice(entry.payload)
                    .map(Some)
                    .map_err(|err| self.payload_error(&entry, err)),
                None => Ok(None),
            };
        };
        match state.get_first_variable_len_value::<V>() {
            Ok(value) => Ok(Some(value)),
            Err(err) if err == ProgramError::from(TlvError::TypeNotFound) => Ok(None),
            Err(err) => match self.find_entry(&discriminator)? {
                Some(entry) => Err(self.payload_error(&entry, err)),
                None => Err(self.locate(err)),
            },
        }
    }

    fn payload_error(&self, entry: &TlvEntry<'a>, err: ProgramError) -> SdkError {
        SdkError::Decode {
            offset: entry.payload_offset(&self.layout),
            reason: err.to_string(),
        }
    }

    /// Discriminators of every entry, in order.
    pub fn discriminators(&self) -> SdkResult<Vec<Discriminator>> {
        match self.state()? {
            Some(state) => Ok(state
                .get_discriminators()
                .map_err(|err| self.locate(err))?
                .iter()
                .map(|discriminator| {
                    let mut bytes = [0u8; DISCRIMINATOR_LEN];
                    bytes.copy_from_slice(discriminator.as_slice());
                    bytes
                })
                .collect()),
            None => self
                .entries()
                .map(|entry| entry.map(|e| e.discriminator))
                .collect(),
        }
    }

    /// Offset one past the last initialized entry.
    pub fn initialized_len(&self) -> SdkResult<usize> {
        let mut end = self.layout.offset.min(self.data.len());
        for entry in self.entries() {
            end = entry?.end(&self.layout);
        }
        Ok(end)
    }
}

// ============================================================================
// Free Functions
// ============================================================================

/// Locate the payload of the first entry with `discriminator`.
pub fn find_entry<'a>(
    data: &'a [u8],
    layout: &TlvLayout,
    discriminator: &Discriminator,
) -> SdkResult<Option<&'a [u8]>> {
    TlvReader::new(data, *layout).find(discriminator)
}

/// Like [`find_entry`], but absence is [`SdkError::NotFound`].
pub fn require_entry<'a>(
    data: &'a [u8],
    layout: &TlvLayout,
    discriminator: &Discriminator,
) -> SdkResult<&'a [u8]> {
    TlvReader::new(data, *layout).require(discriminator)
}

/// Full size of an entry carrying `payload_len` bytes.
pub fn entry_len(layout: &TlvLayout, payload_len: usize) -> usize {
    layout.entry_len(payload_len)
}

/// Build a `[discriminator][length][payload]` entry.
pub fn pack_entry(
    discriminator: &Discriminator,
    layout: &TlvLayout,
    payload: &[u8],
) -> SdkResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(layout.entry_len(payload.len()));
    append_entry(&mut buf, discriminator, layout, payload)?;
    Ok(buf)
}

/// Append a `[discriminator][length][payload]` entry to `buf`.
pub fn append_entry(
    buf: &mut Vec<u8>,
    discriminator: &Discriminator,
    layout: &TlvLayout,
    payload: &[u8],
) -> SdkResult<()> {
    buf.reserve(layout.entry_len(payload.len()));
    buf.extend_from_slice(discriminator);
    layout.length_width.write(buf, payload.len())?;
    buf.extend_from_slice(payload);
    Ok(())
}
