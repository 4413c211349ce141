//! SDK configuration.
//!
//! Loaded from JSON, from environment variables, or assembled with
//! [`FieldAuthorityConfigBuilder`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_pubkey::Pubkey;

use crate::network::DEFAULT_RPC_URL;
use crate::program::error::{SdkError, SdkResult};
use crate::program::tlv::{LengthWidth, TlvLayout};
use crate::shared::serde_util::pubkey_str;

/// Program ID variable read by [`FieldAuthorityConfig::from_env`].
pub const ENV_PROGRAM_ID: &str = "FIELD_AUTHORITY_PROGRAM_ID";
/// RPC URL variable read by [`FieldAuthorityConfig::from_env`].
pub const ENV_RPC_URL: &str = "FIELD_AUTHORITY_RPC_URL";
/// Commitment variable read by [`FieldAuthorityConfig::from_env`].
pub const ENV_COMMITMENT: &str = "FIELD_AUTHORITY_COMMITMENT";

/// RPC commitment level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl FromStr for Commitment {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(SdkError::Config(format!("unknown commitment \"{other}\""))),
        }
    }
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

/// Program, RPC, and metadata layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAuthorityConfig {
    /// Field authority program
    #[serde(with = "pubkey_str")]
    pub program_id: Pubkey,
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default)]
    pub commitment: Commitment,
    /// Byte offset of the TLV region in metadata accounts
    #[serde(default)]
    pub tlv_offset: usize,
    #[serde(default)]
    pub length_width: LengthWidth,
}

impl FieldAuthorityConfig {
    pub fn builder() -> FieldAuthorityConfigBuilder {
        FieldAuthorityConfigBuilder::default()
    }

    /// TLV layout of metadata accounts.
    pub fn layout(&self) -> TlvLayout {
        TlvLayout::new(self.tlv_offset, self.length_width)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> SdkResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read from `FIELD_AUTHORITY_*` environment variables.
    pub fn from_env() -> SdkResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, keyed by the `ENV_*` names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SdkResult<Self> {
        let program_id = lookup(ENV_PROGRAM_ID)
            .ok_or_else(|| SdkError::Config(format!("{ENV_PROGRAM_ID} is not set")))?;
        let mut builder = Self::builder().program_id_str(&program_id)?;
        if let Some(rpc_url) = lookup(ENV_RPC_URL) {
            builder = builder.rpc_url(&rpc_url);
        }
        if let Some(commitment) = lookup(ENV_COMMITMENT) {
            builder = builder.commitment(commitment.parse()?);
        }
        builder.build()
    }

    pub fn validate(&self) -> SdkResult<()> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "rpc_url must be an http(s) URL, got \"{}\"",
                self.rpc_url
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Builder
// ============================================================================

pub struct FieldAuthorityConfigBuilder {
    program_id: Option<Pubkey>,
    rpc_url: String,
    commitment: Commitment,
    layout: TlvLayout,
}

impl Default for FieldAuthorityConfigBuilder {
    fn default() -> Self {
        Self {
            program_id: None,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            commitment: Commitment::default(),
            layout: TlvLayout::default(),
        }
    }
}

impl FieldAuthorityConfigBuilder {
    pub fn program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = Some(program_id);
        self
    }

    /// Set the program ID from its base58 string.
    pub fn program_id_str(self, program_id: &str) -> SdkResult<Self> {
        let program_id = Pubkey::from_str(program_id)
            .map_err(|e| SdkError::Config(format!("invalid program id {program_id}: {e}")))?;
        Ok(self.program_id(program_id))
    }

    pub fn rpc_url(mut self, url: &str) -> Self {
        self.rpc_url = url.to_string();
        self
    }

    pub fn commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn layout(mut self, layout: TlvLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn build(self) -> SdkResult<FieldAuthorityConfig> {
        let program_id = self
            .program_id
            .ok_or_else(|| SdkError::Config("program_id is required".to_string()))?;
        let config = FieldAuthorityConfig {
            program_id,
            rpc_url: self.rpc_url,
            commitment: self.commitment,
            tlv_offset: self.layout.offset,
            length_width: self.layout.length_width,
        };
        config.validate()?;
        Ok(config)
    }
}
