//! Async client for reading field authority state.
//!
//! This module fetches raw account bytes over RPC and decodes them with the
//! account readers. It never signs or sends transactions.

use std::collections::HashMap;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_instruction::Instruction;
use solana_pubkey::Pubkey;

use crate::config::{Commitment, FieldAuthorityConfig};
use crate::program::accounts::{FieldAuthorityAccount, MetadataAccount, TokenMetadata};
use crate::program::error::{SdkError, SdkResult};
use crate::program::instructions::build_ensure_rent_ix;
use crate::program::pda::get_field_authority_pda;
use crate::program::store::AuthorityStore;
use crate::program::tlv::TlvLayout;
use crate::program::types::{Field, FieldAuthorities};

impl From<Commitment> for CommitmentConfig {
    fn from(commitment: Commitment) -> Self {
        match commitment {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

/// Client for reading field authority state.
pub struct FieldAuthorityClient {
    /// RPC client for Solana
    pub rpc_client: RpcClient,
    /// Program ID
    pub program_id: Pubkey,
    /// TLV layout of metadata accounts
    pub layout: TlvLayout,
}

impl FieldAuthorityClient {
    /// Create a new client.
    pub fn new(rpc_url: &str, program_id: Pubkey) -> Self {
        Self {
            rpc_client: RpcClient::new_with_commitment(
                rpc_url.to_string(),
                CommitmentConfig::confirmed(),
            ),
            program_id,
            layout: TlvLayout::default(),
        }
    }

    /// Create a new client from configuration.
    pub fn from_config(config: &FieldAuthorityConfig) -> Self {
        Self {
            rpc_client: RpcClient::new_with_commitment(
                config.rpc_url.clone(),
                config.commitment.into(),
            ),
            program_id: config.program_id,
            layout: config.layout(),
        }
    }

    /// Create a new client with existing RpcClient.
    pub fn from_rpc_client(rpc_client: RpcClient, program_id: Pubkey) -> Self {
        Self {
            rpc_client,
            program_id,
            layout: TlvLayout::default(),
        }
    }

    /// Use a non-default metadata account layout.
    pub fn with_layout(mut self, layout: TlvLayout) -> Self {
        self.layout = layout;
        self
    }

    // ========================================================================
    // Account Fetchers
    // ========================================================================

    /// Fetch raw account data (returns None if the account does not exist).
    pub async fn get_account_data(&self, address: &Pubkey) -> SdkResult<Option<Vec<u8>>> {
        let response = self
            .rpc_client
            .get_account_with_commitment(address, self.rpc_client.commitment())
            .await?;
        tracing::debug!(
            %address,
            slot = response.context.slot,
            found = response.value.is_some(),
            "fetched account"
        );
        Ok(response.value.map(|account| account.data))
    }

    async fn require_account_data(&self, address: &Pubkey, what: &str) -> SdkResult<Vec<u8>> {
        self.get_account_data(address)
            .await?
            .ok_or_else(|| SdkError::NotFound(format!("{what}: {address}")))
    }

    /// Fetch the token metadata stored in a metadata account.
    pub async fn get_token_metadata(&self, metadata: &Pubkey) -> SdkResult<TokenMetadata> {
        let data = self.require_account_data(metadata, "Metadata account").await?;
        MetadataAccount::new(&data, self.layout).token_metadata()
    }

    /// Fetch the V2 field authorities list (returns None if never initialized).
    pub async fn get_field_authorities(
        &self,
        metadata: &Pubkey,
    ) -> SdkResult<Option<FieldAuthorities>> {
        let data = self.require_account_data(metadata, "Metadata account").await?;
        MetadataAccount::new(&data, self.layout).try_field_authorities()
    }

    /// Fetch a V1 field authority record (returns None if not found).
    pub async fn get_field_authority_record(
        &self,
        field: &Field,
        metadata: &Pubkey,
    ) -> SdkResult<Option<FieldAuthorityAccount>> {
        let (pda, _) = get_field_authority_pda(field, metadata, &self.program_id)?;
        match self.get_account_data(&pda).await? {
            Some(data) => Ok(Some(FieldAuthorityAccount::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    /// Fetch several accounts at once, keyed by address. Missing accounts are omitted.
    pub async fn fetch_snapshot(
        &self,
        addresses: &[Pubkey],
    ) -> SdkResult<HashMap<Pubkey, Vec<u8>>> {
        let accounts = self.rpc_client.get_multiple_accounts(addresses).await?;
        let snapshot: HashMap<Pubkey, Vec<u8>> = addresses
            .iter()
            .zip(accounts)
            .filter_map(|(address, account)| account.map(|a| (*address, a.data)))
            .collect();
        tracing::debug!(
            requested = addresses.len(),
            found = snapshot.len(),
            "fetched account snapshot"
        );
        Ok(snapshot)
    }

    /// Fetch every account a store reads.
    pub async fn fetch_store_snapshot(
        &self,
        store: &dyn AuthorityStore,
    ) -> SdkResult<HashMap<Pubkey, Vec<u8>>> {
        self.fetch_snapshot(&store.addresses_involved()?).await
    }

    /// List a store's authorities from a fresh snapshot.
    pub async fn list_authorities(
        &self,
        store: &dyn AuthorityStore,
    ) -> SdkResult<FieldAuthorities> {
        let snapshot = self.fetch_store_snapshot(store).await?;
        store.list(&snapshot)
    }

    // ========================================================================
    // Rent
    // ========================================================================

    /// Rent-exempt minimum for `data_len` bytes.
    pub async fn minimum_balance(&self, data_len: usize) -> SdkResult<u64> {
        Ok(self
            .rpc_client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }

    /// Build a transfer topping `account` up to the rent-exempt minimum for `data_len`.
    pub async fn ensure_rent_ix(
        &self,
        payer: &Pubkey,
        account: &Pubkey,
        data_len: usize,
    ) -> SdkResult<Option<Instruction>> {
        let required = self.minimum_balance(data_len).await?;
        let current = self.rpc_client.get_balance(account).await?;
        if current < required {
            tracing::debug!(%account, current, required, "account needs a rent top-up");
        }
        Ok(build_ensure_rent_ix(payer, account, current, required))
    }
}
