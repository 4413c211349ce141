//! RPC Integration Tests for the field authority SDK
//!
//! These tests read live accounts through an RPC node.
//! Requires:
//! 1. FIELD_AUTHORITY_PROGRAM_ID in .env file
//! 2. FIELD_AUTHORITY_RPC_URL in .env file (defaults to devnet)
//! 3. TEST_METADATA_ACCOUNT in .env file for the metadata tests
//!
//! Run: cargo test --features solana-rpc --test rpc_integration -- --nocapture --ignored

#![cfg(feature = "solana-rpc")]

use std::env;
use std::str::FromStr;

use field_authority_sdk::prelude::*;
use solana_pubkey::Pubkey;

// ============================================================================
// Test Helpers
// ============================================================================

fn load_config() -> Option<FieldAuthorityConfig> {
    dotenvy::dotenv().ok();
    match FieldAuthorityConfig::from_env() {
        Ok(config) => Some(config),
        Err(e) => {
            println!("   Skipping: {}", e);
            None
        }
    }
}

fn test_metadata_account() -> Option<Pubkey> {
    dotenvy::dotenv().ok();
    env::var("TEST_METADATA_ACCOUNT")
        .ok()
        .and_then(|s| Pubkey::from_str(&s).ok())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_minimum_balance_grows_with_size() {
    let Some(config) = load_config() else { return };
    let client = FieldAuthorityClient::from_config(&config);

    let small = client.minimum_balance(32).await.unwrap();
    let large = client.minimum_balance(1024).await.unwrap();
    println!("   32 bytes: {} lamports, 1024 bytes: {} lamports", small, large);
    assert!(large > small);
}

#[tokio::test]
#[ignore]
async fn test_missing_record_reads_as_none() {
    let Some(config) = load_config() else { return };
    let client = FieldAuthorityClient::from_config(&config);

    // Unused address: no metadata or record lives there
    let metadata = Pubkey::new_from_array([0xfe; 32]);
    let record = client
        .get_field_authority_record(&Field::Name, &metadata)
        .await
        .unwrap();
    assert!(record.is_none());

    let err = client.get_token_metadata(&metadata).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore]
async fn test_read_metadata_account() {
    let Some(config) = load_config() else { return };
    let Some(metadata) = test_metadata_account() else {
        println!("   Skipping: TEST_METADATA_ACCOUNT not set");
        return;
    };
    let client = FieldAuthorityClient::from_config(&config);

    let token_metadata = client.get_token_metadata(&metadata).await.unwrap();
    println!("   Metadata: {} ({})", token_metadata.name, token_metadata.symbol);

    let authorities = client.get_field_authorities(&metadata).await.unwrap();
    println!("   Field authorities: {:?}", authorities);

    let store = TlvAuthorityStore::new(config.program_id, metadata, Pubkey::default())
        .with_layout(config.layout());
    let listed = client.list_authorities(&store).await.unwrap();
    assert_eq!(listed, authorities.unwrap_or_default());
}
