//! Integration tests for the vault's store/resolve pipeline.
//!
//! These cover the pre-flight credential checks the router relies on:
//! tenant isolation, provider binding, schema validation, and tamper
//! detection.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use strato_contract::{CredentialPayload, SecretString};
use strato_core::{CredentialId, ProviderKey, WorkspaceId};
use strato_vault::{
    Credential, CredentialRepository, CredentialVault, CryptoError, EncryptionKey,
    MemoryCredentialRepository, VaultError,
};

fn test_vault() -> (CredentialVault, Arc<MemoryCredentialRepository>) {
    let repository = Arc::new(MemoryCredentialRepository::new());
    let vault = CredentialVault::new(
        EncryptionKey::from_bytes([1u8; 32]),
        Arc::clone(&repository) as Arc<dyn CredentialRepository>,
    );
    (vault, repository)
}

fn aws_payload() -> CredentialPayload {
    CredentialPayload::AwsAccessKey {
        access_key_id: "AKIAEXAMPLE".into(),
        secret_access_key: SecretString::new("wJalrXUtnFEMI"),
        session_token: None,
    }
}

#[tokio::test]
async fn store_then_resolve_roundtrip() {
    // GIVEN: a stored AWS credential
    let (vault, _repo) = test_vault();
    let workspace = WorkspaceId::v4();
    let provider: ProviderKey = "aws".parse().unwrap();
    let stored = vault.store(workspace, provider.clone(), &aws_payload()).await.unwrap();

    // WHEN: the same workspace resolves it for the same provider
    let resolved = vault.resolve(workspace, &provider, stored.id).await.unwrap();

    // THEN: the payload round-trips with its family intact
    assert_eq!(resolved.family(), "aws_access_key");
    match resolved {
        CredentialPayload::AwsAccessKey { access_key_id, secret_access_key, .. } => {
            assert_eq!(access_key_id, "AKIAEXAMPLE");
            assert_eq!(secret_access_key.expose(), "wJalrXUtnFEMI");
        }
        other => panic!("unexpected family: {}", other.family()),
    }
}

#[tokio::test]
async fn only_ciphertext_is_persisted() {
    // GIVEN: a stored credential
    let (vault, repo) = test_vault();
    let workspace = WorkspaceId::v4();
    let provider: ProviderKey = "aws".parse().unwrap();
    let stored = vault.store(workspace, provider, &aws_payload()).await.unwrap();

    // THEN: the persisted record contains no plaintext secret material
    let record = repo.get(workspace, stored.id).await.unwrap().unwrap();
    let serialized = serde_json::to_string(&record).unwrap();
    assert!(!serialized.contains("wJalrXUtnFEMI"));
    assert!(!serialized.contains("AKIAEXAMPLE"));
}

#[tokio::test]
async fn cross_workspace_lookup_is_not_found() {
    // GIVEN: a credential owned by workspace A
    let (vault, _repo) = test_vault();
    let owner = WorkspaceId::v4();
    let provider: ProviderKey = "aws".parse().unwrap();
    let stored = vault.store(owner, provider.clone(), &aws_payload()).await.unwrap();

    // WHEN: workspace B tries to resolve it
    let intruder = WorkspaceId::v4();
    let err = vault.resolve(intruder, &provider, stored.id).await.unwrap_err();

    // THEN: the vault reports NotFound, not a mismatch — no existence oracle
    assert!(matches!(err, VaultError::NotFound { .. }), "got: {err}");
}

#[tokio::test]
async fn provider_mismatch_fails_before_decryption() {
    // GIVEN: a credential bound to "aws" whose ciphertext has been corrupted
    let (vault, repo) = test_vault();
    let workspace = WorkspaceId::v4();
    let aws: ProviderKey = "aws".parse().unwrap();
    let stored = vault.store(workspace, aws.clone(), &aws_payload()).await.unwrap();

    let mut record = repo.get(workspace, stored.id).await.unwrap().unwrap();
    record.data.ciphertext[0] ^= 0xff;
    repo.put(record).await.unwrap();

    // WHEN: a dispatch targets "gcp" with that credential
    let gcp: ProviderKey = "gcp".parse().unwrap();
    let err = vault.resolve(workspace, &gcp, stored.id).await.unwrap_err();

    // THEN: the mismatch wins — decryption was never attempted, or the
    // corruption would have surfaced as a crypto error instead
    assert!(matches!(err, VaultError::ProviderMismatch { .. }), "got: {err}");
}

#[tokio::test]
async fn tampered_ciphertext_fails_decryption() {
    // GIVEN: a stored credential whose tag has been flipped
    let (vault, repo) = test_vault();
    let workspace = WorkspaceId::v4();
    let provider: ProviderKey = "aws".parse().unwrap();
    let stored = vault.store(workspace, provider.clone(), &aws_payload()).await.unwrap();

    let mut record = repo.get(workspace, stored.id).await.unwrap().unwrap();
    record.data.tag[0] ^= 0x01;
    repo.put(record).await.unwrap();

    // WHEN / THEN: resolution fails with a typed crypto error
    let err = vault.resolve(workspace, &provider, stored.id).await.unwrap_err();
    assert!(
        matches!(err, VaultError::Crypto(CryptoError::DecryptionFailed)),
        "got: {err}"
    );
}

#[rstest]
#[case::azure_empty_client_id(
    "azure",
    CredentialPayload::AzureServicePrincipal {
        subscription_id: "sub-1".into(),
        tenant_id: "tenant-1".into(),
        client_id: String::new(),
        client_secret: SecretString::new("s3cr3t"),
    }
)]
#[case::aws_empty_secret(
    "aws",
    CredentialPayload::AwsAccessKey {
        access_key_id: "AKIAEXAMPLE".into(),
        secret_access_key: SecretString::new(""),
        session_token: None,
    }
)]
#[case::gcp_empty_private_key(
    "gcp",
    CredentialPayload::GcpServiceAccount {
        project_id: "proj".into(),
        client_email: "svc@proj.iam".into(),
        private_key: SecretString::new(""),
    }
)]
#[case::token_empty("vultr", CredentialPayload::ApiToken {
    token: SecretString::new(""),
    endpoint: None,
})]
#[tokio::test]
async fn incomplete_payload_rejected_at_store(
    #[case] provider: &str,
    #[case] payload: CredentialPayload,
) {
    // GIVEN: a payload with an empty required field
    let (vault, repo) = test_vault();
    let workspace = WorkspaceId::v4();
    let provider: ProviderKey = provider.parse().unwrap();

    // WHEN / THEN: store rejects it and nothing is persisted
    let err = vault.store(workspace, provider, &payload).await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidPayload { .. }), "got: {err}");
    assert!(repo.is_empty());
}

#[tokio::test]
async fn stored_record_that_fails_schema_is_rejected_at_resolve() {
    // GIVEN: a record encrypted out-of-band whose payload is valid JSON of a
    // known family but missing a required field
    let (vault, repo) = test_vault();
    let workspace = WorkspaceId::v4();
    let provider: ProviderKey = "gcp".parse().unwrap();

    let key = EncryptionKey::from_bytes([1u8; 32]);
    let raw = serde_json::json!({
        "family": "gcp_service_account",
        "project_id": "proj",
        "client_email": "",
        "private_key": "pk",
    });
    let data = strato_vault::encrypt(&key, &serde_json::to_vec(&raw).unwrap()).unwrap();
    let record = Credential::new(workspace, provider.clone(), data);
    let id = record.id;
    repo.put(record).await.unwrap();

    // WHEN / THEN: resolve fails schema validation, not deserialization
    let err = vault.resolve(workspace, &provider, id).await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidPayload { .. }), "got: {err}");
}

#[tokio::test]
async fn delete_and_list() {
    let (vault, _repo) = test_vault();
    let workspace = WorkspaceId::v4();
    let provider: ProviderKey = "aws".parse().unwrap();
    let stored = vault.store(workspace, provider, &aws_payload()).await.unwrap();

    assert_eq!(vault.list(workspace).await.unwrap().len(), 1);
    assert!(vault.delete(workspace, stored.id).await.unwrap());
    assert!(!vault.delete(workspace, stored.id).await.unwrap());
    assert!(vault.list(workspace).await.unwrap().is_empty());

    // Unknown id resolves to NotFound.
    let err = vault
        .resolve(workspace, &"aws".parse().unwrap(), CredentialId::v4())
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::NotFound { .. }));
}
