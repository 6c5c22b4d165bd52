//! Engine behavior over the durable sled store, across restarts.

use std::collections::BTreeMap;
use std::sync::Arc;

use lib_engine::{
    AllowAllVerifier, EngineConfig, EngineError, LedgerEngine, OutputSpec, Transaction, TxBody,
};
use lib_ledger::{SledLedgerStore, UtxoMetadata};
use lib_policy::{KycLevel, KycRecord, PolicyConfig, PolicyEngine};
use lib_proofs::HashCommitmentVerifier;
use lib_reserve::{Attestation, ReserveGate};
use lib_types::{Amount, FixedClock, OwnerId, Timestamp, TxId};

const NOW: Timestamp = 1_764_000_000;

fn build_engine(path: &std::path::Path, reserves: Amount) -> LedgerEngine {
    let mut policy = PolicyEngine::new(PolicyConfig::for_testing());
    for owner in ["treasury", "alice", "bob"] {
        policy.register_kyc(OwnerId::new(owner), KycRecord::new(KycLevel::Level3, "US"));
    }
    let engine = LedgerEngine::new(
        Arc::new(SledLedgerStore::open(path).unwrap()),
        EngineConfig::for_testing(),
        policy,
        ReserveGate::default(),
        Arc::new(AllowAllVerifier),
        Arc::new(HashCommitmentVerifier),
        Arc::new(FixedClock::new(NOW)),
    )
    .unwrap();
    engine.attest_reserve(Attestation {
        verified_reserves: reserves,
        attested_at: NOW,
        commitment: "SHA256:audit".to_string(),
    });
    engine
}

fn signed(tx_id: &str, body: TxBody, signers: &[&str]) -> Transaction {
    let mut signatures = BTreeMap::new();
    for signer in signers {
        signatures.insert(OwnerId::new(*signer), vec![7u8; 64]);
    }
    Transaction {
        tx_id: TxId::new(tx_id),
        timestamp: NOW,
        policy_ref: "POLICY_V1.0".to_string(),
        body,
        signatures,
    }
}

fn output(owner: &str, amount: Amount) -> OutputSpec {
    OutputSpec {
        owner_id: OwnerId::new(owner),
        amount,
        asset_code: "GENUSD".to_string(),
        kyc_tag: KycLevel::Level2,
        metadata: UtxoMetadata::new("US", "POLICY_V1.0"),
    }
}

#[test]
fn state_survives_restart_and_supply_rehydrates() {
    let dir = tempfile::tempdir().unwrap();
    let created = {
        let engine = build_engine(dir.path(), 200_000);
        engine
            .submit(&signed(
                "MINT1",
                TxBody::Mint {
                    outputs: vec![output("alice", 150_000)],
                },
                &["treasury"],
            ))
            .unwrap()
            .created
    };

    let engine = build_engine(dir.path(), 200_000);
    assert_eq!(engine.get_total_supply().unwrap(), 150_000);
    assert_eq!(engine.get_balance(&OwnerId::new("alice")).unwrap(), 150_000);
    assert_eq!(engine.get_history(&OwnerId::new("alice")).unwrap().len(), 1);
    assert!(engine.get_utxo(&created[0]).unwrap().is_some());

    // the rehydrated supply counts against reserves
    let over = engine.submit(&signed(
        "MINT2",
        TxBody::Mint {
            outputs: vec![output("alice", 100_000)],
        },
        &["treasury"],
    ));
    assert!(matches!(over, Err(EngineError::Reserve(_))));

    // and the committed tx id stays taken
    let replay = engine.submit(&signed(
        "MINT1",
        TxBody::Mint {
            outputs: vec![output("alice", 1_000)],
        },
        &["treasury"],
    ));
    assert!(matches!(replay, Err(EngineError::DuplicateTransaction(_))));
}

#[test]
fn spend_and_burn_over_sled() {
    let dir = tempfile::tempdir().unwrap();
    let engine = build_engine(dir.path(), 1_000_000);
    let inputs = engine
        .submit(&signed(
            "MINT1",
            TxBody::Mint {
                outputs: vec![output("alice", 600)],
            },
            &["treasury"],
        ))
        .unwrap()
        .created;

    engine
        .submit(&signed(
            "T1",
            TxBody::Transfer {
                inputs,
                outputs: vec![output("bob", 400), output("alice", 200)],
            },
            &["alice"],
        ))
        .unwrap();
    assert_eq!(engine.get_balance(&OwnerId::new("bob")).unwrap(), 400);
    assert_eq!(engine.get_balance(&OwnerId::new("alice")).unwrap(), 200);

    let bob_utxos = engine.owner_utxos(&OwnerId::new("bob")).unwrap();
    engine
        .submit(&signed(
            "B1",
            TxBody::Burn {
                inputs: bob_utxos.into_iter().map(|u| u.utxo_id).collect(),
            },
            &["bob"],
        ))
        .unwrap();
    assert_eq!(engine.get_total_supply().unwrap(), 200);
}
