//! Transaction Validator
//!
//! Pure function from (ledger snapshot, proposed transaction) to an accepted
//! delta or a reject reason. No state is mutated here; the caller commits
//! the delta through the store and only then charges policy counters and
//! supply.
//!
//! # Key Rules
//!
//! 1. **Checks run in a fixed order and short-circuit**: schema, then
//!    existence/status, then authorization, then compliance, then the
//!    variant's business rule
//! 2. **Deterministic**: the same snapshot and transaction always produce
//!    the same outcome, so conflicted submissions can be re-validated
//! 3. **The read set covers every input**: commit re-checks those versions
//!    atomically

use std::collections::{BTreeMap, HashSet};

use lib_ledger::{LedgerDelta, LedgerStore, ReadSetEntry, Utxo, UtxoStatus};
use lib_policy::{KycLevel, PolicyEngine, PolicyError};
use lib_reserve::ReserveGate;
use lib_types::{Amount, OwnerId, Timestamp, UtxoId};

use crate::auth::SignatureVerifier;
use crate::config::EngineConfig;
use crate::errors::{EngineError, EngineResult};
use crate::tx::{Transaction, TxBody};

/// A fully validated transaction, ready to commit.
#[derive(Debug, Clone)]
pub struct Accepted {
    pub delta: LedgerDelta,
    pub read_set: Vec<ReadSetEntry>,
    /// Per-owner spend to charge against daily/monthly limits after a
    /// successful commit. Empty for Mint and Burn.
    pub spend_by_owner: Vec<(OwnerId, Amount)>,
}

/// Run the full validation pipeline against a snapshot.
pub fn validate(
    store: &dyn LedgerStore,
    policy: &PolicyEngine,
    reserve: &ReserveGate,
    signatures: &dyn SignatureVerifier,
    config: &EngineConfig,
    tx: &Transaction,
    now: Timestamp,
) -> EngineResult<Accepted> {
    check_schema(policy, config, tx)?;
    let inputs = check_inputs(store, tx)?;
    check_authorization(signatures, config, tx, &inputs)?;
    let spend_by_owner = check_compliance(policy, tx, &inputs, now)?;
    check_business_rules(policy, reserve, tx, &inputs, now)?;
    Ok(build_delta(config, tx, &inputs, spend_by_owner))
}

// =============================================================================
// 1. Schema
// =============================================================================

fn check_schema(policy: &PolicyEngine, config: &EngineConfig, tx: &Transaction) -> EngineResult<()> {
    if tx.tx_id.as_str().is_empty() {
        return Err(EngineError::Schema("empty tx_id".to_string()));
    }
    if tx.timestamp == 0 {
        return Err(EngineError::Schema("zero timestamp".to_string()));
    }
    if !policy.policy_known(&tx.policy_ref) {
        return Err(EngineError::UnknownPolicy(tx.policy_ref.clone()));
    }

    match &tx.body {
        TxBody::Mint { outputs } if outputs.is_empty() => {
            return Err(EngineError::Schema("mint with no outputs".to_string()));
        }
        TxBody::Transfer { inputs, outputs } if inputs.is_empty() || outputs.is_empty() => {
            return Err(EngineError::Schema(
                "transfer requires inputs and outputs".to_string(),
            ));
        }
        TxBody::Burn { inputs } if inputs.is_empty() => {
            return Err(EngineError::Schema("burn with no inputs".to_string()));
        }
        _ => {}
    }

    let mut seen: HashSet<&UtxoId> = HashSet::new();
    for input in tx.inputs() {
        if !seen.insert(input) {
            return Err(EngineError::Schema(format!("duplicate input {input}")));
        }
    }

    for (i, output) in tx.outputs().iter().enumerate() {
        if output.amount == 0 {
            return Err(EngineError::Schema(format!("output {i} has zero amount")));
        }
        if output.amount > config.max_utxo_amount {
            return Err(EngineError::Schema(format!(
                "output {i} amount {} exceeds per-output cap {}",
                output.amount, config.max_utxo_amount
            )));
        }
        if output.asset_code != config.asset_code {
            return Err(EngineError::Schema(format!(
                "unsupported asset code {}",
                output.asset_code
            )));
        }
        if output.kyc_tag == KycLevel::Level0 {
            return Err(EngineError::Schema(format!(
                "output {i} tagged with non-transacting KYC level"
            )));
        }
    }

    Ok(())
}

// =============================================================================
// 2. Existence / status
// =============================================================================

fn check_inputs(store: &dyn LedgerStore, tx: &Transaction) -> EngineResult<Vec<(Utxo, u64)>> {
    if store.tx_exists(&tx.tx_id)? {
        return Err(EngineError::DuplicateTransaction(tx.tx_id.clone()));
    }

    let mut resolved = Vec::with_capacity(tx.inputs().len());
    for id in tx.inputs() {
        let (utxo, version) = store
            .get_utxo(id)?
            .ok_or_else(|| EngineError::NotFound(id.clone()))?;
        match utxo.status {
            UtxoStatus::Spent => return Err(EngineError::AlreadySpent(id.clone())),
            UtxoStatus::Frozen => return Err(EngineError::FrozenUtxo(id.clone())),
            UtxoStatus::Active => {}
        }
        resolved.push((utxo, version));
    }
    Ok(resolved)
}

// =============================================================================
// 3. Authorization
// =============================================================================

fn verify_principal(
    signatures: &dyn SignatureVerifier,
    payload: &[u8],
    tx: &Transaction,
    principal: &OwnerId,
) -> EngineResult<()> {
    let signature = tx
        .signature_of(principal)
        .ok_or_else(|| EngineError::Unauthorized(format!("missing signature from {principal}")))?;
    if !signatures.verify(payload, signature, principal)? {
        return Err(EngineError::Unauthorized(format!(
            "invalid signature from {principal}"
        )));
    }
    Ok(())
}

fn check_authorization(
    signatures: &dyn SignatureVerifier,
    config: &EngineConfig,
    tx: &Transaction,
    inputs: &[(Utxo, u64)],
) -> EngineResult<()> {
    let payload = tx.signing_payload()?;
    let input_owners: HashSet<&OwnerId> = inputs.iter().map(|(u, _)| &u.owner_id).collect();

    match &tx.body {
        TxBody::Mint { .. } => verify_principal(signatures, &payload, tx, &config.issuer),
        TxBody::Transfer { .. } => {
            for owner in input_owners {
                verify_principal(signatures, &payload, tx, owner)?;
            }
            Ok(())
        }
        // Burn by issuer signature or by every input owner.
        TxBody::Burn { .. } => {
            if tx.signature_of(&config.issuer).is_some() {
                verify_principal(signatures, &payload, tx, &config.issuer)
            } else {
                for owner in input_owners {
                    verify_principal(signatures, &payload, tx, owner)?;
                }
                Ok(())
            }
        }
    }
}

// =============================================================================
// 4. Compliance
// =============================================================================

fn check_compliance(
    policy: &PolicyEngine,
    tx: &Transaction,
    inputs: &[(Utxo, u64)],
    now: Timestamp,
) -> EngineResult<Vec<(OwnerId, Amount)>> {
    let mut spend_by_owner: BTreeMap<&OwnerId, Amount> = BTreeMap::new();
    for (utxo, _) in inputs {
        let entry = spend_by_owner.entry(&utxo.owner_id).or_insert(0);
        *entry = entry.saturating_add(utxo.amount);
    }

    for owner in spend_by_owner.keys() {
        policy.check_owner(owner, now)?;
    }
    for output in tx.outputs() {
        policy.check_owner(&output.owner_id, now)?;
        if !policy.jurisdiction_allowed(&output.metadata.jurisdiction) {
            return Err(
                PolicyError::JurisdictionDenied(output.metadata.jurisdiction.clone()).into(),
            );
        }
    }

    // Spend limits apply to transfers; redemptions are gated by the minimum
    // burn size instead.
    if matches!(tx.body, TxBody::Transfer { .. }) {
        for (owner, amount) in &spend_by_owner {
            policy.check_spend(owner, *amount, now)?;
        }
        Ok(spend_by_owner
            .into_iter()
            .map(|(owner, amount)| (owner.clone(), amount))
            .collect())
    } else {
        Ok(Vec::new())
    }
}

// =============================================================================
// 5. Business rules by variant
// =============================================================================

fn check_business_rules(
    policy: &PolicyEngine,
    reserve: &ReserveGate,
    tx: &Transaction,
    inputs: &[(Utxo, u64)],
    now: Timestamp,
) -> EngineResult<()> {
    let total_in: Amount = inputs
        .iter()
        .fold(0, |acc: Amount, (u, _)| acc.saturating_add(u.amount));

    match &tx.body {
        TxBody::Mint { .. } => {
            let total = tx.total_output();
            let limit = policy.config().max_mint_per_tx;
            if total > limit {
                return Err(EngineError::MintLimitExceeded {
                    requested: total,
                    limit,
                });
            }
            reserve.can_mint(total, now)?;
            Ok(())
        }
        TxBody::Transfer { .. } => {
            let total_out = tx.total_output();
            if total_in != total_out {
                return Err(EngineError::ConservationViolation {
                    inputs: total_in,
                    outputs: total_out,
                });
            }
            Ok(())
        }
        TxBody::Burn { .. } => {
            let minimum = policy.config().min_burn_amount;
            if total_in < minimum {
                return Err(EngineError::BelowMinimumBurn {
                    amount: total_in,
                    minimum,
                });
            }
            Ok(())
        }
    }
}

// =============================================================================
// 6. Delta
// =============================================================================

fn build_delta(
    config: &EngineConfig,
    tx: &Transaction,
    inputs: &[(Utxo, u64)],
    spend_by_owner: Vec<(OwnerId, Amount)>,
) -> Accepted {
    let mut delta = LedgerDelta::new(tx.tx_id.clone(), tx.timestamp);
    let mut read_set = Vec::with_capacity(inputs.len());

    for (utxo, version) in inputs {
        read_set.push(ReadSetEntry::new(utxo.utxo_id.clone(), *version));
        delta.spend.push(utxo.utxo_id.clone());
    }

    for (index, output) in tx.outputs().iter().enumerate() {
        delta.create.push(Utxo {
            utxo_id: UtxoId::new(tx.tx_id.clone(), index as u32),
            owner_id: output.owner_id.clone(),
            asset_code: config.asset_code.clone(),
            amount: output.amount,
            status: UtxoStatus::Active,
            kyc_tag: output.kyc_tag,
            created_at: tx.timestamp,
            metadata: output.metadata.clone(),
        });
    }

    let total_in: i128 = inputs.iter().map(|(u, _)| u.amount as i128).sum();
    delta.supply_delta = match tx.body {
        TxBody::Mint { .. } => tx.total_output() as i128,
        TxBody::Transfer { .. } => 0,
        TxBody::Burn { .. } => -total_in,
    };

    Accepted {
        delta,
        read_set,
        spend_by_owner,
    }
}

// =============================================================================
// Tests
// =============================================================================
