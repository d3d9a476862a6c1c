use crate::transaction::Transaction;
use crate::utxo::{Utxo, UtxoPool};
use log::{debug, warn};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// Why a transaction was rejected. Rejection is a normal decision
/// outcome, not an error, but the failing rule stays observable for
/// diagnostics and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The transaction claims the same unspent output twice.
    DuplicateClaim(Utxo),
    /// The referenced output is not in the pool: already spent, or it
    /// never existed.
    UnknownUtxo(Utxo),
    /// The input was never signed.
    MissingSignature { input_index: usize },
    /// The signature does not verify against the owner key recorded on
    /// the referenced pool output.
    InvalidSignature { input_index: usize },
    /// An output carries a negative value.
    NegativeOutputValue { output_index: usize, value: f64 },
    /// The outputs are worth more than the inputs they claim.
    OutputsExceedInputs { input_total: f64, output_total: f64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::DuplicateClaim(utxo) => {
                write!(f, "UTXO: {} is claimed more than once by the transaction.", utxo)
            }
            ValidationError::UnknownUtxo(utxo) => {
                write!(f, "UTXO: {} does not exist in the pool.", utxo)
            }
            ValidationError::MissingSignature { input_index } => {
                write!(f, "Input: {} has no signature.", input_index)
            }
            ValidationError::InvalidSignature { input_index } => {
                write!(f, "Signature verification failed for input: {}.", input_index)
            }
            ValidationError::NegativeOutputValue {
                output_index,
                value,
            } => write!(f, "Output: {} has negative value: {}.", output_index, value),
            ValidationError::OutputsExceedInputs {
                input_total,
                output_total,
            } => write!(
                f,
                "Sum of output values: {} exceeds sum of input values: {}.",
                output_total, input_total
            ),
        }
    }
}

/// Decides whether transactions are admissible against a pool and
/// applies accepted ones. The handler never owns a pool; it borrows one
/// for the duration of a call.
pub struct TxHandler {}

impl TxHandler {
    /// Checks one transaction against the current pool state. The rules
    /// run in a fixed order and short-circuit at the first violation:
    ///   1. no unspent output is claimed twice by this transaction,
    ///   2. every claimed output exists in the pool,
    ///   3. every input's signature verifies against the owner key
    ///      recorded on the referenced pool output,
    ///   4. no output value is negative,
    ///   5. the claimed input values cover the output values. Output
    ///      value may be strictly less (the difference is destroyed),
    ///      never more.
    ///
    /// The pool is not mutated. Cross-transaction duplicate claims are
    /// not this function's concern; `handle_batch` resolves those
    /// through the pool mutation order.
    pub fn validate(tx: &Transaction, pool: &UtxoPool) -> Result<(), ValidationError> {
        let mut claimed = HashSet::new();
        let mut input_total = 0.0;
        for (input_index, input) in tx.inputs().iter().enumerate() {
            let utxo = Utxo::new(input.prev_tx_hash().clone(), input.output_index());
            if !claimed.insert(utxo.clone()) {
                return Err(ValidationError::DuplicateClaim(utxo));
            }
            let claimed_output = pool
                .get(&utxo)
                .ok_or_else(|| ValidationError::UnknownUtxo(utxo.clone()))?;
            let message = tx
                .signable_bytes(input_index)
                .expect("input index comes from enumerating the inputs");
            let signature = input
                .signature()
                .ok_or(ValidationError::MissingSignature { input_index })?;
            if !claimed_output.address().verify(&message, signature) {
                return Err(ValidationError::InvalidSignature { input_index });
            }
            input_total += claimed_output.value();
        }
        let mut output_total = 0.0;
        for (output_index, output) in tx.outputs().iter().enumerate() {
            if output.value() < 0.0 {
                return Err(ValidationError::NegativeOutputValue {
                    output_index,
                    value: output.value(),
                });
            }
            output_total += output.value();
        }
        if input_total < output_total {
            return Err(ValidationError::OutputsExceedInputs {
                input_total,
                output_total,
            });
        }
        Ok(())
    }

    pub fn is_valid_transaction(tx: &Transaction, pool: &UtxoPool) -> bool {
        Self::validate(tx, pool).is_ok()
    }

    /// Processes one epoch of candidate transactions in a single pass
    /// over the given order, and returns the accepted subset in that
    /// same relative order.
    ///
    /// Each accepted transaction is committed immediately: its claimed
    /// outputs leave the pool and its own outputs enter it, keyed by
    /// the transaction hash and output position, before the next
    /// candidate is examined. A later candidate can therefore spend an
    /// output created earlier in the same batch. The pass is never
    /// reordered or retried to rescue a candidate that was validated
    /// before its dependency was committed; that is a documented
    /// limitation of the single-pass semantics, and a host that wants
    /// more can call `handle_batch` again with the leftovers.
    ///
    /// A rejected candidate leaves the pool exactly as it was.
    pub fn handle_batch(candidates: Vec<Transaction>, pool: &mut UtxoPool) -> Vec<Transaction> {
        let mut accepted = Vec::new();
        for tx in candidates {
            // Without a hash there is no identity to key the outputs by.
            let hash = match tx.hash() {
                Some(hash) => hash.clone(),
                None => {
                    warn!("Dropping a transaction that was never finalized.");
                    continue;
                }
            };
            match Self::validate(&tx, pool) {
                Ok(()) => {
                    for input in tx.inputs() {
                        pool.remove(&Utxo::new(input.prev_tx_hash().clone(), input.output_index()));
                    }
                    for (output_index, output) in tx.outputs().iter().enumerate() {
                        pool.add(Utxo::new(hash.clone(), output_index as u32), output.clone());
                    }
                    debug!("Accepted transaction: {}", hash);
                    accepted.push(tx);
                }
                Err(reason) => {
                    warn!("Rejected transaction: {}: {}", hash, reason);
                }
            }
        }
        accepted
    }
}
