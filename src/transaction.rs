use crate::crypto::PublicKey;
use crate::hash::Sha256;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The content hash of a finalized transaction, kept as an opaque byte
/// sequence with value equality.
///
/// A real hash is a SHA-256 digest, but pool seeds (genesis entries and
/// test fixtures) may use arbitrary byte strings, so the width is not
/// fixed here.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct TxHash(Vec<u8>);

impl TxHash {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_slice())
    }
}

impl From<Sha256> for TxHash {
    fn from(digest: Sha256) -> Self {
        Self(digest.as_slice().to_vec())
    }
}

impl From<&[u8]> for TxHash {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Display for TxHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    IndexOutOfRange { index: usize, num_inputs: usize },
}

impl Display for TransactionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionError::IndexOutOfRange { index, num_inputs } => write!(
                f,
                "Input index: {} is out of range for a transaction with {} inputs.",
                index, num_inputs
            ),
        }
    }
}

impl Error for TransactionError {}

/// A spendable amount bound to the owner's public key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    value: f64,
    address: PublicKey,
}

impl Output {
    pub fn new(value: f64, address: PublicKey) -> Self {
        Self { value, address }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn address(&self) -> &PublicKey {
        &self.address
    }
}

impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.value, self.address)
    }
}

/// A claim on one prior output, with the signature that authorizes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    prev_tx_hash: TxHash,
    output_index: u32,
    // Absent until the input is signed.
    signature: Option<Vec<u8>>,
}

impl Input {
    pub fn new(prev_tx_hash: TxHash, output_index: u32) -> Self {
        Self {
            prev_tx_hash,
            output_index,
            signature: None,
        }
    }

    pub fn prev_tx_hash(&self) -> &TxHash {
        &self.prev_tx_hash
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }

    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }
}

impl Display for Input {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.prev_tx_hash, self.output_index)
    }
}

/// A value transfer built incrementally: inputs, then outputs, then
/// signatures, then `finalize` to fix the content hash.
///
/// The order of inputs and outputs is semantically significant. The
/// input index addresses which signature authorizes which claim, and
/// the output index together with the transaction hash identifies the
/// output once it is committed to the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    hash: Option<TxHash>,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
}

impl Transaction {
    pub fn new() -> Self {
        Self {
            hash: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// The content hash, present only after `finalize`.
    pub fn hash(&self) -> Option<&TxHash> {
        self.hash.as_ref()
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Appends an unsigned input claiming the given prior output.
    pub fn add_input(&mut self, prev_tx_hash: TxHash, output_index: u32) {
        self.inputs.push(Input::new(prev_tx_hash, output_index));
    }

    /// Appends an output; its index is its position in the output list.
    pub fn add_output(&mut self, value: f64, address: PublicKey) {
        self.outputs.push(Output::new(value, address));
    }

    /// The exact payload that must be signed and verified for the input
    /// at `input_index`: the referenced prior hash, the referenced
    /// output index as a 4-byte big-endian integer, then every current
    /// output as an 8-byte big-endian IEEE value followed by the
    /// canonical public key encoding.
    ///
    /// Sibling inputs' signatures are deliberately not part of this
    /// payload. A signature therefore binds "this input authorizes
    /// exactly this set of outputs" and nothing about other inputs,
    /// which is why duplicate claims must be rejected separately during
    /// validation.
    ///
    /// This layout is a compatibility contract: any change in byte
    /// order or width breaks previously produced signatures.
    pub fn signable_bytes(&self, input_index: usize) -> Result<Vec<u8>, TransactionError> {
        let input = self
            .inputs
            .get(input_index)
            .ok_or(TransactionError::IndexOutOfRange {
                index: input_index,
                num_inputs: self.inputs.len(),
            })?;
        let mut data = Vec::new();
        data.extend_from_slice(input.prev_tx_hash.as_slice());
        data.extend_from_slice(&input.output_index.to_be_bytes());
        for output in &self.outputs {
            data.extend_from_slice(&output.value.to_be_bytes());
            data.extend_from_slice(&output.address.to_bytes());
        }
        Ok(data)
    }

    /// Stores the signature for the input at `input_index`.
    pub fn set_signature(
        &mut self,
        input_index: usize,
        signature: Vec<u8>,
    ) -> Result<(), TransactionError> {
        let num_inputs = self.inputs.len();
        let input = self
            .inputs
            .get_mut(input_index)
            .ok_or(TransactionError::IndexOutOfRange {
                index: input_index,
                num_inputs,
            })?;
        input.signature = Some(signature);
        Ok(())
    }

    /// The full serialization the content hash is computed over: every
    /// input's prior hash, big-endian output index and signature bytes,
    /// then every output as in `signable_bytes`.
    pub fn raw_bytes(&self) -> Vec<u8> {
        let mut data = Vec::new();
        for input in &self.inputs {
            data.extend_from_slice(input.prev_tx_hash.as_slice());
            data.extend_from_slice(&input.output_index.to_be_bytes());
            if let Some(signature) = &input.signature {
                data.extend_from_slice(signature);
            }
        }
        for output in &self.outputs {
            data.extend_from_slice(&output.value.to_be_bytes());
            data.extend_from_slice(&output.address.to_bytes());
        }
        data
    }

    /// Computes and stores the content hash. Must be called after all
    /// inputs are signed; the signatures are part of the hashed bytes,
    /// so finalizing earlier fixes a hash that no longer matches the
    /// signed transaction.
    pub fn finalize(&mut self) -> &TxHash {
        let digest = Sha256::digest(&self.raw_bytes());
        self.hash.insert(TxHash::from(digest))
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}
