use crate::transaction::{Output, TxHash};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// The identity of one unspent transaction output: the hash of the
/// transaction that created it and the output's index within that
/// transaction.
///
/// Equality and hashing are structural, so a freshly constructed `Utxo`
/// with the same fields finds the same pool entry.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Utxo {
    tx_hash: TxHash,
    output_index: u32,
}

impl Utxo {
    pub fn new(tx_hash: TxHash, output_index: u32) -> Self {
        Self {
            tx_hash,
            output_index,
        }
    }

    pub fn tx_hash(&self) -> &TxHash {
        &self.tx_hash
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }
}

impl Display for Utxo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.output_index)
    }
}

/// A pool of confirmed and unspent transaction outputs, indexed by
/// their `Utxo` identity. This is the ledger's authoritative state:
/// absence of a key means the output was spent or never existed.
#[derive(Debug, Clone)]
pub struct UtxoPool {
    utxos: HashMap<Utxo, Output>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    /// Inserts or overwrites the mapping. Overwriting an existing key
    /// is permitted; avoiding an unintended overwrite is the caller's
    /// responsibility.
    pub fn add(&mut self, utxo: Utxo, output: Output) {
        self.utxos.insert(utxo, output);
    }

    /// Deletes the mapping if present; a no-op otherwise.
    pub fn remove(&mut self, utxo: &Utxo) {
        self.utxos.remove(utxo);
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    /// Looks up the output; `None` means "no such unspent output" and
    /// is a normal result, not an error.
    pub fn get(&self, utxo: &Utxo) -> Option<&Output> {
        self.utxos.get(utxo)
    }

    /// A snapshot of all keys, in no particular order.
    pub fn utxos(&self) -> Vec<Utxo> {
        self.utxos.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}

impl Default for UtxoPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::transaction::TxHash;

    #[test]
    fn utxo_equality_ignores_object_identity() {
        let utxo = Utxo::new(TxHash::from(&b"txhash#1"[..]), 1);
        let mirror = Utxo::new(TxHash::from(&b"txhash#1"[..]), 1);
        let other_hash = Utxo::new(TxHash::from(&b"txhash#2"[..]), 1);
        let other_index = Utxo::new(TxHash::from(&b"txhash#1"[..]), 3);

        assert_eq!(utxo, mirror);
        assert_ne!(utxo, other_hash);
        assert_ne!(utxo, other_index);
        assert_ne!(other_hash, other_index);
    }

    #[test]
    fn pool_lookups_use_value_equality() {
        let owner = KeyPair::generate().public_key();
        let mut pool = UtxoPool::new();
        pool.add(Utxo::new(TxHash::from(&b"txhash#1"[..]), 1), Output::new(10.5, owner));

        // A fresh key with the same fields finds the entry.
        let probe = Utxo::new(TxHash::from(&b"txhash#1"[..]), 1);
        assert!(pool.contains(&probe));
        assert_eq!(pool.get(&probe).unwrap().value(), 10.5);

        pool.remove(&probe);
        assert!(!pool.contains(&probe));
        assert!(pool.get(&probe).is_none());
    }

    #[test]
    fn add_with_same_key_overwrites() {
        let owner = KeyPair::generate().public_key();
        let mut pool = UtxoPool::new();
        let utxo = Utxo::new(TxHash::from(&b"txhash#1"[..]), 0);
        pool.add(utxo.clone(), Output::new(1.0, owner));
        pool.add(utxo.clone(), Output::new(2.0, owner));

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&utxo).unwrap().value(), 2.0);
    }

    #[test]
    fn remove_of_absent_key_is_a_no_op() {
        let mut pool = UtxoPool::new();
        pool.remove(&Utxo::new(TxHash::from(&b"missing"[..]), 0));
        assert!(pool.is_empty());
    }

    #[test]
    fn utxos_returns_all_keys() {
        let owner = KeyPair::generate().public_key();
        let mut pool = UtxoPool::new();
        pool.add(Utxo::new(TxHash::from(&b"txhash#1"[..]), 0), Output::new(1.0, owner));
        pool.add(Utxo::new(TxHash::from(&b"txhash#1"[..]), 1), Output::new(2.0, owner));
        pool.add(Utxo::new(TxHash::from(&b"txhash#2"[..]), 0), Output::new(3.0, owner));

        let mut keys = pool.utxos();
        assert_eq!(keys.len(), 3);
        keys.sort_by(|a, b| {
            (a.tx_hash().as_slice(), a.output_index())
                .cmp(&(b.tx_hash().as_slice(), b.output_index()))
        });
        assert_eq!(keys[0], Utxo::new(TxHash::from(&b"txhash#1"[..]), 0));
        assert_eq!(keys[1], Utxo::new(TxHash::from(&b"txhash#1"[..]), 1));
        assert_eq!(keys[2], Utxo::new(TxHash::from(&b"txhash#2"[..]), 0));
    }
}
