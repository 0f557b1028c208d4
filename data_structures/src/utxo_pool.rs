use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chain::{OutputPointer, Utxo};

/// Entry of the ledger or the mempool: an output plus its spent flag.
///
/// Spent entries stay in their store until the next block boundary, so that a
/// second spend of the same output is detected as missing instead of silently
/// consuming a copy.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct UtxoEntry {
    /// The output
    pub utxo: Utxo,
    /// Whether a transaction has already consumed the output
    pub spent: bool,
}

impl UtxoEntry {
    /// An unspent entry
    pub fn unspent(utxo: Utxo) -> Self {
        Self { utxo, spent: false }
    }
}

/// Which store an output was found in
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum StoreKind {
    /// Committed outputs
    Ledger,
    /// Outputs created by transactions accepted since the last block boundary
    Mempool,
}

/// Outputs indexed by output pointer, iterated in pointer order
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct UtxoStore {
    map: BTreeMap<OutputPointer, UtxoEntry>,
}

impl UtxoStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, k: &OutputPointer) -> Option<&UtxoEntry> {
        self.map.get(k)
    }

    /// Unspent entry for `k`, if any
    pub fn get_unspent(&self, k: &OutputPointer) -> Option<&UtxoEntry> {
        self.map.get(k).filter(|entry| !entry.spent)
    }

    pub fn contains_key(&self, k: &OutputPointer) -> bool {
        self.map.contains_key(k)
    }

    pub fn put(&mut self, k: OutputPointer, v: UtxoEntry) -> Option<UtxoEntry> {
        self.map.insert(k, v)
    }

    pub fn remove(&mut self, k: &OutputPointer) -> Option<UtxoEntry> {
        self.map.remove(k)
    }

    /// Flag the entry as spent. Returns `false` if there is no such entry.
    pub fn mark_spent(&mut self, k: &OutputPointer) -> bool {
        match self.map.get_mut(k) {
            Some(entry) => {
                entry.spent = true;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, OutputPointer, UtxoEntry> {
        self.map.iter()
    }

    /// Iterate over the outputs of every entry, spent or not
    pub fn utxos(&self) -> impl Iterator<Item = &Utxo> {
        self.map.values().map(|entry| &entry.utxo)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear()
    }

    /// Remove every entry and return them in pointer order
    pub fn drain(&mut self) -> std::collections::btree_map::IntoIter<OutputPointer, UtxoEntry> {
        std::mem::take(&mut self.map).into_iter()
    }

    /// Keep only the entries for which `f` returns `true`
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&OutputPointer, &mut UtxoEntry) -> bool,
    {
        self.map.retain(f)
    }
}

/// Counters reported by a block boundary
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BlockBoundary {
    /// Mempool entries copied into the ledger
    pub promoted: usize,
    /// Spent entries deleted from the ledger
    pub pruned: usize,
}

/// Commit the mempool into the ledger.
///
/// Every mempool entry is copied into the ledger (replacing any entry with the same
/// pointer), then every spent ledger entry is deleted and the mempool is emptied.
pub fn commit_mempool(ledger: &mut UtxoStore, mempool: &mut UtxoStore) -> BlockBoundary {
    let mut boundary = BlockBoundary::default();

    for (output_pointer, entry) in mempool.drain() {
        ledger.put(output_pointer, entry);
        boundary.promoted += 1;
    }

    let before = ledger.len();
    ledger.retain(|_, entry| !entry.spent);
    boundary.pruned = before - ledger.len();
    log::trace!(
        "Committed mempool: {} outputs promoted, {} spent outputs pruned",
        boundary.promoted,
        boundary.pruned
    );

    boundary
}
