use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chain::{Hash, PlutusData};

/// Datums seen so far, indexed by their hash. Entries are only ever added.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DatumTable {
    map: HashMap<Hash, PlutusData>,
}

impl DatumTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hash: &Hash) -> Option<&PlutusData> {
        self.map.get(hash)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.map.contains_key(hash)
    }

    pub fn insert(&mut self, hash: Hash, datum: PlutusData) {
        self.map.entry(hash).or_insert(datum);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, Hash, PlutusData> {
        self.map.iter()
    }
}

impl Extend<(Hash, PlutusData)> for DatumTable {
    fn extend<I: IntoIterator<Item = (Hash, PlutusData)>>(&mut self, iter: I) {
        for (hash, datum) in iter {
            self.insert(hash, datum);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_datum() {
        let hash = Hash::SHA256([9; 32]);
        let mut table = DatumTable::new();
        table.insert(hash, PlutusData(vec![1]));
        table.extend(vec![(hash, PlutusData(vec![2]))]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&hash), Some(&PlutusData(vec![1])));
    }
}
