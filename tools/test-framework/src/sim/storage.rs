//! Key-value storage backing a single contract instance.

use cosmwasm_std::{Order, Record, Storage};
use std::collections::BTreeMap;
use std::ops::Bound;

#[derive(Clone, Debug, Default)]
pub struct SimStorage {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl SimStorage {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All records in key order, used when dumping a contract's state.
    pub fn records(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.data
            .iter()
            .map(|(key, value)| (key.as_slice(), value.as_slice()))
    }
}

impl Storage for SimStorage {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.get(key).cloned()
    }

    fn range<'a>(
        &'a self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Box<dyn Iterator<Item = Record> + 'a> {
        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                return Box::new(std::iter::empty());
            }
        }

        let lower = start.map_or(Bound::Unbounded, |start| Bound::Included(start.to_vec()));
        let upper = end.map_or(Bound::Unbounded, |end| Bound::Excluded(end.to_vec()));

        let iter = self
            .data
            .range((lower, upper))
            .map(|(key, value)| (key.clone(), value.clone()));

        match order {
            Order::Ascending => Box::new(iter),
            Order::Descending => Box::new(iter.rev()),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.data.insert(key.to_vec(), value.to_vec());
    }

    fn remove(&mut self, key: &[u8]) {
        self.data.remove(key);
    }
}
