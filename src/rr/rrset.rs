// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Set operations over lists of records.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::iter::FromIterator;
use std::ops::Deref;

use super::{Record, Type};

////////////////////////////////////////////////////////////////////////
// RECORD SETS                                                        //
////////////////////////////////////////////////////////////////////////

/// A list of records with set semantics on insertion.
///
/// Records are kept in insertion order. [`RecordSet::set_add`] skips
/// any record that is already present; presence is decided by
/// [`Record`]'s equality, so owner names compare case-insensitively and
/// TTLs are ignored. This follows the behavior of other nameservers,
/// which silently discard duplicate records. Sets are expected to be
/// small (the size of an answer section), so membership is checked by
/// a linear scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends each record of `incoming` that is not equal to a record
    /// already in the set.
    pub fn set_add<I>(&mut self, incoming: I)
    where
        I: IntoIterator<Item = Record>,
    {
        for record in incoming {
            if !self.records.contains(&record) {
                self.records.push(record);
            }
        }
    }

    /// Returns the set with duplicates removed, keeping the first
    /// occurrence of each record.
    pub fn unique(self) -> Self {
        let mut unique = Self::new();
        unique.set_add(self.records);
        unique
    }

    /// Groups the records by type. If `unique` is set, duplicates are
    /// removed from each group.
    pub fn partition(self, unique: bool) -> Parts {
        let mut parts = Parts::default();
        for record in self.records {
            let group = parts.groups.entry(record.rr_type).or_default();
            if unique {
                group.set_add(Some(record));
            } else {
                group.records.push(record);
            }
        }
        parts
    }

    /// Splits the set into the records for which `wanted` returns true
    /// and the rest, preserving order in both.
    pub fn filter<F>(self, mut wanted: F) -> (Self, Self)
    where
        F: FnMut(&Record) -> bool,
    {
        let (kept, other): (Vec<_>, Vec<_>) = self.records.into_iter().partition(|r| wanted(r));
        (Self { records: kept }, Self { records: other })
    }

    pub fn into_vec(self) -> Vec<Record> {
        self.records
    }
}

impl Deref for RecordSet {
    type Target = [Record];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl fmt::Display for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////
// PARTITIONS BY TYPE                                                 //
////////////////////////////////////////////////////////////////////////

/// Records grouped by type, as produced by [`RecordSet::partition`].
/// Groups are kept in order of type code.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parts {
    groups: BTreeMap<Type, RecordSet>,
}

impl Parts {
    /// Returns the group of records of type `rr_type`, if any.
    pub fn get(&self, rr_type: Type) -> Option<&RecordSet> {
        self.groups.get(&rr_type)
    }

    /// Merges `other` into this partition. Records of a type already
    /// present are added to its group with [`RecordSet::set_add`]; a
    /// group of a new type is taken over as it is.
    pub fn set_add(&mut self, other: Parts) {
        for (rr_type, records) in other.groups {
            match self.groups.entry(rr_type) {
                btree_map::Entry::Occupied(mut group) => group.get_mut().set_add(records),
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(records);
                }
            }
        }
    }

    /// Concatenates the groups, in order of type code, back into a
    /// single set.
    pub fn join(self) -> RecordSet {
        self.groups.into_values().flatten().collect()
    }

    pub fn iter(&self) -> btree_map::Iter<Type, RecordSet> {
        self.groups.iter()
    }

    /// Returns the number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;
    use crate::rr::rdata::{Mx, Rdata, A};
    use crate::rr::Ttl;

    fn a(owner: &str, address: &str) -> Record {
        Record::new(
            owner.parse().unwrap(),
            Class::IN,
            Ttl::from(3600u32),
            Rdata::A(A {
                address: address.parse().unwrap(),
            }),
        )
        .unwrap()
    }

    fn mx(owner: &str, preference: u16) -> Record {
        Record::new(
            owner.parse().unwrap(),
            Class::IN,
            Ttl::from(3600u32),
            Rdata::Mx(Mx {
                preference,
                exchange: "mail.example.".parse().unwrap(),
            }),
        )
        .unwrap()
    }

    fn sample() -> RecordSet {
        RecordSet::from(vec![
            a("example.", "192.0.2.1"),
            mx("example.", 10),
            a("example.", "192.0.2.2"),
        ])
    }

    #[test]
    fn set_add_with_itself_does_not_grow() {
        let mut set = sample();
        set.set_add(sample());
        assert_eq!(set, sample());
    }

    #[test]
    fn set_add_appends_new_records() {
        let mut set = sample();
        set.set_add(vec![a("example.", "192.0.2.3"), mx("example.", 10)]);
        assert_eq!(set.len(), 4);
        assert_eq!(set[3], a("example.", "192.0.2.3"));
    }

    #[test]
    fn unique_collapses_differently_cased_names() {
        let mut upper = a("EXAMPLE.", "192.0.2.1");
        upper.ttl = Ttl::from(60u32);
        let set = RecordSet::from(vec![a("example.", "192.0.2.1"), upper]).unique();
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].ttl, Ttl::from(3600u32));
    }

    #[test]
    fn partition_groups_by_type() {
        let mut doubled = sample().into_vec();
        doubled.extend(sample());

        let parts = RecordSet::from(doubled.clone()).partition(false);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts.get(Type::A).unwrap().len(), 4);

        let parts = RecordSet::from(doubled).partition(true);
        assert_eq!(parts.get(Type::A).unwrap().len(), 2);
        assert_eq!(parts.get(Type::MX).unwrap().len(), 1);
        assert!(parts.get(Type::AAAA).is_none());
    }

    #[test]
    fn join_orders_by_type() {
        let joined = sample().partition(true).join();
        let types: Vec<Type> = joined.iter().map(|r| r.rr_type).collect();
        assert_eq!(types, [Type::A, Type::A, Type::MX]);
    }

    #[test]
    fn parts_set_add_merges_groups() {
        let mut parts = sample().partition(true);
        let other = RecordSet::from(vec![a("example.", "192.0.2.1"), mx("example.", 20)]);
        parts.set_add(other.partition(true));
        assert_eq!(parts.get(Type::A).unwrap().len(), 2);
        assert_eq!(parts.get(Type::MX).unwrap().len(), 2);
    }

    #[test]
    fn parts_set_add_takes_new_groups_unchanged() {
        let mut parts = RecordSet::from(vec![a("example.", "192.0.2.1")]).partition(true);
        let doubled = RecordSet::from(vec![mx("example.", 10), mx("example.", 10)]);
        parts.set_add(doubled.partition(false));
        assert_eq!(parts.get(Type::MX).unwrap().len(), 2);

        let doubled = RecordSet::from(vec![a("example.", "192.0.2.1"), a("example.", "192.0.2.1")]);
        parts.set_add(doubled.partition(false));
        assert_eq!(parts.get(Type::A).unwrap().len(), 1);
    }

    #[test]
    fn filter_splits_records() {
        let (addresses, other) = sample().filter(|r| r.rr_type == Type::A);
        assert_eq!(addresses.len(), 2);
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].rr_type, Type::MX);
    }

    #[test]
    fn display_joins_with_newlines() {
        let set = RecordSet::from(vec![a("example.", "192.0.2.1"), mx("example.", 10)]);
        assert_eq!(
            set.to_string(),
            "example.\tIN\t3600\tA 192.0.2.1\nexample.\tIN\t3600\tMX 10 mail.example."
        );
    }
}
