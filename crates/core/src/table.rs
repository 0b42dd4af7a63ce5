//! Id-keyed entity collections with monotonic id allocation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::SequentialId;

/// Monotonic id allocator owned by a single collection.
///
/// Ids handed out are never reused, even after the highest row is deleted.
/// `u64::MAX` is never handed out; reaching it means the sequence is exhausted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Sequence whose next allocation is `next` (clamped to at least 1).
    pub fn starting_at(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    /// The id the next allocation will return.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn is_exhausted(&self) -> bool {
        self.next == u64::MAX
    }

    pub fn allocate(&mut self) -> DomainResult<u64> {
        if self.is_exhausted() {
            return Err(DomainError::invariant("id sequence exhausted"));
        }
        let id = self.next;
        self.next += 1;
        Ok(id)
    }

    /// Advance past an id that already exists in the collection.
    pub fn observe(&mut self, raw: u64) -> DomainResult<()> {
        let after = raw
            .checked_add(1)
            .ok_or_else(|| DomainError::invalid_id(format!("id {raw} is out of range")))?;
        if after > self.next {
            self.next = after;
        }
        Ok(())
    }
}

impl From<u64> for IdSequence {
    fn from(next: u64) -> Self {
        Self::starting_at(next)
    }
}

impl From<IdSequence> for u64 {
    fn from(sequence: IdSequence) -> Self {
        sequence.next
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered collection of entities keyed by their id.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T: Entity> {
    rows: BTreeMap<T::Id, T>,
    sequence: IdSequence,
}

impl<T: Entity> Table<T> {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            sequence: IdSequence::new(),
        }
    }

    /// Rebuild a table from stored rows.
    ///
    /// Duplicate ids are rejected. The sequence is advanced past every stored id,
    /// so a missing or stale sequence degrades to `max(id) + 1`.
    pub fn from_rows(
        rows: impl IntoIterator<Item = T>,
        sequence: Option<IdSequence>,
    ) -> DomainResult<Self> {
        let mut sequence = sequence.unwrap_or_default();
        let mut map = BTreeMap::new();
        for row in rows {
            let id = row.id();
            if id.raw() == 0 {
                return Err(DomainError::invalid_id(format!("{} id must be positive", T::KIND)));
            }
            sequence.observe(id.raw())?;
            if map.insert(id, row).is_some() {
                return Err(DomainError::invariant(format!("duplicate {} id {id}", T::KIND)));
            }
        }
        Ok(Self { rows: map, sequence })
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.rows.get(&id)
    }

    /// Mutable access to a row. Callers must not change the row's id.
    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    /// Like [`Table::get`], but missing rows become `DomainError::NotFound`.
    pub fn require(&self, id: T::Id) -> DomainResult<&T> {
        self.rows
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("{} {id}", T::KIND)))
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.rows.contains_key(&id)
    }

    /// Rows in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Allocate a fresh id and insert the row built from it.
    pub fn insert_new(&mut self, build: impl FnOnce(T::Id) -> T) -> DomainResult<&T> {
        let id = T::Id::from_raw(self.sequence.allocate()?);
        Ok(self.rows.entry(id).or_insert(build(id)))
    }

    /// Replace an existing row, returning the previous value.
    pub fn replace(&mut self, row: T) -> DomainResult<T> {
        let id = row.id();
        match self.rows.get_mut(&id) {
            Some(slot) => Ok(core::mem::replace(slot, row)),
            None => Err(DomainError::not_found(format!("{} {id}", T::KIND))),
        }
    }

    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        self.rows.remove(&id)
    }

    pub fn sequence(&self) -> IdSequence {
        self.sequence
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ProductId;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: ProductId,
        label: &'static str,
    }

    impl Entity for Row {
        type Id = ProductId;
        const KIND: &'static str = "row";

        fn id(&self) -> ProductId {
            self.id
        }
    }

    fn row(id: u64, label: &'static str) -> Row {
        Row {
            id: ProductId::new(id).unwrap(),
            label,
        }
    }

    #[test]
    fn first_allocation_is_one() {
        let mut table: Table<Row> = Table::new();
        let id = table.insert_new(|id| Row { id, label: "a" }).unwrap().id;
        assert_eq!(id.get(), 1);
    }

    #[test]
    fn loading_without_sequence_continues_after_max_id() {
        let mut table = Table::from_rows(vec![row(3, "c"), row(7, "g")], None).unwrap();
        let id = table.insert_new(|id| Row { id, label: "h" }).unwrap().id;
        assert_eq!(id.get(), 8);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut table: Table<Row> = Table::new();
        table.insert_new(|id| Row { id, label: "a" }).unwrap();
        let second = table.insert_new(|id| Row { id, label: "b" }).unwrap().id;
        table.remove(second);
        let third = table.insert_new(|id| Row { id, label: "c" }).unwrap().id;
        assert_eq!(third.get(), 3);
    }

    #[test]
    fn duplicate_ids_are_rejected_on_load() {
        let err = Table::from_rows(vec![row(1, "a"), row(1, "b")], None).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn replace_requires_existing_row() {
        let mut table = Table::from_rows(vec![row(1, "a")], None).unwrap();
        let old = table.replace(row(1, "b")).unwrap();
        assert_eq!(old.label, "a");
        assert_eq!(table.get(ProductId::new(1).unwrap()).unwrap().label, "b");
        assert!(matches!(table.replace(row(2, "x")), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn stale_sequence_is_advanced_past_stored_rows() {
        let table =
            Table::from_rows(vec![row(5, "e")], Some(IdSequence::starting_at(2))).unwrap();
        assert_eq!(table.sequence().peek(), 6);
    }

    #[test]
    fn max_id_on_load_is_rejected_instead_of_overflowing() {
        let err = Table::from_rows(vec![row(u64::MAX, "z")], None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    #[test]
    fn exhausted_sequence_refuses_to_allocate() {
        let mut table =
            Table::from_rows(vec![row(u64::MAX - 1, "y")], None).unwrap();
        assert!(table.sequence().is_exhausted());

        let err = table.insert_new(|id| Row { id, label: "z" }).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn stored_zero_sequence_is_clamped_to_one() {
        let sequence: IdSequence = serde_json::from_str("0").unwrap();
        assert_eq!(sequence.peek(), 1);
        assert_eq!(serde_json::to_string(&IdSequence::starting_at(7)).unwrap(), "7");
    }
}
