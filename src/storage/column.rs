use crate::{
    component::{Component, ComponentId, TypeKey},
    model::Model,
};
use fixedbitset::FixedBitSet;
use std::any::Any;

/// Values of one component type for every model, indexed by [Model].
///
/// Slot 0 belongs to [Model::INVALID] and is never occupied. The membership
/// bitset is the source of truth for presence; a cleared bit means "no value"
/// regardless of what the backing slot holds.
pub struct Column<C> {
    id: ComponentId,
    key: TypeKey,
    values: Vec<Option<C>>,
    members: FixedBitSet,
}

impl<C: Component> Column<C> {
    pub fn new(id: ComponentId) -> Self {
        Self::with_capacity(id, 0)
    }

    pub fn with_capacity(id: ComponentId, capacity: usize) -> Self {
        let mut values = Vec::new();
        values.resize_with(capacity, || None);

        Self {
            id,
            key: TypeKey::of::<C>(),
            values,
            members: FixedBitSet::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    #[inline]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.count_ones(..)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the backing storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn members(&self) -> &FixedBitSet {
        &self.members
    }

    #[inline]
    pub fn contains(&self, model: Model) -> bool {
        self.members.contains(model.index())
    }

    /// Grows the backing storage so `index` is addressable.
    fn ensure_index(&mut self, index: usize) {
        if index < self.values.len() {
            return;
        }

        let new_len = (index + 1).max(self.values.len() * 2);
        self.values.resize_with(new_len, || None);
        self.members.grow(new_len);
    }

    /// Stores `value` for `model`, returning the value it replaced.
    ///
    /// # Panics
    /// Panics if `model` is [Model::INVALID]; slot 0 stays empty.
    pub fn set(&mut self, model: Model, value: C) -> Option<C> {
        assert!(!model.is_invalid(), "component stored on the invalid model");

        let index = model.index();
        self.ensure_index(index);
        self.members.insert(index);
        self.values[index].replace(value)
    }

    /// Clears `model`'s slot. Never grows the column.
    pub fn unset(&mut self, model: Model) -> Option<C> {
        let index = model.index();

        if index >= self.values.len() {
            return None;
        }

        let present = self.members.contains(index);
        self.members.set(index, false);
        let value = self.values[index].take();
        if present { value } else { None }
    }

    pub fn get(&self, model: Model) -> Option<&C> {
        let index = model.index();

        if !self.members.contains(index) {
            return None;
        }

        self.values[index].as_ref()
    }

    pub fn get_mut(&mut self, model: Model) -> Option<&mut C> {
        let index = model.index();

        if !self.members.contains(index) {
            return None;
        }

        self.values[index].as_mut()
    }

    /// Occupied slots in ascending model order.
    pub fn iter(&self) -> impl Iterator<Item = (Model, &C)> + '_ {
        self.members
            .ones()
            .filter_map(|index| {
                self.values[index]
                    .as_ref()
                    .map(|value| (Model::from_raw(index as u32), value))
            })
    }
}

/// Type-erased access to a [Column] for code that only knows its [ComponentId].
pub trait AnyColumn: Any {
    fn id(&self) -> ComponentId;
    fn key(&self) -> &TypeKey;
    fn members(&self) -> &FixedBitSet;
    fn contains(&self, model: Model) -> bool;
    /// Clears `model`'s slot, returning whether a value was dropped.
    fn clear_model(&mut self, model: Model) -> bool;
    fn len(&self) -> usize;
    fn capacity(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> AnyColumn for Column<C> {
    #[inline]
    fn id(&self) -> ComponentId {
        self.id
    }

    #[inline]
    fn key(&self) -> &TypeKey {
        &self.key
    }

    #[inline]
    fn members(&self) -> &FixedBitSet {
        &self.members
    }

    #[inline]
    fn contains(&self, model: Model) -> bool {
        Column::contains(self, model)
    }

    fn clear_model(&mut self, model: Model) -> bool {
        self.unset(model).is_some()
    }

    fn len(&self) -> usize {
        Column::len(self)
    }

    fn capacity(&self) -> usize {
        Column::capacity(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Price(u32);

    fn m(raw: u32) -> Model {
        Model::from_raw(raw)
    }

    #[test]
    fn set_get_unset() {
        let mut column = Column::<Price>::new(ComponentId::from_raw(1));

        assert!(column.set(m(3), Price(30)).is_none());
        assert_eq!(column.get(m(3)), Some(&Price(30)));
        assert!(column.contains(m(3)));
        assert_eq!(column.len(), 1);

        assert_eq!(column.set(m(3), Price(31)), Some(Price(30)));
        assert_eq!(column.get(m(3)), Some(&Price(31)));
        assert_eq!(column.len(), 1);

        assert_eq!(column.unset(m(3)), Some(Price(31)));
        assert!(column.get(m(3)).is_none());
        assert!(column.is_empty());
    }

    #[test]
    fn zero_value_is_not_absence() {
        let mut column = Column::<Price>::new(ComponentId::from_raw(1));
        column.set(m(1), Price::default());

        assert_eq!(column.get(m(1)), Some(&Price(0)));
        assert!(column.get(m(2)).is_none());
    }

    #[test]
    fn unset_beyond_capacity_does_not_grow() {
        let mut column = Column::<Price>::new(ComponentId::from_raw(1));
        column.set(m(2), Price(2));
        let capacity = column.capacity();

        assert!(column.unset(m(500)).is_none());
        assert_eq!(column.capacity(), capacity);
        assert!(column.unset(m(1)).is_none());
    }

    #[test]
    fn growth_keeps_lower_slots() {
        let mut column = Column::<Price>::new(ComponentId::from_raw(1));
        for raw in 1..=10 {
            column.set(m(raw), Price(raw));
        }

        column.set(m(1000), Price(1000));
        assert!(column.capacity() >= 1001);

        for raw in 1..=10 {
            assert_eq!(column.get(m(raw)), Some(&Price(raw)));
        }
        assert_eq!(column.get(m(1000)), Some(&Price(1000)));
        assert_eq!(column.len(), 11);
    }

    #[test]
    fn growth_is_amortized() {
        let mut column = Column::<Price>::with_capacity(ComponentId::from_raw(1), 8);
        assert_eq!(column.capacity(), 8);

        column.set(m(8), Price(8));
        assert_eq!(column.capacity(), 16);

        column.set(m(16), Price(16));
        assert_eq!(column.capacity(), 32);
    }

    #[test]
    fn iter_is_ascending_and_restartable() {
        let mut column = Column::<Price>::new(ComponentId::from_raw(1));
        column.set(m(9), Price(9));
        column.set(m(2), Price(2));
        column.set(m(5), Price(5));
        column.unset(m(5));

        let first: Vec<_> = column.iter().map(|(model, p)| (model, p.0)).collect();
        assert_eq!(first, vec![(m(2), 2), (m(9), 9)]);

        let second: Vec<_> = column.iter().map(|(model, _)| model).collect();
        assert_eq!(second, vec![m(2), m(9)]);
    }

    #[test]
    #[should_panic(expected = "invalid model")]
    fn reserved_slot_rejects_values() {
        let mut column = Column::<Price>::new(ComponentId::from_raw(1));
        column.set(Model::INVALID, Price(0));
    }

    #[test]
    fn iter_starts_after_reserved_slot() {
        let mut column = Column::<Price>::with_capacity(ComponentId::from_raw(1), 4);
        column.set(m(1), Price(1));

        assert!(!column.contains(Model::INVALID));
        assert_eq!(column.iter().next().map(|(model, _)| model), Some(m(1)));
        assert_eq!(column.len(), column.iter().count());
    }

    #[test]
    fn erased_access() {
        let mut column = Column::<Price>::new(ComponentId::from_raw(4));
        column.set(m(1), Price(1));

        let erased: &mut dyn AnyColumn = &mut column;
        assert_eq!(erased.id(), ComponentId::from_raw(4));
        assert!(erased.key().is::<Price>());
        assert!(erased.contains(m(1)));
        assert!(erased.as_any().downcast_ref::<Column<Price>>().is_some());

        assert!(erased.clear_model(m(1)));
        assert!(!erased.clear_model(m(1)));
        assert_eq!(erased.len(), 0);
    }
}
