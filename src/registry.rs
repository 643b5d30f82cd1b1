use crate::{
    component::{ComponentId, TypeKey},
    utils::TypeMap,
};
use std::any::TypeId;

/// Append-only map from component type to [ComponentId].
///
/// Ids are handed out sequentially starting at 1, slot 0 is held by
/// [ComponentId::INVALID]. Types are never unregistered.
pub struct TypeRegistry {
    ids: TypeMap<ComponentId>,
    keys: Vec<Option<TypeKey>>,
    rejected: [TypeId; 2],
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::with_capacity(32)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut keys = Vec::with_capacity(capacity.max(1));
        keys.push(None);

        Self {
            ids: TypeMap::with_capacity(capacity),
            keys,
            rejected: [TypeId::of::<String>(), TypeId::of::<&'static str>()],
        }
    }

    #[inline]
    pub fn id_of(&self, type_id: TypeId) -> Option<ComponentId> {
        self.ids.get_by_id(&type_id).copied()
    }

    #[inline]
    pub fn id_of_t<T: 'static>(&self) -> Option<ComponentId> {
        self.ids.get::<T>().copied()
    }

    /// Assigns the next sequential id to `key`.
    ///
    /// # Panics
    /// Panics if `key` is already registered; callers check [Self::id_of] first.
    pub fn add(&mut self, key: TypeKey) -> ComponentId {
        assert!(
            self.id_of(key.type_id()).is_none(),
            "component '{}' is already registered",
            key.type_name()
        );

        let id = ComponentId::from_raw(self.keys.len() as u32);
        self.ids.insert_by_id(key.type_id(), id);
        self.keys.push(Some(key));
        id
    }

    #[inline]
    pub fn key_of(&self, id: ComponentId) -> Option<&TypeKey> {
        self.keys.get(id.index()).and_then(Option::as_ref)
    }

    pub fn name_of(&self, id: ComponentId) -> Option<&'static str> {
        self.key_of(id).map(TypeKey::type_name)
    }

    /// Whether `id` was assigned by this registry.
    #[inline]
    pub fn is_assigned(&self, id: ComponentId) -> bool {
        !id.is_invalid() && id.index() < self.keys.len()
    }

    /// Types that may never be stored as components.
    #[inline]
    pub fn is_rejected(&self, type_id: TypeId) -> bool {
        self.rejected.contains(&type_id)
    }

    /// Number of registered types, not counting the reserved slot.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
