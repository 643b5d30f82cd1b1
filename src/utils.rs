use std::{
    any::TypeId,
    collections::HashMap,
    hash::{BuildHasher, Hasher},
};

/// Hasher for keys that are already well distributed, such as [TypeId].
#[derive(Clone, Default)]
pub struct NoOpHash;

impl BuildHasher for NoOpHash {
    type Hasher = NoOpHasher;

    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher(0)
    }
}

pub struct NoOpHasher(u64);

impl Hasher for NoOpHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, _bytes: &[u8]) {
        // TypeId hashes through write_u64; other key types don't belong in a TypeMap.
        panic!("NoOpHasher only accepts u64 keys");
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }
}

/// Map keyed by a static type.
pub struct TypeMap<V> {
    types: HashMap<TypeId, V, NoOpHash>,
}

impl<V> Default for TypeMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TypeMap<V> {
    pub fn new() -> Self {
        Self {
            types: HashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            types: HashMap::with_capacity_and_hasher(capacity, NoOpHash),
        }
    }

    #[inline]
    pub fn get<T: 'static>(&self) -> Option<&V> {
        self.types.get(&TypeId::of::<T>())
    }

    #[inline]
    pub fn get_by_id(&self, type_id: &TypeId) -> Option<&V> {
        self.types.get(type_id)
    }

    #[inline]
    pub fn insert<T: 'static>(&mut self, val: V) -> Option<V> {
        self.types.insert(TypeId::of::<T>(), val)
    }

    #[inline]
    pub fn insert_by_id(&mut self, type_id: TypeId, val: V) -> Option<V> {
        self.types.insert(type_id, val)
    }

    pub fn remove<T: 'static>(&mut self) -> Option<V> {
        self.types.remove(&TypeId::of::<T>())
    }

    #[inline]
    pub fn contains<T: 'static>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<T>())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::TypeMap;

    #[test]
    fn type_map_keys_by_type() {
        let mut map = TypeMap::new();
        assert!(map.insert::<u8>("byte").is_none());
        assert!(map.insert::<u16>("short").is_none());

        assert_eq!(map.get::<u8>(), Some(&"byte"));
        assert_eq!(map.insert::<u8>("octet"), Some("byte"));
        assert_eq!(map.len(), 2);

        assert_eq!(map.remove::<u16>(), Some("short"));
        assert!(!map.contains::<u16>());
        assert!(map.get::<u32>().is_none());
    }
}
