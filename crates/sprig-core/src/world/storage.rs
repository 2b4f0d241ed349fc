use super::Entity;
use crate::{
    alloc::sparse_set::{IndexSlot, SparseSet},
    profiling::profile_function,
};

/// Dense storage for one component type, indexed by entity slot.
///
/// Lookups are constant time and check the entity's generation, so a
/// component is never returned for a recycled entity slot.
pub struct Storage<T> {
    ids: Vec<Option<(Entity, IndexSlot)>>,
    comps: SparseSet<T>,
}

impl<T> Default for Storage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Storage<T> {
    pub const fn new() -> Self {
        Self {
            ids: Vec::new(),
            comps: SparseSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.comps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comps.is_empty()
    }

    fn slot(&self, ent: Entity) -> Option<IndexSlot> {
        match self.ids.get(ent.index() as usize)? {
            Some((owner, idx)) if *owner == ent => Some(*idx),
            _ => None,
        }
    }

    pub fn get(&self, ent: Entity) -> Option<&T> {
        profile_function!();
        self.comps.try_get(self.slot(ent)?)
    }

    pub fn get_mut(&mut self, ent: Entity) -> Option<&mut T> {
        let idx = self.slot(ent)?;
        self.comps.try_get_mut(idx)
    }

    pub fn contains(&self, ent: Entity) -> bool {
        self.slot(ent).is_some()
    }

    /// Insert or replace the component of `ent`, returning the old value.
    pub fn insert(&mut self, ent: Entity, comp: T) -> Option<T> {
        profile_function!();
        let previous = self.remove(ent);
        let idx = self.comps.push(comp);
        let slot = ent.index() as usize;
        if slot >= self.ids.len() {
            let mut new_len = self.ids.len();
            while new_len <= slot {
                new_len = new_len * 3 / 2 + 1;
            }
            self.ids.resize(new_len, None);
        }
        self.ids[slot] = Some((ent, idx));
        previous
    }

    pub fn remove(&mut self, ent: Entity) -> Option<T> {
        let idx = self.slot(ent)?;
        self.ids[ent.index() as usize] = None;
        self.comps.try_remove(idx)
    }

    /// Components with their owning entity, in insertion-slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.ids
            .iter()
            .flatten()
            .filter_map(|(ent, idx)| self.comps.try_get(*idx).map(|c| (*ent, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Entities;

    #[test]
    fn insert_get_remove() {
        let mut entities = Entities::new();
        let mut storage = Storage::<u8>::new();
        let a = entities.spawn();
        let b = entities.spawn();

        assert_eq!(storage.insert(a, 42), None);
        storage.insert(b, 59);
        assert_eq!(storage.get(a), Some(&42));
        assert_eq!(storage.insert(a, 43), Some(42));
        assert_eq!(storage.remove(a), Some(43));
        assert_eq!(storage.get(a), None);
        assert_eq!(storage.get(b), Some(&59));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn stale_entity_does_not_see_new_component() {
        let mut entities = Entities::new();
        let mut storage = Storage::new();
        let old = entities.spawn();
        entities.despawn(old).unwrap();
        let new = entities.spawn();
        storage.insert(new, "new");

        assert_eq!(old.index(), new.index());
        assert_eq!(storage.get(old), None);
        assert_eq!(storage.remove(old), None);
        assert_eq!(storage.get(new), Some(&"new"));
    }

    #[test]
    fn iter_yields_owners() {
        let mut entities = Entities::new();
        let mut storage = Storage::new();
        let a = entities.spawn();
        let _gap = entities.spawn();
        let c = entities.spawn();
        storage.insert(c, 3);
        storage.insert(a, 1);
        let items: Vec<_> = storage.iter().collect();
        assert_eq!(items, vec![(a, &1), (c, &3)]);
    }
}
