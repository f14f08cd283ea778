//! # Item Catalog
//!
//! Bidirectional mapping between item names and dense `ItemId`s.
//!
//! Ids are assigned in first-seen order starting at 0. The mapping is
//! append-only: no item is ever removed or renamed, so ids `0..len()` are
//! always exactly the known items.

use crate::ItemId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCatalog {
    /// Id -> name, indexed by `ItemId::index`.
    names: Vec<String>,
    /// Name -> id reverse lookup.
    ids: BTreeMap<String, ItemId>,
}

impl ItemCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of `name`, assigning the next sequential id if unknown.
    ///
    /// The boolean is `true` when a new id was assigned.
    pub fn get_or_create_id(&mut self, name: &str) -> (ItemId, bool) {
        if let Some(&id) = self.ids.get(name) {
            return (id, false);
        }

        let id = ItemId(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.ids.insert(name.to_owned(), id);
        (id, true)
    }

    /// Look up the id of a known name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ItemId> {
        self.ids.get(name).copied()
    }

    /// Look up the name of a known id.
    #[must_use]
    pub fn name_of(&self, id: ItemId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// All names in id order.
    #[must_use]
    pub fn names_in_id_order(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_assigned_in_first_seen_order() {
        let mut catalog = ItemCatalog::new();
        assert_eq!(catalog.get_or_create_id("milk"), (ItemId(0), true));
        assert_eq!(catalog.get_or_create_id("bread"), (ItemId(1), true));
        assert_eq!(catalog.get_or_create_id("eggs"), (ItemId(2), true));
        assert_eq!(catalog.names_in_id_order(), ["milk", "bread", "eggs"]);
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let mut catalog = ItemCatalog::new();
        let (first, _) = catalog.get_or_create_id("milk");
        let (second, created) = catalog.get_or_create_id("milk");
        assert_eq!(first, second);
        assert!(!created);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn lookups_are_bidirectional() {
        let mut catalog = ItemCatalog::new();
        catalog.get_or_create_id("milk");
        let (bread, _) = catalog.get_or_create_id("bread");

        assert_eq!(catalog.id_of("bread"), Some(bread));
        assert_eq!(catalog.name_of(bread), Some("bread"));
        assert_eq!(catalog.id_of("cheese"), None);
        assert_eq!(catalog.name_of(ItemId(9)), None);
    }
}
