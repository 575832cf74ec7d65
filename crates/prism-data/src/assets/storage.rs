// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A generic, type-safe storage for loaded assets.

use prism_core::asset::{Asset, AssetId, AssetUUID};
use std::collections::HashMap;

/// An in-memory store for every loaded asset of type `A`.
///
/// Each asset is filed under the `AssetUUID` issued when it was inserted, so
/// ids stay valid when the asset value is mutated or replaced in place.
pub struct Assets<A: Asset> {
    storage: HashMap<AssetUUID, A>,
}

impl<A: Asset> Default for Assets<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Asset + Clone> Clone for Assets<A> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<A: Asset> Assets<A> {
    /// Creates a new, empty asset storage.
    pub fn new() -> Self {
        Self {
            storage: HashMap::new(),
        }
    }

    /// Stores an asset under a freshly issued id.
    pub fn add(&mut self, asset: A) -> AssetId<A> {
        let id = AssetId::from_uuid(AssetUUID::new());
        self.storage.insert(id.uuid(), asset);
        id
    }

    /// Stores an asset under a known id, returning the asset it replaced.
    pub fn insert(&mut self, id: AssetId<A>, asset: A) -> Option<A> {
        self.storage.insert(id.uuid(), asset)
    }

    /// Retrieves the asset with the given id.
    pub fn get(&self, id: AssetId<A>) -> Option<&A> {
        self.storage.get(&id.uuid())
    }

    /// Retrieves the asset with the given id for mutation.
    pub fn get_mut(&mut self, id: AssetId<A>) -> Option<&mut A> {
        self.storage.get_mut(&id.uuid())
    }

    /// Retrieves an asset by its untyped UUID.
    pub fn get_by_uuid(&self, uuid: &AssetUUID) -> Option<&A> {
        self.storage.get(uuid)
    }

    /// Checks if an asset with the specified id exists in the storage.
    pub fn contains(&self, id: AssetId<A>) -> bool {
        self.storage.contains_key(&id.uuid())
    }

    /// Removes an asset from the storage.
    pub fn remove(&mut self, id: AssetId<A>) -> Option<A> {
        self.storage.remove(&id.uuid())
    }

    /// Returns the number of stored assets.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if no asset is stored.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Iterates over every stored asset with its id.
    pub fn iter(&self) -> impl Iterator<Item = (AssetId<A>, &A)> {
        self.storage
            .iter()
            .map(|(uuid, asset)| (AssetId::from_uuid(*uuid), asset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Blob(u32);
    impl Asset for Blob {}

    #[test]
    fn add_issues_distinct_ids() {
        let mut assets = Assets::new();
        let a = assets.add(Blob(1));
        let b = assets.add(Blob(1));

        assert_ne!(a, b);
        assert_eq!(assets.len(), 2);
        assert_eq!(assets.get(a), Some(&Blob(1)));
    }

    #[test]
    fn mutation_keeps_the_id() {
        let mut assets = Assets::new();
        let id = assets.add(Blob(1));
        assets.get_mut(id).expect("present").0 = 7;

        assert_eq!(assets.get(id), Some(&Blob(7)));
        assert_eq!(assets.remove(id), Some(Blob(7)));
        assert!(!assets.contains(id));
    }
}
