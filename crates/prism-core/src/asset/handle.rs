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

use super::{Asset, AssetUUID};
use serde::{Deserialize, Serialize};
use std::{fmt, hash::Hash, marker::PhantomData};

/// A typed, copyable reference to an asset of type `T`.
///
/// Two `AssetId`s are equal exactly when they name the same logical resource,
/// which makes them suitable as cache keys.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId<T: Asset> {
    uuid: AssetUUID,
    #[serde(skip)]
    _marker: PhantomData<fn() -> T>,
}

impl<T: Asset> AssetId<T> {
    /// Creates a typed id from a raw UUID.
    pub fn from_uuid(uuid: AssetUUID) -> Self {
        Self {
            uuid,
            _marker: PhantomData,
        }
    }

    /// Returns the untyped UUID of this asset.
    pub fn uuid(&self) -> AssetUUID {
        self.uuid
    }
}

impl<T: Asset> Clone for AssetId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Asset> Copy for AssetId<T> {}

impl<T: Asset> PartialEq for AssetId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<T: Asset> Eq for AssetId<T> {}

impl<T: Asset> Hash for AssetId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl<T: Asset> fmt::Debug for AssetId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_name = std::any::type_name::<T>();
        let short = type_name.rsplit("::").next().unwrap_or(type_name);
        write!(f, "AssetId<{short}>({})", self.uuid)
    }
}

impl<T: Asset> fmt::Display for AssetId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.uuid, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Dummy;
    impl Asset for Dummy {}

    #[test]
    fn ids_compare_by_uuid() {
        let uuid = AssetUUID::new();
        let a = AssetId::<Dummy>::from_uuid(uuid);
        let b = AssetId::<Dummy>::from_uuid(uuid);
        let c = AssetId::<Dummy>::from_uuid(AssetUUID::new());

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn debug_names_the_asset_type() {
        let id = AssetId::<Dummy>::from_uuid(AssetUUID::new());
        assert!(format!("{id:?}").starts_with("AssetId<Dummy>("));
    }
}
