// Copyright  (C) 2020, Kisio Digital and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Kisio Digital (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia
// www.navitia.io

//! Keyed storage of per-day transfer maps. The on-disk layout is the
//! concern of each implementation; the router only needs `get`.

use crate::transfers::TransferMap;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-day persistence of the precomputed transfer maps.
///
/// A day that was never prepared yields an empty map, not an error :
/// the router then runs with same-trip rides only, which is correct,
/// just less pruned.
pub trait TransferStore {
    fn get(&self, day: NaiveDate) -> Arc<TransferMap>;

    /// Stores the whole map of a day. The new snapshot becomes visible
    /// atomically to subsequent `get` calls.
    fn put(&mut self, day: NaiveDate, map: TransferMap);
}

/// The reference implementation, enough for tests and for small
/// deployments that rebuild at startup.
#[derive(Default)]
pub struct InMemoryTransferStore {
    days: HashMap<NaiveDate, Arc<TransferMap>>,
    empty: Arc<TransferMap>,
}

impl InMemoryTransferStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransferStore for InMemoryTransferStore {
    fn get(&self, day: NaiveDate) -> Arc<TransferMap> {
        self.days
            .get(&day)
            .cloned()
            .unwrap_or_else(|| self.empty.clone())
    }

    fn put(&mut self, day: NaiveDate, map: TransferMap) {
        self.days.insert(day, Arc::new(map));
    }
}

/// Caches per-day snapshots in front of a (possibly file-backed) store,
/// so repeated queries for the same day hit memory.
pub struct TransferCache<S: TransferStore> {
    store: S,
    cache: DashMap<NaiveDate, Arc<TransferMap>>,
}

impl<S: TransferStore> TransferCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    pub fn get(&self, day: NaiveDate) -> Arc<TransferMap> {
        if let Some(entry) = self.cache.get(&day) {
            return entry.clone();
        }
        self.cache
            .entry(day)
            .or_insert_with(|| self.store.get(day))
            .clone()
    }

    /// Writes through and refreshes the cached snapshot.
    pub fn put(&mut self, day: NaiveDate, map: TransferMap) {
        self.store.put(day, map);
        self.cache.insert(day, self.store.get(day));
    }
}
