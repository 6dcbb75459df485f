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

//! Precomputed trip-to-trip transfers : for each stopping event, the
//! onward boardings worth considering after alighting there.

pub mod builder;
pub mod codec;
pub mod store;

use crate::model::{InterpolatedTransfer, StopId, StoppingEvent};
use std::collections::HashMap;

pub use builder::TransferBuilder;
pub use store::{InMemoryTransferStore, TransferCache, TransferStore};

/// Reachable onward boardings of each stopping event, for one service
/// day. Built offline, read-only at query time.
#[derive(Debug, Default)]
pub struct TransferMap {
    map: HashMap<StoppingEvent, Vec<StoppingEvent>>,
}

impl TransferMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, origin: &StoppingEvent) -> Option<&[StoppingEvent]> {
        self.map.get(origin).map(Vec::as_slice)
    }

    pub fn insert(&mut self, origin: StoppingEvent, destinations: Vec<StoppingEvent>) {
        self.map.insert(origin, destinations);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn nb_of_transfers(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StoppingEvent, &[StoppingEvent])> {
        self.map
            .iter()
            .map(|(origin, destinations)| (origin, destinations.as_slice()))
    }
}

impl From<HashMap<StoppingEvent, Vec<StoppingEvent>>> for TransferMap {
    fn from(map: HashMap<StoppingEvent, Vec<StoppingEvent>>) -> Self {
        Self { map }
    }
}

impl FromIterator<(StoppingEvent, Vec<StoppingEvent>)> for TransferMap {
    fn from_iter<I: IntoIterator<Item = (StoppingEvent, Vec<StoppingEvent>)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

/// Short street walks between nearby stops, possibly across feeds.
/// Directed : a walk from A to B does not imply one from B to A.
#[derive(Debug, Default)]
pub struct InterpolatedTransfers {
    map: HashMap<StopId, Vec<InterpolatedTransfer>>,
}

impl InterpolatedTransfers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, from: StopId, to: StopId, street_time_seconds: u32) {
        self.map.entry(from).or_default().push(InterpolatedTransfer {
            to_stop: to,
            street_time_seconds,
        });
    }

    pub fn from_stop(&self, stop: &StopId) -> &[InterpolatedTransfer] {
        self.map.get(stop).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nb_of_walks(&self) -> usize {
        self.map.values().map(Vec::len).sum()
    }
}
