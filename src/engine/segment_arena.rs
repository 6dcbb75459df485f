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

use crate::model::StoppingEvent;
use chrono::NaiveDate;

type Id = usize;

const MAX_ID: Id = usize::MAX;

/// Handle into the per-query [`SegmentArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentId {
    id: Id,
}

/// One enqueued ride : board trip `event.trip` at `event.stop_sequence`
/// and scan it up to (excluding) `to_stop_sequence`.
///
/// The `parent` links form a tree rooted at the round-0 seedings, so a
/// result can be unwound into a full journey. The whole tree lives in
/// the arena and is freed at once when the query ends.
#[derive(Debug, Clone)]
pub struct EnqueuedTripSegment {
    pub event: StoppingEvent,
    pub to_stop_sequence: u32,
    pub service_day: NaiveDate,
    /// The stopping event on the parent's trip where the traveller
    /// alighted before reaching this boarding. None on round-0 seeds.
    pub transfer_origin: Option<StoppingEvent>,
    pub parent: Option<SegmentId>,
    /// Index of the access stop used, set on round-0 seeds only.
    pub access: Option<usize>,
    /// Departure time of the journey's very first boarding, carried
    /// down so result dominance does not have to unwind the tree.
    pub departure_seconds: i32,
    /// Transfers the traveller has experienced when boarding this
    /// trip. A hop between vehicles sharing a gtfs block is a
    /// through-run and does not count, so this can lag behind the
    /// round number.
    pub nb_of_transfers: usize,
}

#[derive(Debug, Default)]
pub struct SegmentArena {
    segments: Vec<EnqueuedTripSegment>,
}

impl SegmentArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn push(&mut self, segment: EnqueuedTripSegment) -> SegmentId {
        debug_assert!(self.segments.len() < MAX_ID);
        let id = self.segments.len();
        self.segments.push(segment);
        SegmentId { id }
    }

    pub fn get(&self, id: SegmentId) -> &EnqueuedTripSegment {
        &self.segments[id.id]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
