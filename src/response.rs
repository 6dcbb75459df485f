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

//! Traveller-visible journeys, reconstructed from the parent chains of
//! the search tree.

use crate::engine::segment_arena::SegmentArena;
use crate::engine::trip_based::ResultLabel;
use crate::model::StopId;
use crate::request::RequestInput;
use crate::schedule::{ScheduleError, ScheduleIndex};
use chrono::{NaiveDate, NaiveDateTime};

/// One ride aboard a single vehicle.
#[derive(Debug, Clone)]
pub struct VehicleLeg {
    pub board_stop: StopId,
    pub board_datetime: NaiveDateTime,
    pub alight_stop: StopId,
    pub alight_datetime: NaiveDateTime,
    pub trip_id: String,
    pub route_id: String,
}

/// An ordered list of vehicle legs terminated by the egress walk.
#[derive(Debug, Clone)]
pub struct Journey {
    pub legs: Vec<VehicleLeg>,
    pub access_stop: StopId,
    pub egress_stop: StopId,
    /// Departure of the first vehicle.
    pub departure_datetime: NaiveDateTime,
    /// Arrival at the true destination, egress walk included.
    pub arrival_datetime: NaiveDateTime,
    /// Search round that produced this journey.
    pub round: u8,
    nb_of_transfers: usize,
}

impl Journey {
    pub fn nb_of_legs(&self) -> usize {
        self.legs.len()
    }

    /// Transfers a traveller actually experiences. Consecutive legs
    /// ridden by vehicles sharing a gtfs block are a through-run and
    /// count as a continuation, not a transfer.
    pub fn nb_of_transfers(&self) -> usize {
        self.nb_of_transfers
    }

    /// Pareto relation on (arrival, transfers, departure reversed).
    /// Transfers are the block-aware count : a journey riding a
    /// through-run is not penalised for its extra legs.
    pub fn dominates(&self, other: &Journey) -> bool {
        self.arrival_datetime <= other.arrival_datetime
            && self.nb_of_transfers() <= other.nb_of_transfers()
            && self.departure_datetime >= other.departure_datetime
    }
}

pub(crate) fn build_journey(
    index: &ScheduleIndex,
    arena: &SegmentArena,
    label: &ResultLabel,
    request: &RequestInput,
    service_day: NaiveDate,
) -> Result<Journey, ScheduleError> {
    let mut chain = Vec::new();
    let mut cursor = Some(label.parent);
    while let Some(id) = cursor {
        chain.push(id);
        cursor = arena.get(id).parent;
    }
    chain.reverse();

    let mut legs = Vec::with_capacity(chain.len());
    let mut nb_of_transfers = 0usize;
    let mut previous_block: Option<Option<String>> = None;
    for (position, segment_id) in chain.iter().enumerate() {
        let segment = arena.get(*segment_id);
        let board_event = &segment.event;
        let alight_event = match chain.get(position + 1) {
            Some(next_id) => arena
                .get(*next_id)
                .transfer_origin
                .clone()
                // enqueue always records the origin on non-root segments
                .expect("non root segments carry their transfer origin"),
            None => label.final_event.clone(),
        };

        let stop_times = index.stop_times(&board_event.feed, &board_event.trip)?;
        let board_stop_time = &stop_times[board_event.stop_sequence as usize];
        let alight_stop_time = &stop_times[alight_event.stop_sequence as usize];

        let metadata = index.trip_metadata(&board_event.feed, &board_event.trip)?;
        if let Some(previous_block) = &previous_block {
            let through_run = match (previous_block, &metadata.block_id) {
                (Some(previous), Some(current)) => previous == current,
                _ => false,
            };
            if !through_run {
                nb_of_transfers += 1;
            }
        }
        previous_block = Some(metadata.block_id.clone());

        legs.push(VehicleLeg {
            board_stop: StopId::new(
                board_event.feed.clone(),
                board_stop_time.stop_code.clone(),
            ),
            board_datetime: board_stop_time.departure.to_datetime(service_day),
            alight_stop: StopId::new(
                alight_event.feed.clone(),
                alight_stop_time.stop_code.clone(),
            ),
            alight_datetime: alight_stop_time.arrival.to_datetime(service_day),
            trip_id: board_event.trip.trip_id.clone(),
            route_id: board_event.trip.route_id.clone(),
        });
    }

    let root = arena.get(chain[0]);
    let access_stop = root
        .access
        .and_then(|access_idx| request.access.get(access_idx))
        .map(|access| access.stop.clone())
        // seeding always records the access stop on round-0 segments
        .expect("the root segment carries its access stop");
    let egress = &request.egress[label.egress];

    let departure_datetime = legs
        .first()
        .map(|leg| leg.board_datetime)
        .expect("a journey has at least one vehicle leg");
    let last_alight = legs
        .last()
        .map(|leg| leg.alight_datetime)
        .expect("a journey has at least one vehicle leg");
    let arrival_datetime = last_alight + chrono::Duration::milliseconds(egress.time_delta_ms);

    Ok(Journey {
        legs,
        access_stop,
        egress_stop: egress.stop.clone(),
        departure_datetime,
        arrival_datetime,
        round: label.round,
        nb_of_transfers,
    })
}
