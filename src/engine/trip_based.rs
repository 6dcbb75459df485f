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

use crate::config::RouterConfig;
use crate::engine::segment_arena::{EnqueuedTripSegment, SegmentArena, SegmentId};
use crate::model::{FeedId, StopId, StoppingEvent, TripDescriptor};
use crate::request::{RequestError, RequestInput};
use crate::response::{self, Journey};
use crate::schedule::{first_boarding_at_or_after, ScheduleIndex};
use crate::time::{service_day_and_time, PositiveDuration, SecondsSinceServiceDayStart};
use crate::transfers::TransferMap;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// A Pareto-optimal way to reach one egress stop. The full journey is
/// recovered by unwinding `parent` to the round-0 seed.
#[derive(Debug, Clone)]
pub struct ResultLabel {
    pub round: u8,
    /// Transfers actually experienced, gtfs block through-runs not
    /// counted. This is the quantity results are dominated on; it can
    /// be smaller than `round`.
    pub transfers: usize,
    /// Index of the matched egress stop in the request.
    pub egress: usize,
    /// Where the traveller leaves the final vehicle.
    pub final_event: StoppingEvent,
    pub parent: SegmentId,
    pub(crate) arrival_seconds: i32,
    pub(crate) departure_seconds: i32,
}

/// One query worth of trip-based search. The index and the transfer
/// map are shared and immutable; all mutable state lives here and is
/// reset by each `route` call.
pub struct TripBasedRouter<'data> {
    index: &'data ScheduleIndex,
    transfers: &'data TransferMap,
    config: RouterConfig,

    arena: SegmentArena,
    queue: Vec<SegmentId>,
    earliest_arrival: i32,
    trip_done_from: HashMap<(FeedId, TripDescriptor), u32>,
    results: Vec<ResultLabel>,
    service_day: NaiveDate,
}

impl<'data> TripBasedRouter<'data> {
    pub fn new(
        index: &'data ScheduleIndex,
        transfers: &'data TransferMap,
        config: RouterConfig,
    ) -> Self {
        Self {
            index,
            transfers,
            config,
            arena: SegmentArena::new(),
            queue: Vec::new(),
            earliest_arrival: i32::MAX,
            trip_done_from: HashMap::new(),
            results: Vec::new(),
            service_day: NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch is a valid date"),
        }
    }

    /// Runs the multi-round scan for one departure instant.
    ///
    /// `abort` is checked between rounds; once raised, the journeys
    /// found so far are returned.
    pub fn route(
        &mut self,
        request: &RequestInput,
        abort: &AtomicBool,
    ) -> Result<Vec<Journey>, RequestError> {
        self.clear();

        let seeds = self.resolve_access(request)?;
        if seeds.is_empty() {
            return Ok(Vec::new());
        }
        self.seed(request, &seeds)?;
        let arena = &self.arena;
        self.queue
            .sort_by_key(|id| arena.get(*id).departure_seconds);
        debug!("round 0 : {} seed segments", self.queue.len());

        let egress_by_stop = egress_lookup(request);

        for round in 0..self.config.max_rounds {
            if abort.load(Ordering::Relaxed) {
                warn!("query aborted before round {}", round);
                break;
            }
            if self.queue.is_empty() {
                break;
            }
            self.scan_for_egress(round, &egress_by_stop)?;
            let next_queue = self.expand_transfers(request)?;
            debug!("round {} : {} segments enqueued", round + 1, next_queue.len());
            self.queue = next_queue;
        }

        let mut journeys = Vec::with_capacity(self.results.len());
        for label in &self.results {
            journeys.push(response::build_journey(
                self.index,
                &self.arena,
                label,
                request,
                self.service_day,
            )?);
        }
        Ok(journeys)
    }

    /// Naive profile search : one `route` run per minute of the window,
    /// latest first, merged into a single Pareto set.
    pub fn route_naive_profile(
        &mut self,
        request: &RequestInput,
        profile_length: PositiveDuration,
        abort: &AtomicBool,
    ) -> Result<Vec<Journey>, RequestError> {
        let mut accumulated: Vec<Journey> = Vec::new();
        let nb_of_minutes = profile_length.total_seconds() / 60;
        for minute in (0..=nb_of_minutes).rev() {
            if abort.load(Ordering::Relaxed) {
                break;
            }
            let mut shifted = request.clone();
            shifted.initial_datetime =
                request.initial_datetime + chrono::Duration::seconds(minute as i64 * 60);
            for journey in self.route(&shifted, abort)? {
                insert_journey(&mut accumulated, journey);
            }
        }
        Ok(accumulated)
    }

    fn clear(&mut self) {
        self.arena.clear();
        self.queue.clear();
        self.earliest_arrival = i32::MAX;
        self.trip_done_from.clear();
        self.results.clear();
    }

    /// Resolves each access stop into (stop index, service day, time of
    /// day). Stops of unknown feeds contribute nothing; access stops
    /// disagreeing on the service day make the query ill-defined.
    fn resolve_access(
        &mut self,
        request: &RequestInput,
    ) -> Result<Vec<(usize, SecondsSinceServiceDayStart)>, RequestError> {
        let mut resolved = Vec::new();
        let mut common_day: Option<(StopId, NaiveDate)> = None;
        for (access_idx, access) in request.access.iter().enumerate() {
            let zone = match access.zone {
                Some(zone) => zone,
                None => match self.index.feed_timezone(&access.stop.feed) {
                    Ok(zone) => zone,
                    Err(_) => continue,
                },
            };
            let departure_instant =
                request.initial_datetime + chrono::Duration::milliseconds(access.time_delta_ms);
            let (day, time_in_day) = service_day_and_time(departure_instant, zone);
            match &common_day {
                None => {
                    common_day = Some((access.stop.clone(), day));
                }
                Some((first_stop, first_day)) if *first_day != day => {
                    return Err(RequestError::IncompatibleServiceDays {
                        first_stop: first_stop.clone(),
                        first_day: *first_day,
                        second_stop: access.stop.clone(),
                        second_day: day,
                    });
                }
                Some(_) => {}
            }
            resolved.push((access_idx, time_in_day));
        }
        if let Some((_, day)) = common_day {
            self.service_day = day;
        }
        Ok(resolved)
    }

    /// Round 0 : board, at each access stop, the first fitting trip of
    /// every pattern.
    fn seed(
        &mut self,
        request: &RequestInput,
        seeds: &[(usize, SecondsSinceServiceDayStart)],
    ) -> Result<(), RequestError> {
        for (access_idx, earliest_departure) in seeds {
            let access = &request.access[*access_idx];
            let boardings_by_pattern = self.index.boardings_by_pattern(&access.stop);
            for boardings in boardings_by_pattern.values() {
                let start = first_boarding_at_or_after(boardings, *earliest_departure);
                for boarding in &boardings[start..] {
                    if !self.index.service_active(
                        &boarding.event.feed,
                        &boarding.event.trip,
                        self.service_day,
                    )? {
                        continue;
                    }
                    let metadata = self
                        .index
                        .trip_metadata(&boarding.event.feed, &boarding.event.trip)?;
                    if !request.trip_filter.is_trip_valid(metadata) {
                        continue;
                    }
                    let key = (boarding.event.feed.clone(), boarding.event.trip.clone());
                    let done = self.trip_done_from.entry(key).or_insert(u32::MAX);
                    *done = (*done).min(boarding.event.stop_sequence);
                    let id = self.arena.push(EnqueuedTripSegment {
                        event: boarding.event.clone(),
                        to_stop_sequence: u32::MAX,
                        service_day: self.service_day,
                        transfer_origin: None,
                        parent: None,
                        access: Some(*access_idx),
                        departure_seconds: boarding.departure.total_seconds(),
                        nb_of_transfers: 0,
                    });
                    self.queue.push(id);
                    break;
                }
            }
        }
        Ok(())
    }

    /// First pass of a round : walk every enqueued segment and record
    /// egress hits. Must run to completion before transfers are
    /// expanded, so the arrival bound is final for this round.
    fn scan_for_egress(
        &mut self,
        round: u8,
        egress_by_stop: &HashMap<StopId, (usize, i64)>,
    ) -> Result<(), RequestError> {
        for position in 0..self.queue.len() {
            let segment_id = self.queue[position];
            let segment = self.arena.get(segment_id).clone();
            let stop_times = self
                .index
                .stop_times(&segment.event.feed, &segment.event.trip)?;
            let from = segment.event.stop_sequence as usize + 1;
            let to = (segment.to_stop_sequence as usize).min(stop_times.len());
            for stop_time in &stop_times[from.min(to)..to] {
                let arrival = stop_time.arrival.total_seconds();
                if arrival >= self.earliest_arrival {
                    break;
                }
                if stop_time.dropoff_type == 1 {
                    continue;
                }
                let stop = StopId::new(segment.event.feed.clone(), stop_time.stop_code.clone());
                if let Some((egress_idx, time_delta_ms)) = egress_by_stop.get(&stop) {
                    let arrival_at_destination = arrival + (*time_delta_ms / 1000) as i32;
                    if arrival_at_destination < self.earliest_arrival {
                        self.earliest_arrival = arrival_at_destination;
                        self.insert_result(ResultLabel {
                            round,
                            transfers: segment.nb_of_transfers,
                            egress: *egress_idx,
                            final_event: StoppingEvent {
                                feed: segment.event.feed.clone(),
                                trip: segment.event.trip.clone(),
                                stop_sequence: stop_time.stop_sequence,
                            },
                            parent: segment_id,
                            arrival_seconds: arrival_at_destination,
                            departure_seconds: segment.departure_seconds,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Second pass of a round : expand the precomputed transfers of
    /// every reachable stopping event into next-round boardings.
    fn expand_transfers(
        &mut self,
        request: &RequestInput,
    ) -> Result<Vec<SegmentId>, RequestError> {
        let mut next_queue = Vec::new();
        let queue = std::mem::take(&mut self.queue);
        for segment_id in &queue {
            let segment = self.arena.get(*segment_id).clone();
            let stop_times = self
                .index
                .stop_times(&segment.event.feed, &segment.event.trip)?;
            let from = segment.event.stop_sequence as usize + 1;
            let to = (segment.to_stop_sequence as usize).min(stop_times.len());
            for stop_time in &stop_times[from.min(to)..to] {
                let arrival = stop_time.arrival.total_seconds();
                if arrival >= self.earliest_arrival {
                    break;
                }
                let here = StoppingEvent {
                    feed: segment.event.feed.clone(),
                    trip: segment.event.trip.clone(),
                    stop_sequence: stop_time.stop_sequence,
                };
                let destinations = match self.transfers.get(&here) {
                    Some(destinations) => destinations,
                    None => continue,
                };
                for destination in destinations {
                    let destination_times = self
                        .index
                        .stop_times(&destination.feed, &destination.trip)?;
                    let destination_departure = destination_times
                        [destination.stop_sequence as usize]
                        .departure
                        .total_seconds();
                    if destination_departure < arrival {
                        // that boarding only exists on the next service
                        // day, which this day's transfer map does not
                        // cover
                        continue;
                    }
                    self.enqueue(request, destination, &here, *segment_id, &mut next_queue)?;
                }
            }
        }
        self.queue = queue;
        Ok(next_queue)
    }

    fn enqueue(
        &mut self,
        request: &RequestInput,
        destination: &StoppingEvent,
        origin: &StoppingEvent,
        parent: SegmentId,
        next_queue: &mut Vec<SegmentId>,
    ) -> Result<(), RequestError> {
        let metadata = self
            .index
            .trip_metadata(&destination.feed, &destination.trip)?;
        if !request.trip_filter.is_trip_valid(metadata) {
            return Ok(());
        }
        let key = (destination.feed.clone(), destination.trip.clone());
        let done_from = self.trip_done_from.get(&key).copied().unwrap_or(u32::MAX);
        if destination.stop_sequence >= done_from {
            return Ok(());
        }

        let parent_segment = self.arena.get(parent);
        let parent_departure = parent_segment.departure_seconds;
        let parent_transfers = parent_segment.nb_of_transfers;
        let parent_metadata = self
            .index
            .trip_metadata(&parent_segment.event.feed, &parent_segment.event.trip)?;
        // staying aboard a gtfs block is a continuation, not a transfer
        let through_run = match (&parent_metadata.block_id, &metadata.block_id) {
            (Some(previous), Some(current)) => previous == current,
            _ => false,
        };
        let nb_of_transfers = if through_run {
            parent_transfers
        } else {
            parent_transfers + 1
        };
        let id = self.arena.push(EnqueuedTripSegment {
            event: destination.clone(),
            to_stop_sequence: done_from,
            service_day: self.service_day,
            transfer_origin: Some(origin.clone()),
            parent: Some(parent),
            access: None,
            departure_seconds: parent_departure,
            nb_of_transfers,
        });
        next_queue.push(id);

        // Trips of a pattern are sorted by departure : every trip at or
        // after this one reaches any stop from `stop_sequence` onward no
        // earlier, so they are all done from here.
        let pattern = self
            .index
            .pattern_of(&destination.feed, &destination.trip)?;
        let position = self
            .index
            .position_in_pattern(&destination.feed, &destination.trip)?;
        for other in &pattern.trips[position..] {
            let entry = self
                .trip_done_from
                .entry((destination.feed.clone(), other.clone()))
                .or_insert(u32::MAX);
            *entry = (*entry).min(destination.stop_sequence);
        }
        Ok(())
    }

    fn insert_result(&mut self, label: ResultLabel) {
        let dominated_by_existing = self.results.iter().any(|existing| {
            existing.arrival_seconds <= label.arrival_seconds
                && existing.transfers <= label.transfers
                && existing.departure_seconds >= label.departure_seconds
        });
        if dominated_by_existing {
            return;
        }
        self.results.retain(|existing| {
            !(existing.arrival_seconds >= label.arrival_seconds
                && existing.transfers >= label.transfers
                && existing.departure_seconds <= label.departure_seconds)
        });
        self.results.push(label);
    }
}

fn egress_lookup(request: &RequestInput) -> HashMap<StopId, (usize, i64)> {
    let mut lookup: HashMap<StopId, (usize, i64)> = HashMap::new();
    for (egress_idx, egress) in request.egress.iter().enumerate() {
        lookup
            .entry(egress.stop.clone())
            .and_modify(|entry| {
                if egress.time_delta_ms < entry.1 {
                    *entry = (egress_idx, egress.time_delta_ms);
                }
            })
            .or_insert((egress_idx, egress.time_delta_ms));
    }
    lookup
}

fn insert_journey(accumulated: &mut Vec<Journey>, journey: Journey) {
    if accumulated
        .iter()
        .any(|existing| existing.dominates(&journey))
    {
        return;
    }
    accumulated.retain(|existing| !journey.dominates(existing));
    accumulated.push(journey);
}
