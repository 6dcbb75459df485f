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

//! Offline precomputation of the per-day transfer map.
//!
//! For each trip run active on the target day, the trip is walked
//! backward while maintaining the earliest known arrival at every
//! reachable stop. A candidate onward boarding is retained only when
//! riding it improves that bound somewhere downstream; everything else
//! is dominated by a transfer recorded earlier.

use crate::config::TransferBuilderConfig;
use crate::model::{ExplicitTransfer, FeedId, StopId, StopTime, StoppingEvent, TripDescriptor};
use crate::schedule::{ScheduleError, ScheduleIndex};
use crate::time::SECONDS_PER_DAY;
use crate::transfers::{InterpolatedTransfers, TransferMap};
use chrono::NaiveDate;
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info};

pub struct TransferBuilder<'a> {
    index: &'a ScheduleIndex,
    walks: &'a InterpolatedTransfers,
    config: TransferBuilderConfig,
}

impl<'a> TransferBuilder<'a> {
    pub fn new(
        index: &'a ScheduleIndex,
        walks: &'a InterpolatedTransfers,
        config: TransferBuilderConfig,
    ) -> Self {
        Self {
            index,
            walks,
            config,
        }
    }

    /// Computes the transfer map of every trip run active on `day`.
    /// Trips are processed in parallel; each task reads the shared
    /// index and appends its origins to a concurrent map.
    pub fn build_day(&self, day: NaiveDate) -> Result<TransferMap, TransferError> {
        let runs = self.index.runs_active_on(day);
        debug!("{} trip runs active on {}", runs.len(), day);

        let collected: DashMap<StoppingEvent, Vec<StoppingEvent>> = DashMap::new();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.nb_of_threads)
            .build()?;
        pool.install(|| {
            runs.par_iter().try_for_each(|(feed, trip)| {
                let transfers = self.trip_transfers(feed, trip, day)?;
                for (origin, destinations) in transfers {
                    collected.insert(origin, destinations);
                }
                Ok::<(), ScheduleError>(())
            })
        })?;

        let map: TransferMap = collected.into_iter().collect();
        info!(
            "Transfer map for {} : {} stopping events, {} transfers",
            day,
            map.len(),
            map.nb_of_transfers(),
        );
        Ok(map)
    }

    /// Reachable onward boardings of every stopping event of one trip
    /// run, pruned by arrival-time dominance.
    pub fn trip_transfers(
        &self,
        feed: &FeedId,
        trip: &TripDescriptor,
        day: NaiveDate,
    ) -> Result<HashMap<StoppingEvent, Vec<StoppingEvent>>, ScheduleError> {
        let stop_times = self.index.stop_times(feed, trip)?;
        let feed_transfers = &self.index.network().feed(feed)?.transfers;
        let mut result = HashMap::new();

        // Alighting is impossible at the first stop, so the sweep covers
        // every stop but that one. The first backward pass seeds the
        // arrival bounds, walking costs folded in, so that the candidate
        // scan below only keeps boardings that beat them.
        let mut earliest_arrival: HashMap<StopId, i32> = HashMap::new();
        for stop_time in stop_times.iter().skip(1).rev() {
            let stop = StopId::new(feed.clone(), stop_time.stop_code.clone());
            let arrival = stop_time.arrival.total_seconds();
            update_bound(&mut earliest_arrival, stop.clone(), arrival);
            for walk in self.walks.from_stop(&stop) {
                update_bound(
                    &mut earliest_arrival,
                    walk.to_stop.clone(),
                    arrival + walk.street_time_seconds as i32,
                );
            }
        }

        for stop_time in stop_times.iter().skip(1).rev() {
            let origin = StoppingEvent {
                feed: feed.clone(),
                trip: trip.clone(),
                stop_sequence: stop_time.stop_sequence,
            };
            let stop = StopId::new(feed.clone(), stop_time.stop_code.clone());
            let mut destinations = Vec::new();

            let mut explicit_by_target: BTreeMap<&str, Vec<&ExplicitTransfer>> = BTreeMap::new();
            for transfer in feed_transfers
                .iter()
                .filter(|transfer| transfer.from_stop_code == stop_time.stop_code)
            {
                explicit_by_target
                    .entry(transfer.to_stop_code.as_str())
                    .or_default()
                    .push(transfer);
            }

            if !explicit_by_target.contains_key(stop_time.stop_code.as_str()) {
                self.insert_candidates(
                    day,
                    &mut earliest_arrival,
                    stop_time,
                    &mut destinations,
                    stop.clone(),
                    0,
                    &[],
                )?;
            }
            for (target, transfers) in &explicit_by_target {
                self.insert_candidates(
                    day,
                    &mut earliest_arrival,
                    stop_time,
                    &mut destinations,
                    StopId::new(feed.clone(), *target),
                    0,
                    transfers,
                )?;
            }
            for walk in self.walks.from_stop(&stop) {
                self.insert_candidates(
                    day,
                    &mut earliest_arrival,
                    stop_time,
                    &mut destinations,
                    walk.to_stop.clone(),
                    walk.street_time_seconds,
                    &[],
                )?;
            }

            result.insert(origin, destinations);
        }
        Ok(result)
    }

    /// Scans the boardings at `boarding_stop`, pattern by pattern, and
    /// retains at most the first fitting boarding of each pattern.
    fn insert_candidates(
        &self,
        day: NaiveDate,
        earliest_arrival: &mut HashMap<StopId, i32>,
        from_stop_time: &StopTime,
        destinations: &mut Vec<StoppingEvent>,
        boarding_stop: StopId,
        street_time_seconds: u32,
        explicit: &[&ExplicitTransfer],
    ) -> Result<(), ScheduleError> {
        let arrival = from_stop_time.arrival.total_seconds();
        let earliest_departure = arrival + street_time_seconds as i32;
        let departure_cap = arrival + self.config.max_transfer_duration.total_seconds() as i32;

        let boardings_by_pattern = self.index.boardings_by_pattern(&boarding_stop);
        for boardings in boardings_by_pattern.values() {
            for candidate in boardings {
                let candidate_times = self
                    .index
                    .stop_times(&candidate.event.feed, &candidate.event.trip)?;

                // an explicit minimum transfer time overrides the street
                // cost for the routes it is scoped to
                let mut earliest_departure_here = earliest_departure;
                for transfer in explicit {
                    let applies = transfer
                        .to_route_id
                        .as_deref()
                        .map_or(true, |route| route == candidate.event.trip.route_id);
                    if applies {
                        if let Some(min_transfer_time) = transfer.min_transfer_time {
                            earliest_departure_here =
                                earliest_departure_here.max(arrival + min_transfer_time as i32);
                        }
                    }
                }

                let departure = candidate_times[candidate.event.stop_sequence as usize]
                    .departure
                    .total_seconds();
                if departure >= departure_cap {
                    // every later boarding of this pattern is even worse
                    break;
                }
                if !self
                    .index
                    .service_active(&candidate.event.feed, &candidate.event.trip, day)?
                {
                    continue;
                }
                if departure < earliest_departure_here {
                    continue;
                }

                let mut keep = false;
                let mut overnight = false;
                for stop_time in &candidate_times[candidate.event.stop_sequence as usize..] {
                    if stop_time.stop_sequence == candidate.event.stop_sequence {
                        if stop_time.arrival.total_seconds() < earliest_departure {
                            overnight = true;
                        }
                        continue;
                    }
                    let mut destination_arrival = stop_time.arrival.total_seconds();
                    if overnight {
                        destination_arrival += SECONDS_PER_DAY;
                    }
                    let destination_stop = StopId::new(
                        candidate.event.feed.clone(),
                        stop_time.stop_code.clone(),
                    );
                    let previous = earliest_arrival
                        .get(&destination_stop)
                        .copied()
                        .unwrap_or(i32::MAX);
                    if destination_arrival < previous {
                        keep = true;
                        earliest_arrival.insert(destination_stop, destination_arrival);
                    }
                }
                if keep {
                    destinations.push(candidate.event.clone());
                }
                // later boardings of this pattern are dominated by
                // waiting for this one
                break;
            }
        }
        Ok(())
    }
}

fn update_bound(bounds: &mut HashMap<StopId, i32>, stop: StopId, arrival: i32) {
    let entry = bounds.entry(stop).or_insert(i32::MAX);
    *entry = (*entry).min(arrival);
}

#[derive(Debug)]
pub enum TransferError {
    Schedule(ScheduleError),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::error::Error for TransferError {}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Schedule(error) => write!(f, "{}", error),
            TransferError::ThreadPool(error) => {
                write!(f, "Unable to build the worker pool : {}", error)
            }
        }
    }
}

impl From<ScheduleError> for TransferError {
    fn from(error: ScheduleError) -> Self {
        TransferError::Schedule(error)
    }
}

impl From<rayon::ThreadPoolBuildError> for TransferError {
    fn from(error: rayon::ThreadPoolBuildError) -> Self {
        TransferError::ThreadPool(error)
    }
}
