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

//! The immutable in-memory representation of the schedule, organised
//! for the lookups the transfer precomputation and the router need :
//! stop times by trip, pattern and service by trip, and per-stop
//! boarding lists grouped by pattern, sorted by departure time.

use crate::model::{
    FeedId, ModelError, Network, StopId, StopTime, StoppingEvent, Trip, TripDescriptor,
};
use crate::time::SecondsSinceServiceDayStart;
use chrono::NaiveDate;
use chrono_tz::Tz;
use dashmap::DashMap;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternId {
    pub(crate) idx: usize,
}

/// Equivalence class of trips sharing the same stop sequence and the
/// same pickup/dropoff flags.
#[derive(Debug)]
pub struct Pattern {
    pub id: PatternId,
    pub feed: FeedId,
    pub stop_codes: Vec<String>,
    pub pickup_types: Vec<u8>,
    pub dropoff_types: Vec<u8>,
    /// Sorted by first-stop departure time. Feeds where this order is
    /// not a total order along the whole trip are accepted; pruning in
    /// the router is then less effective, never incorrect.
    pub trips: Vec<TripDescriptor>,
}

impl Pattern {
    pub fn nb_of_stops(&self) -> usize {
        self.stop_codes.len()
    }

    pub fn position_of(&self, trip: &TripDescriptor) -> Option<usize> {
        self.trips.iter().position(|candidate| candidate == trip)
    }
}

/// A boardable stopping event, with the departure time of its trip at
/// the boarding stop.
#[derive(Debug, Clone)]
pub struct Boarding {
    pub event: StoppingEvent,
    pub departure: SecondsSinceServiceDayStart,
}

/// First index in `boardings` (sorted by departure) whose departure is
/// at or after `time`.
pub fn first_boarding_at_or_after(boardings: &[Boarding], time: SecondsSinceServiceDayStart) -> usize {
    boardings.partition_point(|boarding| boarding.departure < time)
}

#[derive(Debug)]
struct TripData {
    stop_times: Vec<StopTime>,
    pattern: PatternId,
    position_in_pattern: usize,
    trip_id: String,
    service_id: String,
}

type BoardingsByPattern = BTreeMap<PatternId, Vec<Boarding>>;

pub struct ScheduleIndex {
    network: Network,
    patterns: Vec<Pattern>,
    trips: HashMap<FeedId, HashMap<TripDescriptor, TripData>>,
    /// Boardable (pattern, stop_sequence) pairs at each stop.
    positions_by_stop: HashMap<StopId, Vec<(PatternId, u32)>>,
    /// Lazily filled, at most one computation per stop.
    boardings_cache: DashMap<StopId, Arc<BoardingsByPattern>>,
}

impl ScheduleIndex {
    pub fn build(network: Network) -> Result<Self, ScheduleError> {
        // stop codes, pickup flags, dropoff flags
        type PatternKey = (Vec<String>, Vec<u8>, Vec<u8>);
        // descriptor, shifted stop times, trip_id, service_id
        type Run = (TripDescriptor, Vec<StopTime>, String, String);

        let mut patterns: Vec<Pattern> = Vec::new();
        let mut trips: HashMap<FeedId, HashMap<TripDescriptor, TripData>> = HashMap::new();
        let mut positions_by_stop: HashMap<StopId, Vec<(PatternId, u32)>> = HashMap::new();

        for (feed_id, feed) in &network.feeds {
            let mut groups: BTreeMap<PatternKey, Vec<Run>> = BTreeMap::new();

            for (trip_id, trip) in &feed.trips {
                let stop_times =
                    feed.stop_times
                        .get(trip_id)
                        .ok_or_else(|| ScheduleError::InconsistentStopTimes {
                            feed: feed_id.clone(),
                            trip_id: trip_id.clone(),
                        })?;
                check_stop_times(feed_id, feed, trip_id, stop_times)?;
                if !feed.services.contains_key(&trip.service_id) {
                    return Err(ScheduleError::ServiceMissing {
                        feed: feed_id.clone(),
                        service_id: trip.service_id.clone(),
                    });
                }

                let key: PatternKey = (
                    stop_times.iter().map(|st| st.stop_code.clone()).collect(),
                    stop_times.iter().map(|st| st.pickup_type).collect(),
                    stop_times.iter().map(|st| st.dropoff_type).collect(),
                );
                let group = groups.entry(key).or_default();

                for (descriptor, run_stop_times) in expand_runs(trip, stop_times, feed) {
                    group.push((
                        descriptor,
                        run_stop_times,
                        trip_id.clone(),
                        trip.service_id.clone(),
                    ));
                }
            }

            for (_, mut group) in groups {
                group.sort_by(|lhs, rhs| {
                    let lhs_key = (lhs.1[0].departure, &lhs.0.trip_id, lhs.0.start_time);
                    let rhs_key = (rhs.1[0].departure, &rhs.0.trip_id, rhs.0.start_time);
                    lhs_key.cmp(&rhs_key)
                });

                let pattern_id = PatternId {
                    idx: patterns.len(),
                };
                let first_stop_times = &group[0].1;
                let pattern = Pattern {
                    id: pattern_id,
                    feed: feed_id.clone(),
                    stop_codes: first_stop_times
                        .iter()
                        .map(|st| st.stop_code.clone())
                        .collect(),
                    pickup_types: first_stop_times.iter().map(|st| st.pickup_type).collect(),
                    dropoff_types: first_stop_times.iter().map(|st| st.dropoff_type).collect(),
                    trips: group.iter().map(|entry| entry.0.clone()).collect(),
                };

                for (position, (descriptor, run_stop_times, trip_id, service_id)) in
                    group.into_iter().enumerate()
                {
                    trips.entry(feed_id.clone()).or_default().insert(
                        descriptor,
                        TripData {
                            stop_times: run_stop_times,
                            pattern: pattern_id,
                            position_in_pattern: position,
                            trip_id,
                            service_id,
                        },
                    );
                }

                let last_position = pattern.nb_of_stops() - 1;
                for (position, stop_code) in pattern.stop_codes.iter().enumerate() {
                    // a boarding at the last stop of a trip goes nowhere
                    if position == last_position || pattern.pickup_types[position] == 1 {
                        continue;
                    }
                    positions_by_stop
                        .entry(StopId::new(feed_id.clone(), stop_code.clone()))
                        .or_default()
                        .push((pattern_id, position as u32));
                }

                patterns.push(pattern);
            }
        }

        let nb_of_trips: usize = trips.values().map(HashMap::len).sum();
        info!(
            "Schedule indexed : {} feeds, {} patterns, {} trip runs",
            network.nb_of_feeds(),
            patterns.len(),
            nb_of_trips,
        );

        Ok(Self {
            network,
            patterns,
            trips,
            positions_by_stop,
            boardings_cache: DashMap::new(),
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn nb_of_patterns(&self) -> usize {
        self.patterns.len()
    }

    pub fn feed_timezone(&self, feed: &FeedId) -> Result<Tz, ScheduleError> {
        Ok(self.network.feed(feed)?.timezone)
    }

    fn trip_data(&self, feed: &FeedId, trip: &TripDescriptor) -> Result<&TripData, ScheduleError> {
        self.trips
            .get(feed)
            .ok_or_else(|| ScheduleError::UnknownFeed { feed: feed.clone() })?
            .get(trip)
            .ok_or_else(|| ScheduleError::UnknownTrip {
                feed: feed.clone(),
                trip_id: trip.trip_id.clone(),
            })
    }

    /// Ordered stop times of one trip run.
    pub fn stop_times(
        &self,
        feed: &FeedId,
        trip: &TripDescriptor,
    ) -> Result<&[StopTime], ScheduleError> {
        Ok(&self.trip_data(feed, trip)?.stop_times)
    }

    pub fn pattern_of(
        &self,
        feed: &FeedId,
        trip: &TripDescriptor,
    ) -> Result<&Pattern, ScheduleError> {
        let data = self.trip_data(feed, trip)?;
        Ok(&self.patterns[data.pattern.idx])
    }

    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.idx]
    }

    pub fn position_in_pattern(
        &self,
        feed: &FeedId,
        trip: &TripDescriptor,
    ) -> Result<usize, ScheduleError> {
        Ok(self.trip_data(feed, trip)?.position_in_pattern)
    }

    pub fn trip_metadata(
        &self,
        feed: &FeedId,
        trip: &TripDescriptor,
    ) -> Result<&Trip, ScheduleError> {
        let data = self.trip_data(feed, trip)?;
        self.network
            .feed(feed)?
            .trips
            .get(&data.trip_id)
            .ok_or_else(|| ScheduleError::UnknownTrip {
                feed: feed.clone(),
                trip_id: data.trip_id.clone(),
            })
    }

    pub fn service_active(
        &self,
        feed: &FeedId,
        trip: &TripDescriptor,
        date: NaiveDate,
    ) -> Result<bool, ScheduleError> {
        let data = self.trip_data(feed, trip)?;
        let calendar = self
            .network
            .feed(feed)?
            .services
            .get(&data.service_id)
            .ok_or_else(|| ScheduleError::ServiceMissing {
                feed: feed.clone(),
                service_id: data.service_id.clone(),
            })?;
        Ok(calendar.active_on(date))
    }

    /// Every trip run of every feed whose service is active on `date`.
    pub fn runs_active_on(&self, date: NaiveDate) -> Vec<(FeedId, TripDescriptor)> {
        let mut runs = Vec::new();
        for (feed_id, feed_trips) in &self.trips {
            let feed = match self.network.feeds.get(feed_id) {
                Some(feed) => feed,
                None => continue,
            };
            for (descriptor, data) in feed_trips {
                let active = feed
                    .services
                    .get(&data.service_id)
                    .map(|calendar| calendar.active_on(date))
                    .unwrap_or(false);
                if active {
                    runs.push((feed_id.clone(), descriptor.clone()));
                }
            }
        }
        runs
    }

    /// Boardings at `stop`, grouped by pattern, each group sorted by
    /// departure time at that stop.
    ///
    /// The result is memoised. Concurrent callers for the same stop
    /// either observe the completed entry or wait on the one shared
    /// computation.
    pub fn boardings_by_pattern(&self, stop: &StopId) -> Arc<BoardingsByPattern> {
        if let Some(entry) = self.boardings_cache.get(stop) {
            return entry.clone();
        }
        self.boardings_cache
            .entry(stop.clone())
            .or_insert_with(|| Arc::new(self.compute_boardings(stop)))
            .clone()
    }

    fn compute_boardings(&self, stop: &StopId) -> BoardingsByPattern {
        let mut result = BoardingsByPattern::new();
        let positions = match self.positions_by_stop.get(stop) {
            Some(positions) => positions,
            None => return result,
        };
        for (pattern_id, stop_sequence) in positions {
            let pattern = &self.patterns[pattern_id.idx];
            let boardings = result.entry(*pattern_id).or_default();
            for descriptor in &pattern.trips {
                let data = match self.trip_data(&pattern.feed, descriptor) {
                    Ok(data) => data,
                    Err(_) => continue,
                };
                let departure = data.stop_times[*stop_sequence as usize].departure;
                boardings.push(Boarding {
                    event: StoppingEvent {
                        feed: pattern.feed.clone(),
                        trip: descriptor.clone(),
                        stop_sequence: *stop_sequence,
                    },
                    departure,
                });
            }
        }
        for boardings in result.values_mut() {
            boardings.sort_by(|lhs, rhs| {
                (lhs.departure, lhs.event.stop_sequence)
                    .cmp(&(rhs.departure, rhs.event.stop_sequence))
            });
        }
        result
    }
}

/// Frequency-based trips are unfolded into one run per start time,
/// shifting every stop time accordingly. Plain trips yield a single
/// run with no start time.
fn expand_runs(
    trip: &Trip,
    stop_times: &[StopTime],
    feed: &crate::model::Feed,
) -> Vec<(TripDescriptor, Vec<StopTime>)> {
    let frequencies = match feed.frequencies.get(&trip.trip_id) {
        Some(frequencies) if !frequencies.is_empty() => frequencies,
        _ => {
            return vec![(
                TripDescriptor {
                    trip_id: trip.trip_id.clone(),
                    start_time: None,
                    route_id: trip.route_id.clone(),
                },
                stop_times.to_vec(),
            )]
        }
    };

    let first_departure = stop_times[0].departure;
    let mut runs = Vec::new();
    for frequency in frequencies {
        let mut start = frequency.start_time;
        while start < frequency.end_time {
            let shift = i64::from(start.total_seconds() - first_departure.total_seconds());
            let shifted = stop_times
                .iter()
                .map(|st| {
                    let mut shifted = st.clone();
                    shifted.arrival = st
                        .arrival
                        .checked_add_seconds(shift)
                        .unwrap_or(st.arrival);
                    shifted.departure = st
                        .departure
                        .checked_add_seconds(shift)
                        .unwrap_or(st.departure);
                    shifted
                })
                .collect();
            runs.push((
                TripDescriptor {
                    trip_id: trip.trip_id.clone(),
                    start_time: Some(start),
                    route_id: trip.route_id.clone(),
                },
                shifted,
            ));
            start = match start.checked_add_seconds(i64::from(frequency.headway_secs)) {
                Some(next) => next,
                None => break,
            };
        }
    }
    runs
}

fn check_stop_times(
    feed_id: &FeedId,
    feed: &crate::model::Feed,
    trip_id: &str,
    stop_times: &[StopTime],
) -> Result<(), ScheduleError> {
    let inconsistent = || ScheduleError::InconsistentStopTimes {
        feed: feed_id.clone(),
        trip_id: trip_id.to_string(),
    };
    if stop_times.len() < 2 {
        return Err(inconsistent());
    }
    for (position, stop_time) in stop_times.iter().enumerate() {
        if stop_time.stop_sequence != position as u32 {
            return Err(inconsistent());
        }
        if stop_time.arrival > stop_time.departure {
            return Err(inconsistent());
        }
        if let Some(next) = stop_times.get(position + 1) {
            if stop_time.departure > next.arrival {
                return Err(inconsistent());
            }
        }
        if !feed.stops.contains_key(&stop_time.stop_code) {
            return Err(ScheduleError::UnknownStop {
                stop: StopId::new(feed_id.clone(), stop_time.stop_code.clone()),
            });
        }
    }
    Ok(())
}

#[derive(Debug)]
pub enum ScheduleError {
    UnknownFeed { feed: FeedId },
    UnknownStop { stop: StopId },
    UnknownTrip { feed: FeedId, trip_id: String },
    ServiceMissing { feed: FeedId, service_id: String },
    InconsistentStopTimes { feed: FeedId, trip_id: String },
}

impl std::error::Error for ScheduleError {}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::UnknownFeed { feed } => {
                write!(f, "The feed `{}` is not part of the schedule.", feed)
            }
            ScheduleError::UnknownStop { stop } => {
                write!(f, "The stop `{}` is not part of its feed.", stop)
            }
            ScheduleError::UnknownTrip { feed, trip_id } => {
                write!(f, "The trip `{}` is unknown in feed `{}`.", trip_id, feed)
            }
            ScheduleError::ServiceMissing { feed, service_id } => write!(
                f,
                "The service `{}` is missing from feed `{}`.",
                service_id, feed
            ),
            ScheduleError::InconsistentStopTimes { feed, trip_id } => write!(
                f,
                "The stop times of trip `{}` in feed `{}` are not monotonic.",
                trip_id, feed
            ),
        }
    }
}

impl From<ModelError> for ScheduleError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::UnknownFeed { feed } => ScheduleError::UnknownFeed { feed },
            ModelError::UnknownStop { stop } => ScheduleError::UnknownStop { stop },
            ModelError::UnknownTrip { feed, trip_id } => {
                ScheduleError::UnknownTrip { feed, trip_id }
            }
            ModelError::ServiceMissing { feed, service_id } => {
                ScheduleError::ServiceMissing { feed, service_id }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builder::{NetworkBuilder, DEFAULT_FEED_ID};
    use std::str::FromStr;

    fn feed_id() -> FeedId {
        FeedId::new(DEFAULT_FEED_ID)
    }

    #[test]
    fn boardings_are_sorted_by_departure() {
        let (network, _) = NetworkBuilder::default()
            .calendar("service1", &["2020-01-01"])
            .vj("late", |vj| {
                vj.calendar("service1")
                    .route("1")
                    .st("A", "10:00:00", "10:00:00")
                    .st("B", "10:10:00", "10:10:00");
            })
            .vj("early", |vj| {
                vj.calendar("service1")
                    .route("1")
                    .st("A", "09:00:00", "09:00:00")
                    .st("B", "09:10:00", "09:10:00");
            })
            .build();
        let index = ScheduleIndex::build(network).unwrap();

        let boardings = index.boardings_by_pattern(&StopId::new(feed_id(), "A"));
        assert_eq!(boardings.len(), 1);
        let list = boardings.values().next().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].event.trip.trip_id, "early");
        assert_eq!(list[1].event.trip.trip_id, "late");
        assert!(list[0].departure < list[1].departure);

        // B is the last stop of the pattern : no boardings there
        let at_terminus = index.boardings_by_pattern(&StopId::new(feed_id(), "B"));
        assert!(at_terminus.is_empty());
    }

    #[test]
    fn frequency_trips_are_expanded() {
        let (network, _) = NetworkBuilder::default()
            .calendar("service1", &["2020-01-01"])
            .vj("shuttle", |vj| {
                vj.calendar("service1")
                    .route("1")
                    .st("A", "08:00:00", "08:00:00")
                    .st("B", "08:07:00", "08:07:00")
                    .frequency("08:00:00", "08:30:00", 600);
            })
            .build();
        let index = ScheduleIndex::build(network).unwrap();

        let boardings = index.boardings_by_pattern(&StopId::new(feed_id(), "A"));
        let list = boardings.values().next().unwrap();
        // departures at 08:00, 08:10, 08:20 ; 08:30 is excluded
        assert_eq!(list.len(), 3);
        let departures: Vec<i32> = list
            .iter()
            .map(|boarding| boarding.departure.total_seconds())
            .collect();
        assert_eq!(
            departures,
            vec![8 * 3600, 8 * 3600 + 600, 8 * 3600 + 1200]
        );
        // each run carries shifted times downstream
        let second = &list[1].event;
        let stop_times = index.stop_times(&feed_id(), &second.trip).unwrap();
        assert_eq!(
            stop_times[1].arrival,
            SecondsSinceServiceDayStart::from_str("08:17:00").unwrap()
        );
    }

    #[test]
    fn non_monotonic_stop_times_are_rejected() {
        let (network, _) = NetworkBuilder::default()
            .calendar("service1", &["2020-01-01"])
            .vj("broken", |vj| {
                vj.calendar("service1")
                    .route("1")
                    .st("A", "10:00:00", "10:00:00")
                    .st("B", "09:00:00", "09:00:00");
            })
            .build();
        match ScheduleIndex::build(network) {
            Err(ScheduleError::InconsistentStopTimes { trip_id, .. }) => {
                assert_eq!(trip_id, "broken");
            }
            other => panic!("expected InconsistentStopTimes, got {:?}", other.err()),
        }
    }

    #[test]
    fn missing_service_is_fatal() {
        let (network, _) = NetworkBuilder::default()
            .vj("toto", |vj| {
                vj.route("1")
                    .st("A", "10:00:00", "10:00:00")
                    .st("B", "10:10:00", "10:10:00");
            })
            .build();
        assert!(matches!(
            ScheduleIndex::build(network),
            Err(ScheduleError::ServiceMissing { .. })
        ));
    }
}
