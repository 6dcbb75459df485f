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

//! Schedule objects handed over by a gtfs parser.
//!
//! This module owns nothing clever : it is the vocabulary shared by the
//! schedule index, the transfer precomputation and the router. A feed is
//! accepted here as-is and validated when the index is built.

pub mod builder;

use crate::time::SecondsSinceServiceDayStart;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque identifier of a gtfs feed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeedId {
    id: String,
}

impl FeedId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A stop, identified by its feed and its feed-local code.
/// Two stops are equal iff both components match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StopId {
    pub feed: FeedId,
    pub code: String,
}

impl StopId {
    pub fn new(feed: FeedId, code: impl Into<String>) -> Self {
        Self {
            feed,
            code: code.into(),
        }
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.feed, self.code)
    }
}

/// Identifies one run of a vehicle. Frequency-based trips are expanded
/// at index build time, so each (trip_id, start_time) pair is a
/// distinct descriptor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TripDescriptor {
    pub trip_id: String,
    /// Seconds-of-day of the first departure, set only on
    /// frequency-expanded runs.
    pub start_time: Option<SecondsSinceServiceDayStart>,
    pub route_id: String,
}

impl fmt::Display for TripDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.start_time {
            Some(start_time) => write!(f, "{}@{}", self.trip_id, start_time),
            None => write!(f, "{}", self.trip_id),
        }
    }
}

/// One visit of a trip at a stop.
/// `stop_sequence` is a trip-local index starting at 0 and strictly
/// increasing along the trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTime {
    pub stop_sequence: u32,
    pub stop_code: String,
    pub arrival: SecondsSinceServiceDayStart,
    pub departure: SecondsSinceServiceDayStart,
    pub pickup_type: u8,
    pub dropoff_type: u8,
}

/// gtfs frequencies.txt entry : the trip runs every `headway_secs`
/// in [start_time, end_time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frequency {
    pub start_time: SecondsSinceServiceDayStart,
    pub end_time: SecondsSinceServiceDayStart,
    pub headway_secs: u32,
}

/// The set of days a service operates, already resolved from
/// calendar.txt and calendar_dates.txt by the parser.
#[derive(Debug, Clone, Default)]
pub struct ServiceCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl ServiceCalendar {
    pub fn new(dates: BTreeSet<NaiveDate>) -> Self {
        Self { dates }
    }

    pub fn active_on(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// Static description of a trip, carried for filtering and for
/// through-run detection at journey reconstruction.
#[derive(Debug, Clone)]
pub struct Trip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
    pub route_type: u16,
    pub agency_id: Option<String>,
    pub block_id: Option<String>,
}

/// transfers.txt entry. `to_route_id` scopes the minimum transfer
/// time to boardings of that route only; absent, it applies to every
/// boarding at `to_stop_code`.
#[derive(Debug, Clone)]
pub struct ExplicitTransfer {
    pub from_stop_code: String,
    pub to_stop_code: String,
    pub to_route_id: Option<String>,
    pub min_transfer_time: Option<u32>,
}

/// A precomputed short walk between two stops, possibly across feeds.
#[derive(Debug, Clone)]
pub struct InterpolatedTransfer {
    pub to_stop: StopId,
    pub street_time_seconds: u32,
}

#[derive(Debug, Clone)]
pub struct Stop {
    pub code: String,
    pub name: String,
}

/// One gtfs feed, as handed over by the parser.
#[derive(Debug, Clone)]
pub struct Feed {
    pub id: FeedId,
    pub timezone: Tz,
    pub stops: BTreeMap<String, Stop>,
    pub trips: BTreeMap<String, Trip>,
    /// Ordered stop times of each trip, keyed by trip_id.
    pub stop_times: BTreeMap<String, Vec<StopTime>>,
    pub services: BTreeMap<String, ServiceCalendar>,
    pub frequencies: BTreeMap<String, Vec<Frequency>>,
    pub transfers: Vec<ExplicitTransfer>,
}

impl Feed {
    pub fn new(id: FeedId, timezone: Tz) -> Self {
        Self {
            id,
            timezone,
            stops: BTreeMap::new(),
            trips: BTreeMap::new(),
            stop_times: BTreeMap::new(),
            services: BTreeMap::new(),
            frequencies: BTreeMap::new(),
            transfers: Vec::new(),
        }
    }
}

/// All feeds known to the planner.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub feeds: BTreeMap<FeedId, Feed>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_feed(&mut self, feed: Feed) {
        self.feeds.insert(feed.id.clone(), feed);
    }

    pub fn feed(&self, feed_id: &FeedId) -> Result<&Feed, ModelError> {
        self.feeds
            .get(feed_id)
            .ok_or_else(|| ModelError::UnknownFeed {
                feed: feed_id.clone(),
            })
    }

    pub fn nb_of_feeds(&self) -> usize {
        self.feeds.len()
    }
}

/// "Trip T visits its stop-sequence s" : the atom of the trip-based
/// search. Equality is componentwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoppingEvent {
    pub feed: FeedId,
    pub trip: TripDescriptor,
    pub stop_sequence: u32,
}

impl fmt::Display for StoppingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.feed, self.trip, self.stop_sequence)
    }
}

#[derive(Debug)]
pub enum ModelError {
    UnknownFeed { feed: FeedId },
    UnknownStop { stop: StopId },
    UnknownTrip { feed: FeedId, trip_id: String },
    ServiceMissing { feed: FeedId, service_id: String },
}

impl std::error::Error for ModelError {}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownFeed { feed } => {
                write!(f, "The feed `{}` is not part of the network.", feed)
            }
            ModelError::UnknownStop { stop } => {
                write!(f, "The stop `{}` is not part of its feed.", stop)
            }
            ModelError::UnknownTrip { feed, trip_id } => {
                write!(f, "The trip `{}` is unknown in feed `{}`.", trip_id, feed)
            }
            ModelError::ServiceMissing { feed, service_id } => write!(
                f,
                "The service `{}` is missing from feed `{}`.",
                service_id, feed
            ),
        }
    }
}
