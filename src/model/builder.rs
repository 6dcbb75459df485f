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

//! Programmatic construction of a small [`Network`], used by the test
//! suites and by tooling that needs a schedule without going through a
//! gtfs parser.
//!
//! ```
//! # use stopover::model::builder::NetworkBuilder;
//! let (network, _walks) = NetworkBuilder::default()
//!     .calendar("service1", &["2020-01-01"])
//!     .vj("toto", |vj| {
//!         vj.calendar("service1")
//!             .route("1")
//!             .st("A", "10:00:00", "10:00:01")
//!             .st("B", "10:05:00", "10:05:01");
//!     })
//!     .build();
//! ```

use super::{
    ExplicitTransfer, Feed, FeedId, Frequency, Network, ServiceCalendar, Stop, StopId, StopTime,
    Trip,
};
use crate::time::SecondsSinceServiceDayStart;
use crate::transfers::InterpolatedTransfers;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::collections::BTreeSet;
use std::str::FromStr;

pub const DEFAULT_FEED_ID: &str = "gtfs";

pub struct NetworkBuilder {
    network: Network,
    current_feed: FeedId,
    walks: Vec<(StopId, StopId, u32)>,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_ID, chrono_tz::UTC)
    }
}

impl NetworkBuilder {
    pub fn new(feed_id: &str, timezone: Tz) -> Self {
        let feed_id = FeedId::new(feed_id);
        let mut network = Network::new();
        network.add_feed(Feed::new(feed_id.clone(), timezone));
        Self {
            network,
            current_feed: feed_id,
            walks: Vec::new(),
        }
    }

    /// Switches subsequent calls to another feed, creating it if needed.
    pub fn feed(mut self, feed_id: &str, timezone: Tz) -> Self {
        let feed_id = FeedId::new(feed_id);
        self.network
            .feeds
            .entry(feed_id.clone())
            .or_insert_with(|| Feed::new(feed_id.clone(), timezone));
        self.current_feed = feed_id;
        self
    }

    pub fn calendar(mut self, service_id: &str, dates: &[&str]) -> Self {
        let dates: BTreeSet<NaiveDate> = dates
            .iter()
            .map(|date| {
                NaiveDate::from_str(date)
                    .unwrap_or_else(|_| panic!("invalid calendar date `{}`", date))
            })
            .collect();
        self.current_feed_mut()
            .services
            .insert(service_id.to_string(), ServiceCalendar::new(dates));
        self
    }

    /// Adds a vehicle journey. The closure configures the journey and
    /// its stop times.
    pub fn vj<F>(mut self, trip_id: &str, config: F) -> Self
    where
        F: FnOnce(&mut VehicleJourneyBuilder),
    {
        let mut vj_builder = VehicleJourneyBuilder {
            trip: Trip {
                trip_id: trip_id.to_string(),
                route_id: "default_route".to_string(),
                service_id: "default_service".to_string(),
                route_type: 3,
                agency_id: None,
                block_id: None,
            },
            stop_times: Vec::new(),
            frequencies: Vec::new(),
        };
        config(&mut vj_builder);

        let feed = self.current_feed_mut();
        for stop_time in &vj_builder.stop_times {
            feed.stops
                .entry(stop_time.stop_code.clone())
                .or_insert_with(|| Stop {
                    code: stop_time.stop_code.clone(),
                    name: stop_time.stop_code.clone(),
                });
        }
        feed.stop_times
            .insert(trip_id.to_string(), vj_builder.stop_times);
        if !vj_builder.frequencies.is_empty() {
            feed.frequencies
                .insert(trip_id.to_string(), vj_builder.frequencies);
        }
        feed.trips.insert(trip_id.to_string(), vj_builder.trip);
        self
    }

    pub fn transfer(self, from_stop: &str, to_stop: &str, min_transfer_time: u32) -> Self {
        self.transfer_impl(from_stop, to_stop, None, Some(min_transfer_time))
    }

    /// Explicit transfer whose minimum duration only binds boardings of
    /// `to_route_id`.
    pub fn transfer_to_route(
        self,
        from_stop: &str,
        to_stop: &str,
        to_route_id: &str,
        min_transfer_time: u32,
    ) -> Self {
        self.transfer_impl(
            from_stop,
            to_stop,
            Some(to_route_id.to_string()),
            Some(min_transfer_time),
        )
    }

    fn transfer_impl(
        mut self,
        from_stop: &str,
        to_stop: &str,
        to_route_id: Option<String>,
        min_transfer_time: Option<u32>,
    ) -> Self {
        self.current_feed_mut().transfers.push(ExplicitTransfer {
            from_stop_code: from_stop.to_string(),
            to_stop_code: to_stop.to_string(),
            to_route_id,
            min_transfer_time,
        });
        self
    }

    /// Interpolated street transfer between two stops of the current
    /// feed.
    pub fn walk(mut self, from_stop: &str, to_stop: &str, street_time_seconds: u32) -> Self {
        let feed = self.current_feed.clone();
        self.walks.push((
            StopId::new(feed.clone(), from_stop),
            StopId::new(feed, to_stop),
            street_time_seconds,
        ));
        self
    }

    /// Interpolated street transfer across feeds.
    pub fn walk_between(
        mut self,
        from: (&str, &str),
        to: (&str, &str),
        street_time_seconds: u32,
    ) -> Self {
        self.walks.push((
            StopId::new(FeedId::new(from.0), from.1),
            StopId::new(FeedId::new(to.0), to.1),
            street_time_seconds,
        ));
        self
    }

    pub fn build(self) -> (Network, InterpolatedTransfers) {
        let mut walks = InterpolatedTransfers::new();
        for (from, to, street_time_seconds) in self.walks {
            walks.add(from, to, street_time_seconds);
        }
        (self.network, walks)
    }

    fn current_feed_mut(&mut self) -> &mut Feed {
        let feed_id = self.current_feed.clone();
        self.network
            .feeds
            .get_mut(&feed_id)
            .expect("the current feed always exists")
    }
}

pub struct VehicleJourneyBuilder {
    trip: Trip,
    stop_times: Vec<StopTime>,
    frequencies: Vec<Frequency>,
}

impl VehicleJourneyBuilder {
    pub fn calendar(&mut self, service_id: &str) -> &mut Self {
        self.trip.service_id = service_id.to_string();
        self
    }

    pub fn route(&mut self, route_id: &str) -> &mut Self {
        self.trip.route_id = route_id.to_string();
        self
    }

    pub fn route_type(&mut self, route_type: u16) -> &mut Self {
        self.trip.route_type = route_type;
        self
    }

    pub fn agency(&mut self, agency_id: &str) -> &mut Self {
        self.trip.agency_id = Some(agency_id.to_string());
        self
    }

    pub fn block(&mut self, block_id: &str) -> &mut Self {
        self.trip.block_id = Some(block_id.to_string());
        self
    }

    pub fn st(&mut self, stop_code: &str, arrival: &str, departure: &str) -> &mut Self {
        self.st_flags(stop_code, arrival, departure, 0, 0)
    }

    pub fn st_flags(
        &mut self,
        stop_code: &str,
        arrival: &str,
        departure: &str,
        pickup_type: u8,
        dropoff_type: u8,
    ) -> &mut Self {
        let stop_sequence = self.stop_times.len() as u32;
        self.stop_times.push(StopTime {
            stop_sequence,
            stop_code: stop_code.to_string(),
            arrival: parse_time(arrival),
            departure: parse_time(departure),
            pickup_type,
            dropoff_type,
        });
        self
    }

    pub fn frequency(&mut self, start_time: &str, end_time: &str, headway_secs: u32) -> &mut Self {
        self.frequencies.push(Frequency {
            start_time: parse_time(start_time),
            end_time: parse_time(end_time),
            headway_secs,
        });
        self
    }
}

fn parse_time(time: &str) -> SecondsSinceServiceDayStart {
    SecondsSinceServiceDayStart::from_str(time)
        .unwrap_or_else(|_| panic!("invalid stop time `{}`", time))
}
