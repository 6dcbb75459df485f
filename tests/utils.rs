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

#![allow(dead_code)]

use anyhow::Error;
use stopover::chrono::{NaiveDate, NaiveDateTime};
use stopover::model::builder::DEFAULT_FEED_ID;
use stopover::tracing::dispatcher::DefaultGuard;
use stopover::tracing::level_filters::LevelFilter;
use stopover::{
    AccessStop, EgressStop, FeedId, InterpolatedTransfers, Journey, Network, RequestInput,
    RouterConfig, ScheduleIndex, StopId, TransferBuilder, TransferBuilderConfig, TransferMap,
    TripBasedRouter, TripFilter,
};
use std::sync::atomic::AtomicBool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[must_use]
pub fn init_test_logger() -> DefaultGuard {
    let default_level = LevelFilter::DEBUG;
    let rust_log =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| default_level.to_string());
    let env_filter_subscriber = EnvFilter::try_new(rust_log).unwrap_or_else(|err| {
        eprintln!(
            "invalid {}, falling back to level '{}' - {}",
            EnvFilter::DEFAULT_ENV,
            default_level,
            err,
        );
        EnvFilter::new(default_level.to_string())
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(env_filter_subscriber)
        .set_default()
}

pub fn stop(code: &str) -> StopId {
    StopId::new(FeedId::new(DEFAULT_FEED_ID), code)
}

pub fn day(date: &str) -> NaiveDate {
    use std::str::FromStr;
    NaiveDate::from_str(date).expect("invalid test date")
}

/// Parses "20200101T080000".
pub fn datetime(datetime: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(datetime, "%Y%m%dT%H%M%S").expect("invalid test datetime")
}

pub fn request(from: &str, to: &str, departure: &str) -> RequestInput {
    RequestInput {
        access: vec![AccessStop::new(stop(from), 0)],
        egress: vec![EgressStop::new(stop(to), 0)],
        initial_datetime: datetime(departure),
        trip_filter: TripFilter::AcceptAll,
    }
}

/// Builds the index and the transfer map of `date`, then runs one
/// query.
pub fn build_and_solve(
    network: Network,
    walks: &InterpolatedTransfers,
    date: &str,
    request: &RequestInput,
) -> Result<Vec<Journey>, Error> {
    let index = ScheduleIndex::build(network)?;
    let builder = TransferBuilder::new(&index, walks, TransferBuilderConfig::default());
    let transfers = builder.build_day(day(date))?;
    solve(&index, &transfers, request)
}

pub fn solve(
    index: &ScheduleIndex,
    transfers: &TransferMap,
    request: &RequestInput,
) -> Result<Vec<Journey>, Error> {
    let mut router = TripBasedRouter::new(index, transfers, RouterConfig::default());
    let abort = AtomicBool::new(false);
    let journeys = router.route(request, &abort)?;
    Ok(journeys)
}
