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

use crate::filters::TripFilter;
use crate::model::StopId;
use crate::schedule::ScheduleError;
use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use std::fmt;

/// Where the traveller can enter the network, with the walking time
/// (signed milliseconds) needed to reach the stop from the true origin.
#[derive(Debug, Clone)]
pub struct AccessStop {
    pub stop: StopId,
    pub time_delta_ms: i64,
    /// Timezone used to resolve the service day at this stop. Absent,
    /// the timezone of the stop's feed applies.
    pub zone: Option<Tz>,
}

impl AccessStop {
    pub fn new(stop: StopId, time_delta_ms: i64) -> Self {
        Self {
            stop,
            time_delta_ms,
            zone: None,
        }
    }

    pub fn with_zone(stop: StopId, time_delta_ms: i64, zone: Tz) -> Self {
        Self {
            stop,
            time_delta_ms,
            zone: Some(zone),
        }
    }
}

/// Where the traveller leaves the network, with the walking time
/// (signed milliseconds) from the stop to the true destination.
#[derive(Debug, Clone)]
pub struct EgressStop {
    pub stop: StopId,
    pub time_delta_ms: i64,
}

impl EgressStop {
    pub fn new(stop: StopId, time_delta_ms: i64) -> Self {
        Self {
            stop,
            time_delta_ms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestInput {
    pub access: Vec<AccessStop>,
    pub egress: Vec<EgressStop>,
    /// UTC instant at which the traveller starts.
    pub initial_datetime: NaiveDateTime,
    pub trip_filter: TripFilter,
}

#[derive(Debug)]
pub enum RequestError {
    /// The access stops resolve the initial instant to different
    /// service days; such a query has no single well-defined schedule
    /// day and is rejected rather than silently guessed.
    IncompatibleServiceDays {
        first_stop: StopId,
        first_day: NaiveDate,
        second_stop: StopId,
        second_day: NaiveDate,
    },
    Schedule(ScheduleError),
}

impl std::error::Error for RequestError {}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::IncompatibleServiceDays {
                first_stop,
                first_day,
                second_stop,
                second_day,
            } => write!(
                f,
                "The access stops span incompatible service days : \
                 `{}` resolves to {} while `{}` resolves to {}.",
                first_stop, first_day, second_stop, second_day
            ),
            RequestError::Schedule(error) => write!(f, "{}", error),
        }
    }
}

impl From<ScheduleError> for RequestError {
    fn from(error: ScheduleError) -> Self {
        RequestError::Schedule(error)
    }
}
