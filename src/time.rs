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

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const SECONDS_PER_DAY: i32 = 24 * 60 * 60;

/// Duration since "noon minus 12 hours" on a service day, in the
/// feed's timezone.
/// This corresponds to the "Time" notion found in gtfs stop_times.txt.
/// Values greater than 24h are allowed (trips crossing midnight),
/// within [-48:00:00, 48:00:00].
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SecondsSinceServiceDayStart {
    seconds: i32,
}

const MAX_SECONDS_SINCE_SERVICE_DAY_START: i32 = 48 * 60 * 60; // 48h

#[derive(Debug, Eq, PartialEq, Clone, Copy, Ord, PartialOrd)]
pub struct PositiveDuration {
    pub(crate) seconds: u32,
}

impl PositiveDuration {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> PositiveDuration {
        let total_seconds = seconds + 60 * minutes + 60 * 60 * hours;
        PositiveDuration {
            seconds: total_seconds,
        }
    }

    pub const fn from_seconds(seconds: u32) -> PositiveDuration {
        PositiveDuration { seconds }
    }

    pub fn total_seconds(&self) -> u64 {
        self.seconds as u64
    }
}

impl Display for PositiveDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hours = self.seconds / (60 * 60);
        let minutes_in_secs = self.seconds % (60 * 60);
        let minutes = minutes_in_secs / 60;
        let seconds = minutes_in_secs % 60;
        if hours != 0 {
            write!(f, "{}h{:02}m{:02}s", hours, minutes, seconds)
        } else if minutes != 0 {
            write!(f, "{}m{:02}s", minutes, seconds)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}

#[derive(Debug)]
pub struct DurationParseError {
    input: String,
}

impl Display for DurationParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unable to parse `{}` as a duration. Expected format is HH:MM:SS.",
            self.input
        )
    }
}

impl std::error::Error for DurationParseError {}

impl std::str::FromStr for PositiveDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seconds = parse_hms(s).ok_or_else(|| DurationParseError {
            input: s.to_string(),
        })?;
        Ok(PositiveDuration { seconds })
    }
}

impl<'de> serde::Deserialize<'de> for PositiveDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

fn parse_hms(s: &str) -> Option<u32> {
    let mut parts = s.split(':');
    let hours: u32 = parts.next()?.parse().ok()?;
    let minutes: u32 = parts.next()?.parse().ok()?;
    let seconds: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some(hours * 60 * 60 + minutes * 60 + seconds)
}

impl SecondsSinceServiceDayStart {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub fn max() -> Self {
        Self {
            seconds: MAX_SECONDS_SINCE_SERVICE_DAY_START,
        }
    }

    pub fn from_seconds(seconds: i32) -> Option<Self> {
        if seconds > MAX_SECONDS_SINCE_SERVICE_DAY_START
            || seconds < -MAX_SECONDS_SINCE_SERVICE_DAY_START
        {
            None
        } else {
            Some(Self { seconds })
        }
    }

    pub fn total_seconds(&self) -> i32 {
        self.seconds
    }

    pub fn checked_add_seconds(&self, seconds: i64) -> Option<Self> {
        let result = i64::from(self.seconds) + seconds;
        i32::try_from(result).ok().and_then(Self::from_seconds)
    }

    /// Anchor this time-of-day on a service day and obtain a calendar
    /// datetime. Times beyond 24h land on the following days.
    pub fn to_datetime(&self, service_day: NaiveDate) -> NaiveDateTime {
        let midnight = service_day
            .and_hms_opt(0, 0, 0)
            .expect("midnight exists on every calendar day");
        midnight + chrono::Duration::seconds(i64::from(self.seconds))
    }
}

impl std::str::FromStr for SecondsSinceServiceDayStart {
    type Err = DurationParseError;

    /// Parses a gtfs time string "HH:MM:SS", where HH may exceed 24
    /// for trips running past midnight.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hms(s)
            .and_then(|seconds| i32::try_from(seconds).ok())
            .and_then(Self::from_seconds)
            .ok_or_else(|| DurationParseError {
                input: s.to_string(),
            })
    }
}

impl std::fmt::Display for SecondsSinceServiceDayStart {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.seconds / 60 / 60,
            self.seconds / 60 % 60,
            self.seconds % 60
        )
    }
}

impl std::ops::Add for PositiveDuration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            seconds: self.seconds + rhs.seconds,
        }
    }
}

impl std::ops::Mul<u32> for PositiveDuration {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        PositiveDuration {
            seconds: self.seconds * rhs,
        }
    }
}

/// Projects an UTC instant into `zone` and splits it into the local
/// service day and the seconds elapsed since that day started.
pub fn service_day_and_time(
    instant_utc: NaiveDateTime,
    zone: Tz,
) -> (NaiveDate, SecondsSinceServiceDayStart) {
    use chrono::TimeZone;
    let local = zone.from_utc_datetime(&instant_utc);
    let service_day = local.date_naive();
    let seconds = local.time().num_seconds_from_midnight();
    let time_in_day = SecondsSinceServiceDayStart {
        seconds: seconds as i32,
    };
    (service_day, time_in_day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parse_time_of_day() {
        let time = SecondsSinceServiceDayStart::from_str("08:05:00").unwrap();
        assert_eq!(time.total_seconds(), 8 * 3600 + 5 * 60);
        // times past midnight are valid stop times
        let overnight = SecondsSinceServiceDayStart::from_str("24:10:00").unwrap();
        assert_eq!(overnight.total_seconds(), 87_000);
        assert!(SecondsSinceServiceDayStart::from_str("49:00:00").is_err());
        assert!(SecondsSinceServiceDayStart::from_str("10:61:00").is_err());
    }

    #[test]
    fn overnight_time_lands_on_next_day() {
        let time = SecondsSinceServiceDayStart::from_str("24:10:00").unwrap();
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let datetime = time.to_datetime(day);
        assert_eq!(
            datetime,
            NaiveDate::from_ymd_opt(2020, 1, 2)
                .unwrap()
                .and_hms_opt(0, 10, 0)
                .unwrap()
        );
    }

    #[test]
    fn parse_duration() {
        let duration = PositiveDuration::from_str("00:15:00").unwrap();
        assert_eq!(duration.total_seconds(), 900);
        assert!(PositiveDuration::from_str("15 minutes").is_err());
    }

    #[test]
    fn service_day_follows_zone() {
        let instant = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        let (day_utc, _) = service_day_and_time(instant, chrono_tz::UTC);
        assert_eq!(day_utc, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        // half past midnight in Paris
        let (day_paris, time_paris) = service_day_and_time(instant, chrono_tz::Europe::Paris);
        assert_eq!(day_paris, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(time_paris.total_seconds(), 30 * 60);
    }
}
