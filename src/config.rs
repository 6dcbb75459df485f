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

use crate::time::PositiveDuration;
use serde::Deserialize;

pub const DEFAULT_MAX_ROUNDS: &str = "3";
pub const DEFAULT_MAX_TRANSFER_DURATION: &str = "00:15:00";

#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Maximum number of scan rounds for one query. Round k produces
    /// journeys with k transfers.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u8,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
        }
    }
}

pub fn default_max_rounds() -> u8 {
    use std::str::FromStr;
    u8::from_str(DEFAULT_MAX_ROUNDS).unwrap()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferBuilderConfig {
    /// A pattern whose first reachable boarding departs later than this
    /// after alighting is skipped entirely during precomputation.
    #[serde(default = "default_max_transfer_duration")]
    pub max_transfer_duration: PositiveDuration,

    /// Worker threads of the offline build. Zero means one per
    /// available core.
    #[serde(default)]
    pub nb_of_threads: usize,
}

impl Default for TransferBuilderConfig {
    fn default() -> Self {
        Self {
            max_transfer_duration: default_max_transfer_duration(),
            nb_of_threads: 0,
        }
    }
}

pub fn default_max_transfer_duration() -> PositiveDuration {
    use std::str::FromStr;
    PositiveDuration::from_str(DEFAULT_MAX_TRANSFER_DURATION).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_on_empty_config() {
        let config: RouterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_rounds, 3);

        let config: TransferBuilderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_transfer_duration.total_seconds(), 900);
        assert_eq!(config.nb_of_threads, 0);
    }

    #[test]
    fn durations_parse_from_strings() {
        let config: TransferBuilderConfig =
            serde_json::from_str(r#"{"max_transfer_duration": "00:05:00"}"#).unwrap();
        assert_eq!(config.max_transfer_duration.total_seconds(), 300);
    }
}
