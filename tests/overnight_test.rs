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

mod utils;

use anyhow::Error;
use stopover::model::builder::NetworkBuilder;
use utils::{build_and_solve, datetime, init_test_logger, request};

#[test]
fn a_trip_crossing_midnight_arrives_on_the_next_day() -> Result<(), Error> {
    let _guard = init_test_logger();

    let (network, walks) = NetworkBuilder::default()
        .calendar("service1", &["2020-01-01"])
        .vj("night_owl", |vj| {
            vj.calendar("service1")
                .route("1")
                .st("X", "23:50:00", "23:50:00")
                .st("Y", "24:10:00", "24:10:00");
        })
        .build();
    let request = request("X", "Y", "20200101T234500");
    let journeys = build_and_solve(network, &walks, "2020-01-01", &request)?;

    assert_eq!(journeys.len(), 1);
    let journey = &journeys[0];
    assert_eq!(journey.departure_datetime, datetime("20200101T235000"));
    // 24:10 on the service day is 00:10 the day after
    assert_eq!(journey.arrival_datetime, datetime("20200102T001000"));
    Ok(())
}

#[test]
fn the_night_trip_runs_on_its_service_day_only() -> Result<(), Error> {
    let _guard = init_test_logger();

    let (network, walks) = NetworkBuilder::default()
        .calendar("service1", &["2020-01-01"])
        .vj("night_owl", |vj| {
            vj.calendar("service1")
                .route("1")
                .st("X", "23:50:00", "23:50:00")
                .st("Y", "24:10:00", "24:10:00");
        })
        .build();
    // on January 2nd the service is not active anymore, even though the
    // vehicle was still rolling at 00:05 that morning
    let request = request("X", "Y", "20200102T234500");
    let journeys = build_and_solve(network, &walks, "2020-01-02", &request)?;

    assert!(journeys.is_empty());
    Ok(())
}
