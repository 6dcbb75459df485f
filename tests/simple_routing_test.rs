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
use stopover::EgressStop;
use utils::{build_and_solve, datetime, init_test_logger, request, stop};

fn direct_network() -> NetworkBuilder {
    NetworkBuilder::default()
        .calendar("service1", &["2020-01-01"])
        .vj("toto", |vj| {
            vj.calendar("service1")
                .route("1")
                .st("A", "08:05:00", "08:05:00")
                .st("B", "08:15:00", "08:15:00")
                .st("C", "08:30:00", "08:30:00");
        })
}

#[test]
fn direct_trip() -> Result<(), Error> {
    let _guard = init_test_logger();

    let (network, walks) = direct_network().build();
    let request = request("A", "C", "20200101T080000");
    let journeys = build_and_solve(network, &walks, "2020-01-01", &request)?;

    assert_eq!(journeys.len(), 1);
    let journey = &journeys[0];
    assert_eq!(journey.nb_of_legs(), 1);
    assert_eq!(journey.nb_of_transfers(), 0);
    assert_eq!(journey.departure_datetime, datetime("20200101T080500"));
    assert_eq!(journey.arrival_datetime, datetime("20200101T083000"));
    assert_eq!(journey.legs[0].trip_id, "toto");
    assert_eq!(journey.legs[0].board_stop, stop("A"));
    assert_eq!(journey.legs[0].alight_stop, stop("C"));
    Ok(())
}

#[test]
fn egress_walk_is_added_to_arrival() -> Result<(), Error> {
    let _guard = init_test_logger();

    let (network, walks) = direct_network().build();
    let mut request = request("A", "C", "20200101T080000");
    request.egress = vec![EgressStop::new(stop("C"), 120_000)];
    let journeys = build_and_solve(network, &walks, "2020-01-01", &request)?;

    assert_eq!(journeys.len(), 1);
    assert_eq!(journeys[0].arrival_datetime, datetime("20200101T083200"));
    Ok(())
}

#[test]
fn no_access_stops_yields_no_journey() -> Result<(), Error> {
    let _guard = init_test_logger();

    let (network, walks) = direct_network().build();
    let mut request = request("A", "C", "20200101T080000");
    request.access.clear();
    let journeys = build_and_solve(network, &walks, "2020-01-01", &request)?;

    assert!(journeys.is_empty());
    Ok(())
}

#[test]
fn unknown_egress_stop_is_ignored() -> Result<(), Error> {
    let _guard = init_test_logger();

    let (network, walks) = direct_network().build();
    let mut request = request("A", "C", "20200101T080000");
    request
        .egress
        .push(EgressStop::new(stop("nowhere"), 0));
    let journeys = build_and_solve(network, &walks, "2020-01-01", &request)?;

    assert_eq!(journeys.len(), 1);
    assert_eq!(journeys[0].egress_stop, stop("C"));
    Ok(())
}

#[test]
fn departure_after_the_last_trip_yields_no_journey() -> Result<(), Error> {
    let _guard = init_test_logger();

    let (network, walks) = direct_network().build();
    let request = request("A", "C", "20200101T090000");
    let journeys = build_and_solve(network, &walks, "2020-01-01", &request)?;

    assert!(journeys.is_empty());
    Ok(())
}

#[test]
fn routing_twice_gives_the_same_journeys() -> Result<(), Error> {
    let _guard = init_test_logger();

    let (network, walks) = direct_network().build();
    let request = request("A", "C", "20200101T080000");

    let index = stopover::ScheduleIndex::build(network)?;
    let builder = stopover::TransferBuilder::new(
        &index,
        &walks,
        stopover::TransferBuilderConfig::default(),
    );
    let transfers = builder.build_day(utils::day("2020-01-01"))?;

    let first = utils::solve(&index, &transfers, &request)?;
    let second = utils::solve(&index, &transfers, &request)?;

    assert_eq!(first.len(), second.len());
    for (lhs, rhs) in first.iter().zip(second.iter()) {
        assert_eq!(lhs.departure_datetime, rhs.departure_datetime);
        assert_eq!(lhs.arrival_datetime, rhs.arrival_datetime);
        assert_eq!(lhs.nb_of_transfers(), rhs.nb_of_transfers());
    }
    Ok(())
}
