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
use stopover::{InMemoryTransferStore, ScheduleIndex, TransferStore};
use utils::{day, init_test_logger, request, solve};

// a day whose transfer map was never prepared is served with same-trip
// rides only

#[test]
fn direct_rides_survive_an_unprepared_day() -> Result<(), Error> {
    let _guard = init_test_logger();

    let (network, _walks) = NetworkBuilder::default()
        .calendar("service1", &["2020-01-01"])
        .vj("toto", |vj| {
            vj.calendar("service1")
                .route("1")
                .st("A", "08:05:00", "08:05:00")
                .st("B", "08:15:00", "08:15:00");
        })
        .vj("tata", |vj| {
            vj.calendar("service1")
                .route("2")
                .st("B", "08:20:00", "08:20:00")
                .st("C", "08:40:00", "08:40:00");
        })
        .build();
    let index = ScheduleIndex::build(network)?;
    let store = InMemoryTransferStore::new();
    let unprepared = store.get(day("2020-01-01"));
    assert!(unprepared.is_empty());

    // the connection at B cannot be expanded without a transfer map
    let with_transfer = solve(&index, &unprepared, &request("A", "C", "20200101T080000"))?;
    assert!(with_transfer.is_empty());

    // a single-vehicle ride does not need the transfer map at all
    let direct = solve(&index, &unprepared, &request("A", "B", "20200101T080000"))?;
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].nb_of_transfers(), 0);
    Ok(())
}
