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

//! Byte encoding of stopping events, used by file-backed transfer
//! stores. The layout is a length-prefixed utf8 feed id, a
//! length-prefixed binary trip descriptor, then the stop sequence as a
//! big-endian 32-bit integer.

use crate::model::{FeedId, StoppingEvent, TripDescriptor};
use std::fmt;
use std::io::{Read, Write};

pub fn write_stopping_event<W: Write>(
    writer: &mut W,
    event: &StoppingEvent,
) -> Result<(), CodecError> {
    let feed = event.feed.as_str().as_bytes();
    let feed_len = u16::try_from(feed.len()).map_err(|_| CodecError::FeedIdTooLong {
        feed: event.feed.clone(),
    })?;
    writer.write_all(&feed_len.to_be_bytes())?;
    writer.write_all(feed)?;

    let descriptor = bincode::serialize(&event.trip)?;
    let descriptor_len =
        i32::try_from(descriptor.len()).map_err(|_| CodecError::DescriptorTooLong)?;
    writer.write_all(&descriptor_len.to_be_bytes())?;
    writer.write_all(&descriptor)?;

    let stop_sequence =
        i32::try_from(event.stop_sequence).map_err(|_| CodecError::DescriptorTooLong)?;
    writer.write_all(&stop_sequence.to_be_bytes())?;
    Ok(())
}

pub fn read_stopping_event<R: Read>(reader: &mut R) -> Result<StoppingEvent, CodecError> {
    let mut feed_len = [0u8; 2];
    reader.read_exact(&mut feed_len)?;
    let mut feed = vec![0u8; u16::from_be_bytes(feed_len) as usize];
    reader.read_exact(&mut feed)?;
    let feed = String::from_utf8(feed).map_err(|_| CodecError::BadFeedId)?;

    let mut descriptor_len = [0u8; 4];
    reader.read_exact(&mut descriptor_len)?;
    let descriptor_len =
        usize::try_from(i32::from_be_bytes(descriptor_len)).map_err(|_| CodecError::BadFrame)?;
    let mut descriptor = vec![0u8; descriptor_len];
    reader.read_exact(&mut descriptor)?;
    let trip: TripDescriptor = bincode::deserialize(&descriptor)?;

    let mut stop_sequence = [0u8; 4];
    reader.read_exact(&mut stop_sequence)?;
    let stop_sequence =
        u32::try_from(i32::from_be_bytes(stop_sequence)).map_err(|_| CodecError::BadFrame)?;

    Ok(StoppingEvent {
        feed: FeedId::new(feed),
        trip,
        stop_sequence,
    })
}

#[derive(Debug)]
pub enum CodecError {
    Io(std::io::Error),
    Descriptor(bincode::Error),
    FeedIdTooLong { feed: FeedId },
    DescriptorTooLong,
    BadFeedId,
    BadFrame,
}

impl std::error::Error for CodecError {}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Io(error) => write!(f, "{}", error),
            CodecError::Descriptor(error) => {
                write!(f, "Unable to encode the trip descriptor : {}", error)
            }
            CodecError::FeedIdTooLong { feed } => {
                write!(f, "The feed id `{}` does not fit the length prefix.", feed)
            }
            CodecError::DescriptorTooLong => {
                write!(f, "The trip descriptor does not fit the length prefix.")
            }
            CodecError::BadFeedId => write!(f, "The stored feed id is not valid utf8."),
            CodecError::BadFrame => write!(f, "The stored stopping event frame is malformed."),
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(error: std::io::Error) -> Self {
        CodecError::Io(error)
    }
}

impl From<bincode::Error> for CodecError {
    fn from(error: bincode::Error) -> Self {
        CodecError::Descriptor(error)
    }
}
