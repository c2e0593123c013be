//! CSV message reader.
//!
//! Line format: `ts_ns,MsgType,Side,OrderId,Price,Qty`. Lines starting with
//! `#` and blank lines are skipped, an optional header line is recognized,
//! and fields are trimmed. Malformed lines are skipped with a warning;
//! unknown `MsgType`/`Side` values count as malformed rather than being
//! coerced to a default.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;
use tracing::warn;

use crate::message::{Msg, MsgType, Side};

/// Why one input line could not become a [`Msg`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected 6 fields, got {0}")]
    FieldCount(usize),
    #[error("field {field} is not an integer: {value:?}")]
    BadInt { field: &'static str, value: String },
    #[error("unknown message type {0:?}")]
    UnknownMsgType(String),
    #[error("unknown side {0:?}")]
    UnknownSide(String),
}

fn parse_msg_type(s: &str) -> Result<MsgType, ParseError> {
    match s {
        "NewLimit" => Ok(MsgType::NewLimit),
        "NewMarket" => Ok(MsgType::NewMarket),
        "Cancel" => Ok(MsgType::Cancel),
        other => Err(ParseError::UnknownMsgType(other.to_owned())),
    }
}

fn parse_side(s: &str) -> Result<Side, ParseError> {
    match s {
        "Buy" => Ok(Side::Buy),
        "Sell" => Ok(Side::Sell),
        other => Err(ParseError::UnknownSide(other.to_owned())),
    }
}

fn parse_int<T: std::str::FromStr>(field: &'static str, s: &str) -> Result<T, ParseError> {
    s.parse().map_err(|_| ParseError::BadInt { field, value: s.to_owned() })
}

/// Convert one trimmed record into a message.
pub fn parse_record(record: &StringRecord) -> Result<Msg, ParseError> {
    if record.len() < 6 {
        return Err(ParseError::FieldCount(record.len()));
    }
    Ok(Msg {
        ts: parse_int("ts_ns", &record[0])?,
        msg_type: parse_msg_type(&record[1])?,
        side: parse_side(&record[2])?,
        id: parse_int("OrderId", &record[3])?,
        price: parse_int("Price", &record[4])?,
        qty: parse_int("Qty", &record[5])?,
    })
}

/// A record that is just the column header repeated in the data section.
fn is_header(record: &StringRecord) -> bool {
    record.get(0) == Some("ts_ns") || record.get(1) == Some("MsgType")
}

/// Load every well-formed message from a CSV file, in file order.
///
/// Only failure to open the file is an error; bad lines are logged and
/// skipped so one corrupt row cannot sink a multi-gigabyte load.
pub fn read_messages<P: AsRef<Path>>(path: P) -> io::Result<Vec<Msg>> {
    let file = File::open(path.as_ref())?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(file);

    let mut messages = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let line = index + 1;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!(line, %err, "skipping unreadable line");
                continue;
            }
        };
        if is_header(&record) {
            continue;
        }
        match parse_record(&record) {
            Ok(msg) => messages.push(msg),
            Err(err) => warn!(line, %err, "skipping malformed line"),
        }
    }
    Ok(messages)
}
