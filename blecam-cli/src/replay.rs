//! Recorded notification logs.
//!
//! One record per line: `<millis> <kind> [payload]`, where kind is one of
//!
//! - `start` / `stop`: the consumer started or stopped a stream
//! - `info <hex>`: info characteristic notification
//! - `image <hex>`: image characteristic notification
//! - `error <image|info> <reason...>`: the transport reported a failure
//!
//! Blank lines and lines starting with `#` are skipped.

use anyhow::{Context, Result};
use blecam_lib::{Error, SubChannel};
use bytes::Bytes;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Start,
    Stop,
    Info(Bytes),
    Image(Bytes),
    Error { channel: SubChannel, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub at: Duration,
    pub record: Record,
}

pub fn parse_log(text: &str) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some(entry) = parse_line(line).with_context(|| format!("line {}: {:?}", idx + 1, line))? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

pub fn parse_line(line: &str) -> Result<Option<Entry>, Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut fields = line.splitn(3, char::is_whitespace);
    let millis = fields.next().unwrap_or_default();
    let kind = fields
        .next()
        .ok_or_else(|| Error::InvalidPacket("missing record kind".to_string()))?;
    let rest = fields.next().map(str::trim).unwrap_or_default();

    let millis: u64 = millis
        .parse()
        .map_err(|_| Error::InvalidPacket(format!("bad timestamp {:?}", millis)))?;

    let record = match kind {
        "start" => Record::Start,
        "stop" => Record::Stop,
        "info" => Record::Info(decode_hex(rest)?),
        "image" => Record::Image(decode_hex(rest)?),
        "error" => {
            let (channel, reason) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let channel = match channel {
                "image" => SubChannel::ImageNotify,
                "info" => SubChannel::InfoNotify,
                other => return Err(Error::InvalidPacket(format!("unknown channel {:?}", other))),
            };
            Record::Error {
                channel,
                reason: reason.trim().to_string(),
            }
        }
        other => return Err(Error::InvalidPacket(format!("unknown record kind {:?}", other))),
    };

    Ok(Some(Entry {
        at: Duration::from_millis(millis),
        record,
    }))
}

fn decode_hex(text: &str) -> Result<Bytes, Error> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&compact)
        .map(Bytes::from)
        .map_err(|e| Error::InvalidPacket(format!("bad hex payload: {}", e)))
}
