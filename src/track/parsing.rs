use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::error::TrackError;
use super::types::{Fix, TrackSegment};

/// Parse an RFC 3339 time. Times without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(e) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| e.to_string()),
    }
}

pub fn parse_gpx_file<P: AsRef<Path>>(path: P) -> Result<TrackSegment, TrackError> {
    let content = fs::read_to_string(path.as_ref())?;
    let segment = parse_gpx_from_str(&content)?;
    log::info!(
        "Loaded {} track points from {}",
        segment.len(),
        path.as_ref().display()
    );
    Ok(segment)
}

/// Read the first segment of the first track in a GPX document.
pub fn parse_gpx_from_str(s: &str) -> Result<TrackSegment, TrackError> {
    let mut reader = Reader::from_str(s);
    reader.config_mut().trim_text(true);

    let mut gpx = GpxReader::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => gpx.open(&e, false)?,
            Event::Empty(e) => gpx.open(&e, true)?,
            Event::Text(t) => gpx.text(t.unescape()?.into_owned()),
            Event::End(e) => gpx.close(e.local_name().as_ref())?,
            Event::Eof => break,
            _ => {}
        }
    }

    gpx.finish()
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
enum Scope {
    #[default]
    NotSeen,
    Inside,
    Done,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Name,
    Ele,
    Time,
}

#[derive(Debug, Default)]
struct PendingFix {
    lat: Option<String>,
    lon: Option<String>,
    ele: Option<String>,
    time: Option<String>,
}

#[derive(Debug, Default)]
struct GpxReader {
    trk: Scope,
    seg: Scope,
    name: Option<String>,
    point: Option<PendingFix>,
    field: Option<Field>,
    fixes: Vec<Fix>,
}

impl GpxReader {
    fn open(&mut self, e: &BytesStart, empty: bool) -> Result<(), TrackError> {
        let after = |scope| if empty { Scope::Done } else { scope };

        match e.local_name().as_ref() {
            b"trk" if self.trk == Scope::NotSeen => self.trk = after(Scope::Inside),
            b"trkseg" if self.trk == Scope::Inside && self.seg == Scope::NotSeen => {
                self.seg = after(Scope::Inside)
            }
            b"trkpt" if self.seg == Scope::Inside => {
                let mut pending = PendingFix::default();
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.local_name().as_ref() {
                        b"lat" => pending.lat = Some(attr.unescape_value()?.into_owned()),
                        b"lon" => pending.lon = Some(attr.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }
                if empty {
                    self.push(pending)?;
                } else {
                    self.point = Some(pending);
                }
            }
            b"ele" if !empty && self.point.is_some() => self.field = Some(Field::Ele),
            b"time" if !empty && self.point.is_some() => self.field = Some(Field::Time),
            b"name" if !empty && self.trk == Scope::Inside && self.seg == Scope::NotSeen => {
                self.field = Some(Field::Name)
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: String) {
        match (self.field, self.point.as_mut()) {
            (Some(Field::Ele), Some(point)) => point.ele = Some(text),
            (Some(Field::Time), Some(point)) => point.time = Some(text),
            (Some(Field::Name), _) => self.name = Some(text),
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) -> Result<(), TrackError> {
        match name {
            b"trk" if self.trk == Scope::Inside => self.trk = Scope::Done,
            b"trkseg" if self.seg == Scope::Inside => self.seg = Scope::Done,
            b"trkpt" => {
                if let Some(pending) = self.point.take() {
                    self.push(pending)?;
                }
            }
            b"ele" | b"time" | b"name" => self.field = None,
            _ => {}
        }
        Ok(())
    }

    fn push(&mut self, pending: PendingFix) -> Result<(), TrackError> {
        let index = self.fixes.len();
        let latitude = parse_coordinate(index, "lat", pending.lat, 90.0)?;
        let longitude = parse_coordinate(index, "lon", pending.lon, 180.0)?;
        // Missing elevation reads as sea level.
        let elevation = match pending.ele {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(TrackError::InvalidElevation { index, value: raw })?,
            None => 0.0,
        };

        self.fixes.push(Fix {
            latitude,
            longitude,
            elevation,
            time: pending.time,
        });
        Ok(())
    }

    fn finish(self) -> Result<TrackSegment, TrackError> {
        if self.seg == Scope::NotSeen {
            return Err(TrackError::NoSegment);
        }
        if self.fixes.is_empty() {
            return Err(TrackError::EmptySegment);
        }
        Ok(TrackSegment::new(self.name, self.fixes))
    }
}

fn parse_coordinate(
    index: usize,
    attribute: &'static str,
    raw: Option<String>,
    limit: f64,
) -> Result<f64, TrackError> {
    let raw = raw.ok_or(TrackError::MissingCoordinate { index, attribute })?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
        .ok_or(TrackError::InvalidCoordinate {
            index,
            attribute,
            value: raw,
        })
}
