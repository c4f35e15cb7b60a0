//! Calendar reader for class schedule statistics.
//!
//! Turns iCalendar text into [`RawEvent`]s using the `icalendar` crate for
//! the container grammar (line unfolding, property parsing).
//!
//! # Timestamps
//!
//! `DTSTART`/`DTEND` values are kept as wall-clock [`NaiveDateTime`]s exactly
//! as written: `TZID` and floating values stay local, `Z` values stay UTC,
//! and all-day dates map to midnight. Durations are computed on these values
//! without timezone conversion.
//!
//! # Skipped events
//!
//! A `VEVENT` without a usable `DTSTART` is skipped and counted in
//! [`ParsedCalendar::skipped`]. Missing `SUMMARY` is not a parse failure; the
//! event is passed on with an empty title and rejected during classification.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use icalendar::{Calendar, CalendarComponent, Component, Event};
use schedstat_core::RawEvent;
use thiserror::Error;

/// Errors that make a calendar unusable as a whole.
#[derive(Debug, Error)]
pub enum IcsError {
    /// The input file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The input has no calendar structure at all.
    #[error("input is not an iCalendar file (missing BEGIN:VCALENDAR)")]
    NotACalendar,
    /// The calendar grammar was rejected by the parser.
    #[error("invalid calendar syntax: {0}")]
    Syntax(String),
}

/// Events extracted from one calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCalendar {
    pub events: Vec<RawEvent>,
    /// `VEVENT`s dropped because they had no usable start time.
    pub skipped: usize,
}

/// Reads and parses a calendar file.
///
/// Input that is not valid UTF-8 is decoded as Latin-1.
pub fn read_calendar_file(path: &Path) -> Result<ParsedCalendar, IcsError> {
    let bytes = std::fs::read(path).map_err(|source| IcsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read calendar file");
    parse_calendar(&decode(bytes))
}

/// Parses calendar text into raw events.
pub fn parse_calendar(text: &str) -> Result<ParsedCalendar, IcsError> {
    let text = text.trim_start_matches('\u{feff}');
    if !text
        .lines()
        .any(|line| line.trim().eq_ignore_ascii_case("BEGIN:VCALENDAR"))
    {
        return Err(IcsError::NotACalendar);
    }

    let calendar: Calendar = text
        .parse()
        .map_err(|e| IcsError::Syntax(format!("{e}")))?;

    let mut parsed = ParsedCalendar::default();
    for component in &calendar.components {
        let CalendarComponent::Event(event) = component else {
            continue;
        };
        match to_raw_event(event) {
            Some(raw) => parsed.events.push(raw),
            None => {
                tracing::warn!(
                    summary = event.get_summary().unwrap_or_default(),
                    "skipping event without a usable DTSTART"
                );
                parsed.skipped += 1;
            }
        }
    }

    tracing::debug!(
        events = parsed.events.len(),
        skipped = parsed.skipped,
        "parsed calendar"
    );
    Ok(parsed)
}

fn decode(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|err| {
        tracing::debug!("calendar is not valid UTF-8, decoding as Latin-1");
        err.into_bytes().into_iter().map(char::from).collect()
    })
}

fn to_raw_event(event: &Event) -> Option<RawEvent> {
    let properties = event.properties();
    let title = event.get_summary().map(unescape_text).unwrap_or_default();

    let start = properties
        .get("DTSTART")
        .and_then(|p| parse_timestamp(p.value()))?;
    let end = properties
        .get("DTEND")
        .and_then(|p| parse_timestamp(p.value()))
        .or_else(|| {
            properties
                .get("DURATION")
                .and_then(|p| parse_duration(p.value()))
                .and_then(|d| start.checked_add_signed(d))
        })
        .unwrap_or(start);

    Some(RawEvent::new(title, start, end))
}

/// Parses `YYYYMMDD`, `YYYYMMDDTHHMMSS` and `YYYYMMDDTHHMMSSZ`.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.len() == 8 {
        NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    } else {
        NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y%m%dT%H%M%S").ok()
    }
}

/// Parses an RFC 5545 duration such as `PT1H30M`, `P1D` or `-PT15M`.
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, rest) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let rest = rest.strip_prefix('P')?;

    let mut total = Duration::zero();
    let mut digits = String::new();
    let mut in_time = false;
    for c in rest.chars() {
        match c {
            'T' => in_time = true,
            '0'..='9' => digits.push(c),
            unit => {
                let n: i64 = digits.parse().ok()?;
                digits.clear();
                let part = match (unit, in_time) {
                    ('W', false) => Duration::try_weeks(n),
                    ('D', false) => Duration::try_days(n),
                    ('H', true) => Duration::try_hours(n),
                    ('M', true) => Duration::try_minutes(n),
                    ('S', true) => Duration::try_seconds(n),
                    _ => return None,
                }?;
                total = total.checked_add(&part)?;
            }
        }
    }
    if !digits.is_empty() {
        return None;
    }

    Some(if negative { -total } else { total })
}

/// Decodes iCalendar TEXT escapes (`\,` `\;` `\\` `\n`).
///
/// Newlines become spaces since titles are matched as a single line.
fn unescape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n' | 'N') => out.push(' '),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
