//! Event extraction: turning free-form event titles into classified sessions.
//!
//! Titles loosely follow
//! `"<Subject> (<Tag>) - Prowadzący: <Instructor>, Sala: <Room>"`, but
//! exporters vary punctuation and spacing, so every segment is optional:
//!
//! - no recognized tag → [`SessionType::Unknown`]
//! - no platform keyword → [`LocationCategory::OnCampus`]
//! - no extractable subject → the whole trimmed title
//!
//! Only an empty title is rejected.

use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;

use crate::event::{ClassificationError, ClassifiedSession, RawEvent};
use crate::session_type::{LocationCategory, SessionType};

/// Instructor segment, up to the room segment or the end of the title.
static INSTRUCTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bprowadzący\s*:\s*(.+?)\s*(?:,\s*sala\s*:|$)").unwrap()
});

/// Room segment, running to the end of the title.
static ROOM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsala\s*:\s*(.+)$").unwrap());

/// Classifies a single raw event.
///
/// Pure and deterministic: the same event always yields the same session.
pub fn classify(event: &RawEvent) -> Result<ClassifiedSession, ClassificationError> {
    let title = event.title.trim();
    if title.is_empty() {
        return Err(ClassificationError::EmptyTitle { start: event.start });
    }

    let tag = find_tag(title);
    let session_type = tag.map_or(SessionType::Unknown, |(_, kind)| kind);
    let subject = extract_subject(title, tag.map(|(open, _)| open));

    let instructor = capture_segment(&INSTRUCTOR_RE, title);
    let room = capture_segment(&ROOM_RE, title);
    let location = LocationCategory::from_text(room.as_deref().unwrap_or(title));

    Ok(ClassifiedSession {
        subject,
        session_type,
        location,
        instructor,
        room,
        start: event.start,
        end: event.end,
        duration: (event.end - event.start).max(Duration::zero()),
    })
}

/// Iterates over `(byte offset of '(', inner text)` for each closed parenthesized group.
fn parenthesized_groups(title: &str) -> impl Iterator<Item = (usize, &str)> {
    title.match_indices('(').filter_map(move |(open, _)| {
        let rest = &title[open + 1..];
        rest.find(')').map(|close| (open, &rest[..close]))
    })
}

/// Finds the first parenthesized group holding a known session tag.
fn find_tag(title: &str) -> Option<(usize, SessionType)> {
    parenthesized_groups(title)
        .find_map(|(open, inner)| SessionType::from_tag(inner).map(|kind| (open, kind)))
}

fn extract_subject(title: &str, tag_open: Option<usize>) -> String {
    let head = match tag_open.or_else(|| title.find('(')) {
        Some(open) => &title[..open],
        None => [title.find(" - "), title.find(',')]
            .into_iter()
            .flatten()
            .min()
            .map_or(title, |cut| &title[..cut]),
    };

    let subject = normalize_whitespace(head.trim_end_matches(|c: char| {
        c.is_whitespace() || matches!(c, '-' | '–' | ',' | ':' | ';' | '.')
    }));

    if subject.is_empty() {
        normalize_whitespace(title)
    } else {
        subject
    }
}

fn capture_segment(re: &Regex, title: &str) -> Option<String> {
    re.captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_whitespace(m.as_str()))
        .filter(|s| !s.is_empty())
}

/// Collapses runs of whitespace into single spaces and trims the ends.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
