//! Report command: load a calendar, aggregate it and render the statistics.
//!
//! Output is either a human-readable summary (optionally verbose, with
//! per-subject instructors/rooms and the on-campus schedule) or JSON.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use schedstat_core::{
    CampusVisit, LocationCategory, Report, SessionType, analyze, analyze_parallel,
};
use serde::Serialize;

use crate::Config;

/// Maximum number of rooms listed per subject in the verbose report.
const MAX_ROOMS_SHOWN: usize = 3;

/// Label column width for key/value rows.
const LABEL_WIDTH: usize = 30;

/// Rendering options derived from configuration and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub verbose: bool,
    pub semester_weeks: u32,
    pub commute_hours_per_trip: f64,
}

impl RenderOptions {
    pub const fn new(config: &Config, verbose: bool) -> Self {
        Self {
            verbose,
            semester_weeks: config.semester_weeks,
            commute_hours_per_trip: config.commute_hours_per_trip,
        }
    }
}

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    /// Display name of the analysed calendar.
    pub source: String,
    pub report: Report,
    /// Calendar entries the parser dropped (no usable start time).
    pub skipped_events: usize,
}

// ========== Report Generation ==========

/// Reads the calendar at `path` and aggregates its events.
pub fn generate_report_data(path: &Path, parallel: bool) -> Result<ReportData> {
    let calendar = schedstat_ics::read_calendar_file(path)
        .with_context(|| format!("failed to load calendar {}", path.display()))?;

    if calendar.skipped > 0 {
        tracing::warn!(
            skipped = calendar.skipped,
            "some calendar entries had no usable start time"
        );
    }

    let report = if parallel {
        analyze_parallel(&calendar.events)
    } else {
        analyze(&calendar.events)
    };

    let source = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    Ok(ReportData {
        source,
        report,
        skipped_events: calendar.skipped,
    })
}

// ========== Duration Formatting ==========

#[allow(clippy::cast_precision_loss)]
fn hours(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / 3600.0
}

/// Formats a duration as hours with one decimal, e.g. "7.5 h".
pub fn format_hours(duration: Duration) -> String {
    format!("{:.1} h", hours(duration))
}

/// Formats a duration as "Xh Ym" if >= 1 hour, "Xm" otherwise.
/// Negative durations are treated as 0m.
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes();
    if total_minutes < 0 {
        return "0m".to_string();
    }
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Share of `part` in `whole` as a percentage, `None` when `whole` is zero.
#[allow(clippy::cast_precision_loss)]
fn percent(part: Duration, whole: Duration) -> Option<f64> {
    let whole = whole.num_seconds();
    (whole > 0).then(|| part.num_seconds() as f64 / whole as f64 * 100.0)
}

fn estimated_travel_hours(campus_days: usize, options: &RenderOptions) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let days = campus_days as f64;
    days * options.commute_hours_per_trip
}

const fn type_name(kind: SessionType) -> &'static str {
    match kind {
        SessionType::Lecture => "Lecture",
        SessionType::Lab => "Lab",
        SessionType::ELearningExercise => "E-learning exercise",
        SessionType::Unknown => "Other",
    }
}

// ========== Text Output ==========

fn section(output: &mut String, title: &str) {
    writeln!(output).unwrap();
    writeln!(output, "{title}").unwrap();
    writeln!(output, "{}", "─".repeat(title.chars().count())).unwrap();
}

fn row(output: &mut String, label: &str, value: impl std::fmt::Display) {
    let label = format!("{label}:");
    writeln!(output, "{label:<LABEL_WIDTH$}{value}").unwrap();
}

fn write_sessions(output: &mut String, data: &ReportData) {
    let report = &data.report;
    section(output, "SESSIONS");
    row(output, "Total events", report.total_events);
    for (kind, tally) in report.by_type.iter() {
        row(output, kind.label(), tally.count);
    }
    row(output, "Unparseable (skipped)", report.unparseable);
    if data.skipped_events > 0 {
        row(output, "Without start time", data.skipped_events);
    }
}

fn write_locations(output: &mut String, report: &Report) {
    section(output, "LOCATIONS");
    for (location, tally) in report.by_location.iter() {
        row(output, location.label(), tally.count);
    }
}

fn write_time(output: &mut String, report: &Report, options: &RenderOptions) {
    section(output, "TIME");
    row(output, "Total time", format_hours(report.total_duration));
    if let Some(average) = report.average_duration() {
        row(output, "Average session", format_duration(average));
    }

    if options.verbose {
        for (kind, tally) in report.by_type.iter() {
            let value = format!("{} ({} sessions)", format_hours(tally.duration), tally.count);
            row(output, kind.label(), value);
        }
    }

    let campus = report.by_location.on_campus.duration;
    let remote = report.remote_duration();
    for (label, duration) in [("On campus", campus), ("Remote", remote)] {
        let value = percent(duration, report.total_duration).map_or_else(
            || format_hours(duration),
            |pct| format!("{} ({pct:.1}%)", format_hours(duration)),
        );
        row(output, label, value);
    }

    if options.semester_weeks > 0 {
        let weeks = options.semester_weeks;
        let per_week = |d: Duration| d / i32::try_from(weeks).unwrap_or(i32::MAX);
        row(
            output,
            &format!("Weekly load ({weeks} weeks)"),
            format_hours(per_week(report.total_duration)),
        );
        row(output, "  On campus", format_hours(per_week(campus)));
        row(output, "  Remote", format_hours(per_week(remote)));
    }
}

fn write_travel(output: &mut String, report: &Report, options: &RenderOptions) {
    let campus_days = report.campus_days().len();
    section(output, "TRAVEL");
    row(output, "Trips to campus", report.campus_trips());
    row(output, "Remote sessions", report.remote_sessions());
    row(output, "Campus days", campus_days);
    row(
        output,
        "Estimated travel time",
        format!("{:.1} h", estimated_travel_hours(campus_days, options)),
    );
    row(
        output,
        "Time saved by remote classes",
        format_hours(report.remote_duration()),
    );
}

fn write_subjects(output: &mut String, report: &Report, verbose: bool) {
    section(output, "SUBJECTS");
    if report.subjects.is_empty() {
        writeln!(output, "(no subjects)").unwrap();
        return;
    }

    for (name, stats) in &report.subjects {
        writeln!(output, "{name}").unwrap();
        writeln!(
            output,
            "  Sessions: {} (W {}, L {}, E-CW {}, other {})",
            stats.count,
            stats.by_type.lecture,
            stats.by_type.lab,
            stats.by_type.e_learning_exercise,
            stats.by_type.unknown,
        )
        .unwrap();
        writeln!(output, "  Time: {}", format_hours(stats.duration)).unwrap();

        if verbose {
            if !stats.instructors.is_empty() {
                let instructors: Vec<_> = stats.instructors.iter().map(String::as_str).collect();
                writeln!(output, "  Instructors: {}", instructors.join(", ")).unwrap();
            }
            if !stats.rooms.is_empty() {
                let rooms: Vec<_> = stats
                    .rooms
                    .iter()
                    .take(MAX_ROOMS_SHOWN)
                    .map(String::as_str)
                    .collect();
                let more = if stats.rooms.len() > MAX_ROOMS_SHOWN {
                    "..."
                } else {
                    ""
                };
                writeln!(output, "  Rooms: {}{more}", rooms.join(", ")).unwrap();
            }
        }
    }
}

fn write_campus_schedule(output: &mut String, report: &Report) {
    section(output, "CAMPUS SCHEDULE");
    let days = report.campus_days();
    if days.is_empty() {
        writeln!(output, "(no on-campus sessions)").unwrap();
        return;
    }

    for (index, (date, visits)) in days.iter().enumerate() {
        writeln!(output, "Day {}: {}", index + 1, date.format("%A, %b %-d, %Y")).unwrap();
        for visit in visits {
            writeln!(
                output,
                "  {}-{}  {} ({})",
                visit.start.format("%H:%M"),
                visit.end.format("%H:%M"),
                visit.subject,
                type_name(visit.session_type),
            )
            .unwrap();
            if let Some(room) = &visit.room {
                writeln!(output, "               Room: {room}").unwrap();
            }
            if let Some(instructor) = &visit.instructor {
                writeln!(output, "               Instructor: {instructor}").unwrap();
            }
        }
    }

    writeln!(output).unwrap();
    writeln!(
        output,
        "{} campus days, {} on-campus sessions",
        days.len(),
        report.campus_schedule.len()
    )
    .unwrap();
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData, options: &RenderOptions) -> String {
    let mut output = String::new();
    writeln!(output, "SCHEDULE REPORT: {}", data.source).unwrap();

    write_sessions(&mut output, data);
    write_locations(&mut output, &data.report);
    write_time(&mut output, &data.report, options);
    write_travel(&mut output, &data.report, options);
    write_subjects(&mut output, &data.report, options.verbose);
    if options.verbose {
        write_campus_schedule(&mut output, &data.report);
    }

    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub source: String,
    pub totals: JsonTotals,
    pub by_type: Vec<JsonTypeEntry>,
    pub by_location: Vec<JsonLocationEntry>,
    pub subjects: Vec<JsonSubject>,
    pub campus_days: Vec<JsonCampusDay>,
}

#[derive(Debug, Serialize)]
pub struct JsonTotals {
    pub total_events: usize,
    pub unparseable: usize,
    pub skipped_events: usize,
    pub total_duration_seconds: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_duration_seconds: Option<i64>,
    pub campus_trips: usize,
    pub remote_sessions: usize,
    pub campus_day_count: usize,
    pub estimated_travel_hours: f64,
}

#[derive(Debug, Serialize)]
pub struct JsonTypeEntry {
    pub session_type: SessionType,
    pub count: usize,
    pub duration_seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct JsonLocationEntry {
    pub location: LocationCategory,
    pub count: usize,
    pub duration_seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct JsonTypeCounts {
    pub lecture: usize,
    pub lab: usize,
    pub e_learning_exercise: usize,
    pub unknown: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonSubject {
    pub name: String,
    pub count: usize,
    pub duration_seconds: i64,
    pub by_type: JsonTypeCounts,
    pub instructors: Vec<String>,
    pub rooms: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonCampusDay {
    pub date: String,
    pub sessions: Vec<JsonCampusVisit>,
}

#[derive(Debug, Serialize)]
pub struct JsonCampusVisit {
    pub start: String,
    pub end: String,
    pub subject: String,
    pub session_type: SessionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
}

impl From<&CampusVisit> for JsonCampusVisit {
    fn from(visit: &CampusVisit) -> Self {
        Self {
            start: visit.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            end: visit.end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            subject: visit.subject.clone(),
            session_type: visit.session_type,
            room: visit.room.clone(),
            instructor: visit.instructor.clone(),
        }
    }
}

fn json_campus_day(date: NaiveDate, visits: &[&CampusVisit]) -> JsonCampusDay {
    JsonCampusDay {
        date: date.format("%Y-%m-%d").to_string(),
        sessions: visits.iter().map(|v| JsonCampusVisit::from(*v)).collect(),
    }
}

/// Builds the JSON report structure.
pub fn build_json_report(data: &ReportData, options: &RenderOptions) -> JsonReport {
    let report = &data.report;
    let days = report.campus_days();

    JsonReport {
        source: data.source.clone(),
        totals: JsonTotals {
            total_events: report.total_events,
            unparseable: report.unparseable,
            skipped_events: data.skipped_events,
            total_duration_seconds: report.total_duration.num_seconds(),
            average_duration_seconds: report.average_duration().map(|d| d.num_seconds()),
            campus_trips: report.campus_trips(),
            remote_sessions: report.remote_sessions(),
            campus_day_count: days.len(),
            estimated_travel_hours: estimated_travel_hours(days.len(), options),
        },
        by_type: report
            .by_type
            .iter()
            .map(|(kind, tally)| JsonTypeEntry {
                session_type: kind,
                count: tally.count,
                duration_seconds: tally.duration.num_seconds(),
            })
            .collect(),
        by_location: report
            .by_location
            .iter()
            .map(|(location, tally)| JsonLocationEntry {
                location,
                count: tally.count,
                duration_seconds: tally.duration.num_seconds(),
            })
            .collect(),
        subjects: report
            .subjects
            .iter()
            .map(|(name, stats)| JsonSubject {
                name: name.clone(),
                count: stats.count,
                duration_seconds: stats.duration.num_seconds(),
                by_type: JsonTypeCounts {
                    lecture: stats.by_type.lecture,
                    lab: stats.by_type.lab,
                    e_learning_exercise: stats.by_type.e_learning_exercise,
                    unknown: stats.by_type.unknown,
                },
                instructors: stats.instructors.iter().cloned().collect(),
                rooms: stats.rooms.iter().cloned().collect(),
            })
            .collect(),
        campus_days: days
            .iter()
            .map(|(date, visits)| json_campus_day(*date, visits))
            .collect(),
    }
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData, options: &RenderOptions) -> Result<String> {
    Ok(serde_json::to_string_pretty(&build_json_report(data, options))?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run(path: &Path, config: &Config, verbose: bool, json: bool, parallel: bool) -> Result<()> {
    let data = generate_report_data(path, parallel || config.parallel)?;
    let options = RenderOptions::new(config, verbose);

    if json {
        let output = format_report_json(&data, &options)?;
        println!("{output}");
    } else {
        let output = format_report(&data, &options);
        print!("{output}");
    }

    Ok(())
}
