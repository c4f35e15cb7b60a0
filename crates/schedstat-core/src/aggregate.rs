//! Aggregation of classified sessions into a statistics report.
//!
//! The fold is a commutative monoid: counters and durations are summed, the
//! per-subject map is keyed by name and the campus schedule is kept sorted.
//! Any consumption order, and any split into partial aggregators merged with
//! [`Aggregator::merge`], yields the same [`Report`].

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Index, IndexMut};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rayon::prelude::*;

use crate::event::{ClassificationError, ClassifiedSession, RawEvent};
use crate::extract::classify;
use crate::session_type::{LocationCategory, SessionType};

/// Event count with the summed duration of those events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub count: usize,
    pub duration: Duration,
}

impl Tally {
    fn add(&mut self, duration: Duration) {
        self.count += 1;
        self.duration += duration;
    }

    fn merge(&mut self, other: Self) {
        self.count += other.count;
        self.duration += other.duration;
    }
}

impl Default for Tally {
    fn default() -> Self {
        Self {
            count: 0,
            duration: Duration::zero(),
        }
    }
}

/// One value per [`SessionType`], indexable by the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByType<T> {
    pub lecture: T,
    pub lab: T,
    pub e_learning_exercise: T,
    pub unknown: T,
}

impl<T> ByType<T> {
    /// Iterates in [`SessionType::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (SessionType, &T)> {
        SessionType::ALL.into_iter().map(move |kind| (kind, &self[kind]))
    }
}

impl<T> Index<SessionType> for ByType<T> {
    type Output = T;

    fn index(&self, kind: SessionType) -> &T {
        match kind {
            SessionType::Lecture => &self.lecture,
            SessionType::Lab => &self.lab,
            SessionType::ELearningExercise => &self.e_learning_exercise,
            SessionType::Unknown => &self.unknown,
        }
    }
}

impl<T> IndexMut<SessionType> for ByType<T> {
    fn index_mut(&mut self, kind: SessionType) -> &mut T {
        match kind {
            SessionType::Lecture => &mut self.lecture,
            SessionType::Lab => &mut self.lab,
            SessionType::ELearningExercise => &mut self.e_learning_exercise,
            SessionType::Unknown => &mut self.unknown,
        }
    }
}

/// One value per [`LocationCategory`], indexable by the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByLocation<T> {
    pub remote_teams: T,
    pub remote_moodle: T,
    pub on_campus: T,
}

impl<T> ByLocation<T> {
    /// Iterates in [`LocationCategory::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (LocationCategory, &T)> {
        LocationCategory::ALL
            .into_iter()
            .map(move |location| (location, &self[location]))
    }
}

impl<T> Index<LocationCategory> for ByLocation<T> {
    type Output = T;

    fn index(&self, location: LocationCategory) -> &T {
        match location {
            LocationCategory::RemoteTeams => &self.remote_teams,
            LocationCategory::RemoteMoodle => &self.remote_moodle,
            LocationCategory::OnCampus => &self.on_campus,
        }
    }
}

impl<T> IndexMut<LocationCategory> for ByLocation<T> {
    fn index_mut(&mut self, location: LocationCategory) -> &mut T {
        match location {
            LocationCategory::RemoteTeams => &mut self.remote_teams,
            LocationCategory::RemoteMoodle => &mut self.remote_moodle,
            LocationCategory::OnCampus => &mut self.on_campus,
        }
    }
}

/// Per-subject breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectStats {
    pub count: usize,
    pub duration: Duration,
    pub by_type: ByType<usize>,
    pub instructors: BTreeSet<String>,
    pub rooms: BTreeSet<String>,
}

impl Default for SubjectStats {
    fn default() -> Self {
        Self {
            count: 0,
            duration: Duration::zero(),
            by_type: ByType::default(),
            instructors: BTreeSet::new(),
            rooms: BTreeSet::new(),
        }
    }
}

impl SubjectStats {
    fn record(&mut self, session: &ClassifiedSession) {
        self.count += 1;
        self.duration += session.duration;
        self.by_type[session.session_type] += 1;
        if let Some(instructor) = &session.instructor {
            self.instructors.insert(instructor.clone());
        }
        if let Some(room) = &session.room {
            self.rooms.insert(room.clone());
        }
    }

    fn merge(&mut self, other: Self) {
        self.count += other.count;
        self.duration += other.duration;
        for kind in SessionType::ALL {
            self.by_type[kind] += other.by_type[kind];
        }
        self.instructors.extend(other.instructors);
        self.rooms.extend(other.rooms);
    }
}

/// An on-campus session, kept for the travel schedule.
///
/// Ordered by start time first so the schedule sorts chronologically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CampusVisit {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub subject: String,
    pub session_type: SessionType,
    pub room: Option<String>,
    pub instructor: Option<String>,
}

impl From<&ClassifiedSession> for CampusVisit {
    fn from(session: &ClassifiedSession) -> Self {
        Self {
            start: session.start,
            end: session.end,
            subject: session.subject.clone(),
            session_type: session.session_type,
            room: session.room.clone(),
            instructor: session.instructor.clone(),
        }
    }
}

/// Summary statistics for one calendar.
///
/// Invariants:
/// - `total_events` equals the sum of `by_type` counts and of `by_location` counts
/// - `total_duration` equals the sum of subject durations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub total_events: usize,
    /// Events skipped because they could not be classified.
    pub unparseable: usize,
    pub total_duration: Duration,
    pub by_type: ByType<Tally>,
    pub by_location: ByLocation<Tally>,
    pub subjects: BTreeMap<String, SubjectStats>,
    /// On-campus sessions sorted by start.
    pub campus_schedule: Vec<CampusVisit>,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            total_events: 0,
            unparseable: 0,
            total_duration: Duration::zero(),
            by_type: ByType::default(),
            by_location: ByLocation::default(),
            subjects: BTreeMap::new(),
            campus_schedule: Vec::new(),
        }
    }
}

impl Report {
    /// Sessions held on Teams or Moodle.
    pub const fn remote_sessions(&self) -> usize {
        self.by_location.remote_teams.count + self.by_location.remote_moodle.count
    }

    /// Time spent in sessions held on Teams or Moodle.
    pub fn remote_duration(&self) -> Duration {
        self.by_location.remote_teams.duration + self.by_location.remote_moodle.duration
    }

    /// Number of trips to campus, one per on-campus session.
    pub const fn campus_trips(&self) -> usize {
        self.by_location.on_campus.count
    }

    /// Mean session duration, `None` for an empty report.
    pub fn average_duration(&self) -> Option<Duration> {
        i32::try_from(self.total_events)
            .ok()
            .filter(|&n| n > 0)
            .map(|n| self.total_duration / n)
    }

    /// On-campus sessions grouped by calendar day.
    pub fn campus_days(&self) -> BTreeMap<NaiveDate, Vec<&CampusVisit>> {
        let mut days: BTreeMap<NaiveDate, Vec<&CampusVisit>> = BTreeMap::new();
        for visit in &self.campus_schedule {
            days.entry(visit.start.date()).or_default().push(visit);
        }
        days
    }
}

/// Running accumulation of classified sessions.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    report: Report,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one classified session into the running totals.
    pub fn record(&mut self, session: &ClassifiedSession) {
        let report = &mut self.report;
        report.total_events += 1;
        report.total_duration += session.duration;
        report.by_type[session.session_type].add(session.duration);
        report.by_location[session.location].add(session.duration);
        report
            .subjects
            .entry(session.subject.clone())
            .or_default()
            .record(session);

        if session.location == LocationCategory::OnCampus {
            report.campus_schedule.push(CampusVisit::from(session));
        }
    }

    /// Counts an event that could not be classified.
    pub const fn skip(&mut self) {
        self.report.unparseable += 1;
    }

    /// Records a classification result, skipping failures.
    pub fn push(&mut self, result: Result<ClassifiedSession, ClassificationError>) {
        match result {
            Ok(session) => self.record(&session),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unparseable event");
                self.skip();
            }
        }
    }

    /// Combines two partial aggregations by summation.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        let report = &mut self.report;
        let other = other.report;

        report.total_events += other.total_events;
        report.unparseable += other.unparseable;
        report.total_duration += other.total_duration;
        for kind in SessionType::ALL {
            report.by_type[kind].merge(other.by_type[kind]);
        }
        for location in LocationCategory::ALL {
            report.by_location[location].merge(other.by_location[location]);
        }
        for (subject, stats) in other.subjects {
            report.subjects.entry(subject).or_default().merge(stats);
        }
        report.campus_schedule.extend(other.campus_schedule);

        self
    }

    /// Returns the report with the campus schedule in chronological order.
    pub fn finish(mut self) -> Report {
        self.report.campus_schedule.sort();
        self.report
    }
}

/// Aggregates classification results in a single sequential pass.
pub fn aggregate<I>(results: I) -> Report
where
    I: IntoIterator<Item = Result<ClassifiedSession, ClassificationError>>,
{
    let mut aggregator = Aggregator::new();
    for result in results {
        aggregator.push(result);
    }
    aggregator.finish()
}

/// Classifies and aggregates events on the current thread.
pub fn analyze(events: &[RawEvent]) -> Report {
    let report = aggregate(events.iter().map(classify));
    tracing::debug!(
        events = events.len(),
        classified = report.total_events,
        unparseable = report.unparseable,
        "aggregated calendar events"
    );
    report
}

/// Classifies events in parallel and merges per-worker partial reports.
///
/// Produces exactly the same report as [`analyze`].
pub fn analyze_parallel(events: &[RawEvent]) -> Report {
    let report = events
        .par_iter()
        .fold(Aggregator::new, |mut acc, event| {
            acc.push(classify(event));
            acc
        })
        .reduce(Aggregator::new, Aggregator::merge)
        .finish();
    tracing::debug!(
        events = events.len(),
        classified = report.total_events,
        unparseable = report.unparseable,
        "aggregated calendar events in parallel"
    );
    report
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn sample_events() -> Vec<RawEvent> {
        vec![
            RawEvent::new(
                "Algorytmy i Struktury Danych (W) - Prowadzący: Kowalski, Sala: Platforma Teams",
                at(4, 8, 0),
                at(4, 9, 30),
            ),
            RawEvent::new(
                "Bazy Danych (L) - Prowadzący: Nowak, Sala: Laboratorium C102",
                at(4, 10, 0),
                at(4, 12, 15),
            ),
            RawEvent::new(
                "Bazy Danych (W) - Prowadzący: Nowak, Sala: Platforma Teams",
                at(5, 8, 0),
                at(5, 9, 30),
            ),
            RawEvent::new(
                "Sieci Komputerowe (E-CW) - Prowadzący: Zielińska, Sala: Platforma Moodle",
                at(5, 12, 0),
                at(5, 13, 0),
            ),
            RawEvent::new("Konsultacje - Sala: A101", at(11, 9, 0), at(11, 9, 45)),
            RawEvent::new("", at(11, 10, 0), at(11, 11, 0)),
            RawEvent::new(
                "Bazy Danych (L) - Prowadzący: Wiśniewski, Sala: Laboratorium C104",
                at(11, 12, 0),
                at(11, 11, 0),
            ),
        ]
    }

    fn assert_invariants(report: &Report) {
        let type_total: usize = report.by_type.iter().map(|(_, t)| t.count).sum();
        let location_total: usize = report.by_location.iter().map(|(_, t)| t.count).sum();
        assert_eq!(report.total_events, type_total);
        assert_eq!(report.total_events, location_total);

        let subject_duration = report
            .subjects
            .values()
            .fold(Duration::zero(), |acc, s| acc + s.duration);
        assert_eq!(report.total_duration, subject_duration);

        let type_duration = report
            .by_type
            .iter()
            .fold(Duration::zero(), |acc, (_, t)| acc + t.duration);
        assert_eq!(report.total_duration, type_duration);
    }

    #[test]
    fn counts_types_and_locations() {
        let report = analyze(&sample_events());

        assert_eq!(report.total_events, 6);
        assert_eq!(report.unparseable, 1);
        assert_eq!(report.by_type.lecture.count, 2);
        assert_eq!(report.by_type.lab.count, 2);
        assert_eq!(report.by_type.e_learning_exercise.count, 1);
        assert_eq!(report.by_type.unknown.count, 1);
        assert_eq!(report.by_location.remote_teams.count, 2);
        assert_eq!(report.by_location.remote_moodle.count, 1);
        assert_eq!(report.by_location.on_campus.count, 3);
        assert_eq!(report.remote_sessions(), 3);
        assert_eq!(report.campus_trips(), 3);
        assert_invariants(&report);
    }

    #[test]
    fn sums_durations() {
        let report = analyze(&sample_events());

        // 90 + 135 + 90 + 60 + 45 + 0 (end before start)
        assert_eq!(report.total_duration, Duration::minutes(420));
        assert_eq!(report.by_type.lab.duration, Duration::minutes(135));
        assert_eq!(report.by_location.on_campus.duration, Duration::minutes(180));
        assert_eq!(report.remote_duration(), Duration::minutes(240));
        assert_eq!(report.average_duration(), Some(Duration::minutes(70)));
    }

    #[test]
    fn builds_subject_breakdown() {
        let report = analyze(&sample_events());

        let names: Vec<_> = report.subjects.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            [
                "Algorytmy i Struktury Danych",
                "Bazy Danych",
                "Konsultacje",
                "Sieci Komputerowe"
            ]
        );

        let bazy = &report.subjects["Bazy Danych"];
        assert_eq!(bazy.count, 3);
        assert_eq!(bazy.duration, Duration::minutes(225));
        assert_eq!(bazy.by_type.lab, 2);
        assert_eq!(bazy.by_type.lecture, 1);
        assert_eq!(
            bazy.instructors.iter().collect::<Vec<_>>(),
            ["Nowak", "Wiśniewski"]
        );
        assert_eq!(bazy.rooms.len(), 3);
    }

    #[test]
    fn empty_title_only_increments_unparseable() {
        let before = analyze(&sample_events()[..5]);
        let mut events = sample_events()[..5].to_vec();
        events.push(RawEvent::new("", at(12, 8, 0), at(12, 9, 0)));
        let after = analyze(&events);

        assert_eq!(after.unparseable, before.unparseable + 1);
        assert_eq!(after.total_events, before.total_events);
        assert_eq!(after.total_duration, before.total_duration);
    }

    #[test]
    fn negative_duration_still_counts() {
        let report = analyze(&[RawEvent::new(
            "Bazy Danych (L) - Sala: C104",
            at(11, 12, 0),
            at(11, 11, 0),
        )]);

        assert_eq!(report.total_events, 1);
        assert_eq!(report.by_type.lab.count, 1);
        assert_eq!(report.by_location.on_campus.count, 1);
        assert_eq!(report.total_duration, Duration::zero());
        assert_invariants(&report);
    }

    #[test]
    fn order_does_not_matter() {
        let events = sample_events();
        let expected = analyze(&events);

        let mut reversed = events.clone();
        reversed.reverse();
        assert_eq!(analyze(&reversed), expected);

        for shift in 1..events.len() {
            let mut rotated = events.clone();
            rotated.rotate_left(shift);
            assert_eq!(analyze(&rotated), expected, "rotation by {shift}");
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let events: Vec<_> = sample_events().into_iter().cycle().take(500).collect();
        let sequential = analyze(&events);
        let parallel = analyze_parallel(&events);

        assert_eq!(parallel, sequential);
        assert_invariants(&parallel);
    }

    #[test]
    fn merge_of_partials_equals_single_pass() {
        let events = sample_events();
        let (left, right) = events.split_at(3);

        let mut a = Aggregator::new();
        left.iter().for_each(|e| a.push(classify(e)));
        let mut b = Aggregator::new();
        right.iter().for_each(|e| b.push(classify(e)));

        assert_eq!(b.merge(a).finish(), analyze(&events));
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let events = sample_events();
        let mut full = Aggregator::new();
        events.iter().for_each(|e| full.push(classify(e)));
        let expected = full.clone().finish();

        assert_eq!(full.clone().merge(Aggregator::new()).finish(), expected);
        assert_eq!(Aggregator::new().merge(full).finish(), expected);
    }

    #[test]
    fn campus_schedule_groups_by_day() {
        let report = analyze(&sample_events());
        let days = report.campus_days();

        assert_eq!(days.len(), 2);
        let oct_11 = &days[&NaiveDate::from_ymd_opt(2025, 10, 11).unwrap()];
        assert_eq!(oct_11.len(), 2);
        assert_eq!(oct_11[0].subject, "Konsultacje");
        assert_eq!(oct_11[1].room.as_deref(), Some("Laboratorium C104"));
    }

    #[test]
    fn finish_orders_campus_schedule() {
        let mut events = sample_events();
        events.reverse();
        let report = analyze(&events);

        let starts: Vec<_> = report.campus_schedule.iter().map(|v| v.start).collect();
        assert_eq!(starts, [at(4, 10, 0), at(11, 9, 0), at(11, 12, 0)]);
        assert!(report.campus_schedule.is_sorted());
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = analyze(&[]);

        assert_eq!(report, Report::default());
        assert_eq!(report.average_duration(), None);
        assert!(report.campus_days().is_empty());
    }
}
