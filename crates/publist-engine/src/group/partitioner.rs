use std::collections::BTreeMap;

use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp, Zoned};

use super::{AgeBand, GroupLabel};
use crate::{PublishConfig, PublishResult, TRACING_TARGET_GROUP};

type TimestampFn<'a, R> = Box<dyn Fn(&R) -> Timestamp + 'a>;
type DebugPathFn<'a, R> = Box<dyn Fn(&R) -> String + 'a>;
type MakeGroupFn<'a, R, G> = Box<dyn Fn(String, Vec<R>) -> G + 'a>;

/// How a partitioner buckets its input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Grouping {
    /// Young resources by session, medium ones by day, the rest in one group.
    #[default]
    ByAge,
    /// Everything in one group with the given name.
    Single {
        /// Group name.
        name: String,
    },
}

/// Splits a flat resource list into recency groups.
///
/// The partitioner knows nothing about the resource or group types. It reads
/// timestamps and debug paths through the supplied closures and builds groups
/// with the third one.
///
/// Output order is young sessions (newest first), then day groups (newest
/// first), then the catch-all group. Each group lists its members newest
/// first; resources with equal timestamps keep their input order.
pub struct GroupPartitioner<'a, R, G> {
    timestamp: TimestampFn<'a, R>,
    debug_path: DebugPathFn<'a, R>,
    make_group: MakeGroupFn<'a, R, G>,
    grouping: Grouping,
    session_gap: SignedDuration,
    young_days: i64,
    medium_days: i64,
    time_zone: TimeZone,
}

impl<'a, R, G> GroupPartitioner<'a, R, G> {
    /// Creates an age-based partitioner.
    pub fn new(
        config: &PublishConfig,
        timestamp: impl Fn(&R) -> Timestamp + 'a,
        debug_path: impl Fn(&R) -> String + 'a,
        make_group: impl Fn(String, Vec<R>) -> G + 'a,
    ) -> PublishResult<Self> {
        Ok(Self {
            timestamp: Box::new(timestamp),
            debug_path: Box::new(debug_path),
            make_group: Box::new(make_group),
            grouping: Grouping::ByAge,
            session_gap: config.session_gap,
            young_days: config.young_days,
            medium_days: config.medium_days,
            time_zone: config.resolve_time_zone()?,
        })
    }

    /// Replaces the grouping strategy.
    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    /// Returns the grouping strategy.
    pub fn grouping(&self) -> &Grouping {
        &self.grouping
    }

    /// Partitions relative to the current time.
    pub fn partition(&self, resources: Vec<R>) -> Vec<G> {
        self.partition_at(resources, Timestamp::now())
    }

    /// Partitions relative to `now`.
    pub fn partition_at(&self, mut resources: Vec<R>, now: Timestamp) -> Vec<G> {
        if resources.is_empty() {
            return Vec::new();
        }
        resources.sort_by(|a, b| (self.timestamp)(b).cmp(&(self.timestamp)(a)));

        if let Grouping::Single { name } = &self.grouping {
            let label = GroupLabel::All(name.clone());
            return vec![(self.make_group)(label.to_string(), resources)];
        }

        let ages = self.local_day_ages(&resources, now);
        let mut young = Vec::new();
        let mut medium = Vec::new();
        let mut old = Vec::new();
        for resource in resources {
            let age = ages
                .get(&(self.timestamp)(&resource))
                .copied()
                .unwrap_or_default();
            let band = AgeBand::classify(age, self.young_days, self.medium_days);
            tracing::trace!(
                target: TRACING_TARGET_GROUP,
                path = %(self.debug_path)(&resource),
                age_days = age,
                band = %band,
                "classified resource"
            );
            match band {
                AgeBand::Young => young.push(resource),
                AgeBand::Medium => medium.push((age, resource)),
                AgeBand::Old => old.push(resource),
            }
        }

        let mut groups = Vec::new();
        for session in self.split_sessions(young) {
            let Some(earliest) = session.last() else {
                continue;
            };
            let label = GroupLabel::Session(self.local(earliest));
            groups.push((self.make_group)(label.to_string(), session));
        }
        for day in split_days(medium) {
            let Some(first) = day.first() else {
                continue;
            };
            let label = GroupLabel::Day(self.local(first).date());
            groups.push((self.make_group)(label.to_string(), day));
        }
        if !old.is_empty() {
            groups.push((self.make_group)(GroupLabel::EverythingElse.to_string(), old));
        }

        tracing::debug!(
            target: TRACING_TARGET_GROUP,
            groups = groups.len(),
            "partitioned publish list"
        );
        groups
    }

    fn local(&self, resource: &R) -> Zoned {
        (self.timestamp)(resource).to_zoned(self.time_zone.clone())
    }

    /// Computes the age in local days of every distinct timestamp.
    ///
    /// Walks the descending timestamps from `now` and sums the calendar-day
    /// differences between consecutive local dates, so a day boundary counts
    /// once no matter how few hours lie across it.
    fn local_day_ages(&self, descending: &[R], now: Timestamp) -> BTreeMap<Timestamp, i64> {
        let mut ages = BTreeMap::new();
        let mut previous = now.to_zoned(self.time_zone.clone()).date();
        let mut age = 0i64;

        for resource in descending {
            let timestamp = (self.timestamp)(resource);
            if ages.contains_key(&timestamp) {
                continue;
            }
            let date = timestamp.to_zoned(self.time_zone.clone()).date();
            age += previous.duration_since(date).as_hours() / 24;
            previous = date;
            ages.insert(timestamp, age.max(0));
        }
        ages
    }

    /// Splits newest-first resources wherever consecutive edits lie more
    /// than the session gap apart.
    fn split_sessions(&self, young: Vec<R>) -> Vec<Vec<R>> {
        let mut sessions: Vec<Vec<R>> = Vec::new();
        let mut last: Option<Timestamp> = None;

        for resource in young {
            let timestamp = (self.timestamp)(&resource);
            let starts_new =
                last.is_none_or(|last| last.duration_since(timestamp) > self.session_gap);
            match sessions.last_mut() {
                Some(session) if !starts_new => session.push(resource),
                _ => sessions.push(vec![resource]),
            }
            last = Some(timestamp);
        }
        sessions
    }
}

fn split_days<R>(medium: Vec<(i64, R)>) -> Vec<Vec<R>> {
    let mut days: Vec<Vec<R>> = Vec::new();
    let mut current_age = None;

    for (age, resource) in medium {
        match days.last_mut() {
            Some(day) if current_age == Some(age) => day.push(resource),
            _ => days.push(vec![resource]),
        }
        current_age = Some(age);
    }
    days
}
