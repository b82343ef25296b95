//! Checkpoint grid arithmetic.
//!
//! The grid is anchored at local midnight in a fixed offset: checkpoint `k` of a
//! day lies `k * interval` minutes after midnight. All arithmetic runs on
//! absolute instants so hour and day boundaries need no special casing.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};

use crate::domain::entities::Checkpoint;

/// Largest accepted interval (one day).
pub const MAX_INTERVAL_MINUTES: u32 = 24 * 60;

/// Number of checkpoints kept armed at any time.
pub const UPCOMING_CHECKPOINTS: usize = 2;

/// An interval grid in a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointGrid {
    interval_minutes: u32,
    offset: FixedOffset,
}

impl CheckpointGrid {
    /// `None` unless `interval_minutes` is within `1..=MAX_INTERVAL_MINUTES`.
    pub fn new(interval_minutes: u32, offset: FixedOffset) -> Option<Self> {
        (1..=MAX_INTERVAL_MINUTES)
            .contains(&interval_minutes)
            .then_some(Self {
                interval_minutes,
                offset,
            })
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    fn interval(&self) -> Duration {
        Duration::minutes(i64::from(self.interval_minutes))
    }

    /// Local midnight of the day containing `now`, as an absolute instant.
    fn midnight_before(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_midnight = now
            .with_timezone(&self.offset)
            .date_naive()
            .and_time(NaiveTime::MIN);
        let utc_midnight =
            local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc_midnight)
    }

    /// First grid point strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let midnight = self.midnight_before(now);
        let interval = self.interval();
        let interval_ms = interval.num_milliseconds();

        let elapsed_ms = (now - midnight).num_milliseconds();
        let steps = elapsed_ms.div_euclid(interval_ms) + 1;

        midnight + Duration::milliseconds(steps * interval_ms)
    }

    /// The next `count` grid points after `now`, exactly one interval apart.
    pub fn upcoming(&self, now: DateTime<Utc>, count: usize) -> Vec<Checkpoint> {
        let first = self.next_after(now);
        let interval = self.interval();

        std::iter::successors(Some(first), |at| Some(*at + interval))
            .take(count)
            .map(|at| Checkpoint::new(at, self.offset))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn bogota() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    /// `local` is a Bogota wall-clock time on 2024-05-01.
    fn local(hh_mm_ss: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&format!("2024-05-01T{}-05:00", hh_mm_ss))
            .unwrap()
            .with_timezone(&Utc)
    }

    fn times(checkpoints: &[Checkpoint]) -> Vec<&str> {
        checkpoints.iter().map(|c| c.time.as_str()).collect()
    }

    #[test_case(30, "10:05:00", ["10:30", "11:00"] ; "half hour grid")]
    #[test_case(20, "10:50:00", ["11:00", "11:20"] ; "crosses the hour")]
    #[test_case(30, "10:30:00", ["11:00", "11:30"] ; "exactly on a point is not upcoming")]
    #[test_case(15, "10:59:59", ["11:00", "11:15"] ; "one second before the hour")]
    #[test_case(45, "10:05:00", ["10:30", "11:15"] ; "interval not dividing the hour")]
    #[test_case(60, "23:40:00", ["00:00", "01:00"] ; "crosses midnight")]
    #[test_case(1, "10:05:30", ["10:06", "10:07"] ; "minute grid")]
    fn test_upcoming_checkpoints(interval: u32, now: &str, expected: [&str; 2]) {
        let grid = CheckpointGrid::new(interval, bogota()).unwrap();
        let checkpoints = grid.upcoming(local(now), UPCOMING_CHECKPOINTS);
        assert_eq!(times(&checkpoints), expected.to_vec());
    }

    #[test]
    fn test_checkpoints_strictly_future_and_evenly_spaced() {
        let grid = CheckpointGrid::new(20, bogota()).unwrap();
        let mut now = local("00:00:00");
        let end = local("23:59:59");

        while now < end {
            let checkpoints = grid.upcoming(now, UPCOMING_CHECKPOINTS);
            assert_eq!(checkpoints.len(), 2);
            assert!(checkpoints[0].at > now);
            assert!(checkpoints[0].at <= now + Duration::minutes(20));
            assert_eq!(checkpoints[1].at - checkpoints[0].at, Duration::minutes(20));
            now += Duration::seconds(397);
        }
    }

    #[test]
    fn test_sub_millisecond_past_point_still_advances() {
        let grid = CheckpointGrid::new(30, bogota()).unwrap();
        let now = local("10:30:00") + Duration::nanoseconds(500);
        assert_eq!(grid.next_after(now), local("11:00:00"));
    }

    #[test]
    fn test_alignment_follows_offset() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let grid = CheckpointGrid::new(45, utc).unwrap();
        let now = DateTime::parse_from_rfc3339("2024-05-01T10:05:00Z")
            .unwrap()
            .with_timezone(&Utc);
        // 10:05 UTC is 605 minutes after UTC midnight; next multiple of 45 is 630.
        assert_eq!(grid.upcoming(now, 1)[0].time, "10:30");
    }

    #[test_case(0 ; "zero")]
    #[test_case(1441 ; "more than a day")]
    fn test_invalid_interval_rejected(interval: u32) {
        assert_eq!(CheckpointGrid::new(interval, bogota()), None);
    }
}
