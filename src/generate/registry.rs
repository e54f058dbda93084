//! Maps a column type to a generator of fake values of compatible shape.

use chrono::{DateTime, Months, NaiveDateTime};
use fake::faker::lorem::en::Words;
use fake::Fake;
use rand::Rng;
use std::time::Duration;
use uuid::Uuid;

use crate::row::Value;
use crate::schema::ColumnType;

/// How far back generated timestamps may reach
pub const TIMESTAMP_YEARS_BACK: u32 = 30;
/// Upper bound (inclusive) of generated intervals
pub const MAX_INTERVAL_SECS: u64 = 86_400;
/// Upper bound (exclusive) of generated floats
pub const MAX_FLOAT: f64 = 10_000.0;
/// Words per generated text value
pub const TEXT_WORDS: usize = 8;

/// Generate a value for a column of the given type.
///
/// Returns `None` for unsupported types; the caller leaves those columns unset.
pub fn value_for<R: Rng>(
    col_type: &ColumnType,
    rng: &mut R,
    now: NaiveDateTime,
) -> Option<Value> {
    let value = match col_type {
        ColumnType::Timestamp => Value::Timestamp(random_timestamp(rng, now)),
        ColumnType::Boolean => Value::Bool(rng.gen()),
        ColumnType::Integer => Value::Integer(rng.gen_range(0..=i64::from(i32::MAX))),
        ColumnType::Float => Value::Real(rng.gen_range(0.0..MAX_FLOAT)),
        ColumnType::Interval => {
            Value::Interval(Duration::from_secs(rng.gen_range(0..=MAX_INTERVAL_SECS)))
        }
        ColumnType::Uuid => Value::Uuid(random_uuid(rng)),
        ColumnType::Text => Value::Text(random_words(rng)),
        ColumnType::Other(_) => return None,
    };
    Some(value)
}

/// A version 4 UUID drawn from the given RNG
pub fn random_uuid<R: Rng>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

fn random_timestamp<R: Rng>(rng: &mut R, now: NaiveDateTime) -> NaiveDateTime {
    let start = now
        .checked_sub_months(Months::new(TIMESTAMP_YEARS_BACK * 12))
        .unwrap_or(NaiveDateTime::MIN);

    let start_ts = start.and_utc().timestamp();
    let end_ts = now.and_utc().timestamp();
    if start_ts >= end_ts {
        return now;
    }

    let ts = rng.gen_range(start_ts..=end_ts);
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or(now)
}

fn random_words<R: Rng>(rng: &mut R) -> String {
    let words: Vec<String> = Words(TEXT_WORDS..TEXT_WORDS + 1).fake_with_rng(rng);
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-06-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_timestamps_stay_within_thirty_years() {
        let mut rng = StdRng::seed_from_u64(42);
        let earliest = now().checked_sub_months(Months::new(360)).unwrap();

        for _ in 0..200 {
            match value_for(&ColumnType::Timestamp, &mut rng, now()) {
                Some(Value::Timestamp(ts)) => assert!(ts >= earliest && ts <= now()),
                other => panic!("Expected timestamp, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_numeric_ranges() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            match value_for(&ColumnType::Float, &mut rng, now()) {
                Some(Value::Real(f)) => assert!((0.0..MAX_FLOAT).contains(&f)),
                other => panic!("Expected float, got {other:?}"),
            }
            match value_for(&ColumnType::Interval, &mut rng, now()) {
                Some(Value::Interval(d)) => assert!(d.as_secs() <= MAX_INTERVAL_SECS),
                other => panic!("Expected interval, got {other:?}"),
            }
            match value_for(&ColumnType::Integer, &mut rng, now()) {
                Some(Value::Integer(i)) => assert!(i >= 0),
                other => panic!("Expected integer, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_text_is_eight_words() {
        let mut rng = StdRng::seed_from_u64(7);
        match value_for(&ColumnType::Text, &mut rng, now()) {
            Some(Value::Text(s)) => assert_eq!(s.split(' ').count(), TEXT_WORDS),
            other => panic!("Expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_uuids_are_v4_and_distinct() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = random_uuid(&mut rng);
        let b = random_uuid(&mut rng);
        assert_eq!(a.get_version_num(), 4);
        assert_ne!(a, b);
    }

    #[test]
    fn test_unsupported_type_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let custom = ColumnType::Other("GEOMETRY".to_string());
        assert_eq!(value_for(&custom, &mut rng, now()), None);
    }

    #[test]
    fn test_same_seed_same_values() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for col_type in [ColumnType::Text, ColumnType::Uuid, ColumnType::Timestamp] {
            assert_eq!(
                value_for(&col_type, &mut a, now()),
                value_for(&col_type, &mut b, now())
            );
        }
    }
}
