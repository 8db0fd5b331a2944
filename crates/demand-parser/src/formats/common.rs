use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const HOURS_PER_DAY: f64 = 24.0;

/// Normalises an hour-label cell to an hour in `0..=24`.
///
/// Accepts integers, decimals (truncated), `"HH:MM"`/`"HH"` strings and
/// time-of-day cells. Anything else yields `None` and the row is dropped.
pub(crate) fn normalize_hour(cell: &Data) -> Option<u32> {
    let hour = match cell {
        Data::Int(value) => Some(*value),
        Data::Float(value) if value.is_finite() => Some(value.trunc() as i64),
        Data::String(text) => hour_from_text(text),
        Data::DateTime(value) => {
            let serial = value.as_f64();
            if value.is_duration() {
                Some((serial * HOURS_PER_DAY).round() as i64)
            } else {
                Some(((serial.fract() * HOURS_PER_DAY).round() as i64) % 24)
            }
        }
        Data::DateTimeIso(text) => hour_from_iso(text),
        _ => None,
    }?;

    if (0..=24).contains(&hour) {
        Some(hour as u32)
    } else {
        None
    }
}

fn hour_from_text(text: &str) -> Option<i64> {
    let head = text.trim().split(':').next()?;
    head.trim().parse::<i64>().ok()
}

fn hour_from_iso(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(i64::from(dt.hour()));
    }
    if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f") {
        return Some(i64::from(time.hour()));
    }
    hour_from_text(trimmed)
}

/// Coerces a demand cell to a number; failures become explicit missing values.
pub(crate) fn coerce_demand(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Int(value) => Some(*value as f64),
        Data::Float(value) => Some(*value),
        Data::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

/// Hours 0 and 24 denote the closing midnight, i.e. `base_date + 1 day`.
pub(crate) fn timestamp_for_hour(base_date: NaiveDate, hour: u32) -> Option<NaiveDateTime> {
    let midnight = base_date.and_time(NaiveTime::MIN);
    match hour {
        0 | 24 => midnight.checked_add_signed(Duration::days(1)),
        1..=23 => midnight.checked_add_signed(Duration::hours(i64::from(hour))),
        _ => None,
    }
}
