//! Parsing and rendering of run times.
//!
//! Timed runs are submitted as `[D.]HH:MM:SS[.fff]` strings and stored as
//! nanoseconds in the run's single value column. Rendering truncates to
//! millisecond precision.

const NANOS_PER_SEC: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;

/// Parse a run time into nanoseconds. Returns `None` for anything that is
/// not a well-formed non-negative duration, including out-of-range minute
/// and second fields and values that would overflow an `i64`.
pub fn parse_run_time(input: &str) -> Option<i64> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let (days, hours_field) = match parts[0].split_once('.') {
        Some((days, hours)) => (digits(days)?, hours),
        None => (0, parts[0]),
    };
    let hours = digits(hours_field)?;
    if days > 0 && hours > 23 {
        return None;
    }
    let minutes = digits(parts[1])?;
    let (seconds_field, frac_field) = match parts[2].split_once('.') {
        Some((seconds, frac)) => (seconds, Some(frac)),
        None => (parts[2], None),
    };
    let seconds = digits(seconds_field)?;
    if minutes > 59 || seconds > 59 {
        return None;
    }
    let frac_nanos = match frac_field {
        Some(frac) => frac_nanos(frac)?,
        None => 0,
    };

    let total_seconds = ((days * 24 + hours) * 60 + minutes) * 60 + seconds;
    i64::try_from(total_seconds)
        .ok()?
        .checked_mul(NANOS_PER_SEC)?
        .checked_add(frac_nanos)
}

/// Render nanoseconds as `[D.]HH:MM:SS.mmm`, truncating below milliseconds.
pub fn format_run_time(nanos: i64) -> String {
    let total_millis = nanos.max(0) / NANOS_PER_MILLI;
    let millis = total_millis % 1_000;
    let total_seconds = total_millis / 1_000;
    let seconds = total_seconds % 60;
    let minutes = total_seconds / 60 % 60;
    let hours = total_seconds / 3_600 % 24;
    let days = total_seconds / 86_400;
    if days > 0 {
        format!("{days}.{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    }
}

fn digits(field: &str) -> Option<u64> {
    if field.is_empty() || field.len() > 7 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

// Fractional seconds, up to nanosecond precision, right-padded: ".1" is
// 100 ms, ".111" is 111 ms.
fn frac_nanos(field: &str) -> Option<i64> {
    if field.is_empty() || field.len() > 9 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut value: i64 = field.parse().ok()?;
    for _ in field.len()..9 {
        value *= 10;
    }
    Some(value)
}
