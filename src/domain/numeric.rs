use chrono::Utc;

/// Percentage change from `old_value` to `new_value`.
///
/// Returns 0 when `old_value` is 0 (the change is undefined), rounds to 2
/// decimal places and never reports a drop below -100%.
pub fn percentage_change(old_value: f64, new_value: f64) -> f64 {
    if old_value == 0.0 {
        return 0.0;
    }

    let change = if new_value > old_value {
        ((new_value - old_value) / old_value) * 100.0
    } else if old_value > new_value {
        -(((old_value - new_value) / old_value) * 100.0)
    } else {
        0.0
    };

    round_dp(change.max(-100.0), 2)
}

/// Rounds a value to the given number of decimal places.
pub fn round_dp(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn seconds_to_ms(seconds: i64) -> i64 {
    seconds * 1000
}

pub fn ms_to_seconds(milliseconds: i64) -> i64 {
    milliseconds / 1000
}

pub fn add_minutes(timestamp_ms: i64, minutes: i64) -> i64 {
    timestamp_ms + seconds_to_ms(60) * minutes
}

pub fn subtract_minutes(timestamp_ms: i64, minutes: i64) -> i64 {
    timestamp_ms - seconds_to_ms(60) * minutes
}
