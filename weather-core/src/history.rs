//! Historical weather: which days to ask for, and how one day's upstream
//! payload collapses into a single [`DayAggregate`].

use chrono::{DateTime, TimeZone};
use serde_json::Value;
use tracing::warn;

use crate::{
    model::{DayAggregate, Reading, Temperature},
    provider::{DailyRecord, HistoricalPayload, HourlyRecord, WeatherProvider},
};

/// One hourly observation after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySample {
    pub temperature: Option<f64>,
    pub condition: Option<String>,
}

impl From<&HourlyRecord> for HourlySample {
    fn from(record: &HourlyRecord) -> Self {
        Self {
            temperature: record.temp.as_ref().and_then(parse_temperature),
            condition: record.text.as_ref().and_then(literal),
        }
    }
}

/// The `days` calendar days before `reference`, most recent first, as `YYYYMMDD`.
///
/// Only the calendar date of `reference` (in its own time zone) matters.
pub fn past_dates<Tz: TimeZone>(reference: &DateTime<Tz>, days: u32) -> Vec<String> {
    let today = reference.date_naive();

    std::iter::successors(today.pred_opt(), |d| d.pred_opt())
        .take(days as usize)
        .map(|d| d.format("%Y%m%d").to_string())
        .collect()
}

/// Accepts a JSON number or a string starting with a decimal number, so
/// `"12°"` reads as 12. Anything non-finite is rejected.
pub fn parse_temperature(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => numeric_prefix(s.trim_start()).parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|t| t.is_finite())
}

/// Longest leading `[+-]digits[.digits][e[+-]digits]` of `s`, or `""`.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let skip_digits = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut end = skip_digits(start);
    let mut has_digits = end > start;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = skip_digits(end + 1);
        has_digits |= frac_end > end + 1;
        end = frac_end;
    }
    if !has_digits {
        return "";
    }

    // an exponent only counts when digits follow it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_start = end + 1 + usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = skip_digits(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }
    &s[..end]
}

/// A scalar as it was written upstream: strings unquoted, numbers as-is.
fn literal(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Reduce a day's hourly samples: min/max over parsed temperatures and the
/// most frequent condition label.
pub fn reduce_hourly(date: &str, samples: &[HourlySample]) -> DayAggregate {
    let (min, max) = samples
        .iter()
        .filter_map(|s| s.temperature)
        .fold(None, |acc: Option<(f64, f64)>, t| match acc {
            Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
            None => Some((t, t)),
        })
        .map_or((Reading::Unknown, Reading::Unknown), |(lo, hi)| {
            (Reading::measured(lo), Reading::measured(hi))
        });

    DayAggregate {
        date: date.to_owned(),
        dominant_condition: dominant_condition(samples),
        min_temperature: min,
        max_temperature: max,
    }
}

/// Mode of the condition labels. Absent labels form their own bucket and
/// compete like any other. On a tie the label seen first wins.
fn dominant_condition(samples: &[HourlySample]) -> Reading<String> {
    // (label, count) in order of first appearance
    let mut tally: Vec<(Option<&str>, usize)> = Vec::new();
    for sample in samples {
        let label = sample.condition.as_deref();
        match tally.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => tally.push((label, 1)),
        }
    }

    let mut best: Option<(Option<&str>, usize)> = None;
    for (label, count) in tally {
        if best.is_none_or(|(_, max)| count > max) {
            best = Some((label, count));
        }
    }

    match best {
        Some((Some(label), _)) => Reading::Known(label.to_owned()),
        _ => Reading::Unknown,
    }
}

/// Summarize a day from the first daily-summary entry. Its temperatures are
/// passed on as written, not re-parsed.
pub fn from_daily(date: &str, daily: &DailyRecord) -> DayAggregate {
    let condition = [&daily.text_day, &daily.condition]
        .into_iter()
        .flatten()
        .filter_map(literal)
        .find(|t| !t.is_empty());
    let reported = |v: &Option<Value>| v.as_ref().and_then(literal).map(Temperature::Reported);

    DayAggregate {
        date: date.to_owned(),
        dominant_condition: condition.into(),
        min_temperature: reported(&daily.temp_min).into(),
        max_temperature: reported(&daily.temp_max).into(),
    }
}

/// Turn one upstream payload into a record: hourly data first, then the daily
/// summary, else the sentinel.
pub fn aggregate_payload(date: &str, payload: &HistoricalPayload) -> DayAggregate {
    if !payload.status.is_success() {
        warn!(
            date,
            code = %payload.status.code,
            message = payload.status.message.as_deref().unwrap_or("-"),
            "historical weather returned an error status"
        );
        return DayAggregate::unknown(date);
    }

    if let Some(hourly) = payload.weather_hourly.as_deref().filter(|h| !h.is_empty()) {
        let samples: Vec<HourlySample> = hourly.iter().map(HourlySample::from).collect();
        return reduce_hourly(date, &samples);
    }

    if let Some(first) = payload.daily.as_deref().and_then(<[DailyRecord]>::first) {
        return from_daily(date, first);
    }

    warn!(date, "historical weather response has neither hourly nor daily data");
    DayAggregate::unknown(date)
}

/// Fetch and reduce one day. Never fails: any problem yields the sentinel.
pub async fn aggregate_day(
    provider: &dyn WeatherProvider,
    location_id: &str,
    date: &str,
) -> DayAggregate {
    match provider.historical(location_id, date).await {
        Ok(payload) => aggregate_payload(date, &payload),
        Err(e) => {
            warn!(date, error = %e, "historical weather request failed");
            DayAggregate::unknown(date)
        }
    }
}

/// One record per date, in the order given. Dates are fetched one after another.
pub async fn aggregate_days(
    provider: &dyn WeatherProvider,
    location_id: &str,
    dates: &[String],
) -> Vec<DayAggregate> {
    let mut days = Vec::with_capacity(dates.len());
    for date in dates {
        days.push(aggregate_day(provider, location_id, date).await);
    }
    days
}
