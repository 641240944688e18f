//! Dashboard aggregates over the per-class attendance rows of one Sunday.
//!
//! Everything here is a pure function of the row slice: the rows come from
//! the backend as-is and are neither validated nor clamped.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use crate::api::models::AttendanceRow;

pub fn total_enrolled(rows: &[AttendanceRow]) -> i64 {
    rows.iter().map(|r| r.enrolled).sum()
}

pub fn total_present(rows: &[AttendanceRow]) -> i64 {
    rows.iter().map(|r| r.present).sum()
}

pub fn total_offerings(rows: &[AttendanceRow]) -> Decimal {
    rows.iter().map(|r| r.offerings_total).sum()
}

/// Present over enrolled as a percentage with one decimal; `0.0` when nobody
/// is enrolled.
pub fn attendance_rate(rows: &[AttendanceRow]) -> f64 {
    percentage(total_present(rows), total_enrolled(rows))
}

pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Row with the highest present/enrolled ratio among rows with enrolled > 0.
/// On a tie the earlier row wins.
pub fn best_attendance_class(rows: &[AttendanceRow]) -> Option<&AttendanceRow> {
    rows.iter()
        .filter(|r| r.enrolled > 0)
        .fold(None, |best: Option<&AttendanceRow>, row| match best {
            // row ratio <= best ratio, cross-multiplied (denominators are positive)
            Some(b) if (row.present as i128) * (b.enrolled as i128)
                <= (b.present as i128) * (row.enrolled as i128) => Some(b),
            _ => Some(row),
        })
}

/// Row with the highest offering total. On a tie the earlier row wins.
pub fn top_offering_class(rows: &[AttendanceRow]) -> Option<&AttendanceRow> {
    rows.iter().fold(None, |best: Option<&AttendanceRow>, row| match best {
        Some(b) if row.offerings_total <= b.offerings_total => Some(b),
        _ => Some(row),
    })
}

/// All dashboard figures, recomputed from scratch on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary<'a> {
    pub total_enrolled: i64,
    pub total_present: i64,
    pub attendance_rate: f64,
    pub total_offerings: Decimal,
    pub best_attendance_class: Option<&'a AttendanceRow>,
    pub top_offering_class: Option<&'a AttendanceRow>,
}

impl<'a> Summary<'a> {
    pub fn of(rows: &'a [AttendanceRow]) -> Self {
        Self {
            total_enrolled: total_enrolled(rows),
            total_present: total_present(rows),
            attendance_rate: attendance_rate(rows),
            total_offerings: total_offerings(rows),
            best_attendance_class: best_attendance_class(rows),
            top_offering_class: top_offering_class(rows),
        }
    }
}

pub fn is_sunday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

/// `today` if it is a Sunday, otherwise the previous Sunday. Default date of
/// the dashboard and the reports.
pub fn last_sunday(today: NaiveDate) -> NaiveDate {
    let back = today.weekday().num_days_from_sunday() as i64;
    today - Duration::days(back)
}

/// `today` if it is a Sunday, otherwise the next Sunday. Default date of the
/// roll call.
pub fn upcoming_sunday(today: NaiveDate) -> NaiveDate {
    let days_from_sunday = today.weekday().num_days_from_sunday() as i64;
    if days_from_sunday == 0 {
        today
    } else {
        today + Duration::days(7 - days_from_sunday)
    }
}

/// Brazilian currency formatting, e.g. `R$ 1234,50`.
pub fn format_brl(amount: Decimal) -> String {
    let mut cents = amount.round_dp(2);
    cents.rescale(2);
    format!("R$ {}", cents.to_string().replace('.', ","))
}
