//! Roll call (chamada) for one class on one Sunday: prefilling the sheet from
//! stored records and turning the sheet into the bulk payload.

use std::sync::LazyLock;
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use crate::api::models::{AttendanceInput, AttendanceRecord, AttendanceStatus, Student};

/// Offering as typed by the user: digits, optional comma, at most two decimals.
static OFFERING_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d*,?\d{0,2}$").expect("static regex"));

/// Counter fields: up to three digits.
static COUNT_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{0,3}$").expect("static regex"));

/// Largest value a counter field can hold.
pub const MAX_COUNT: i64 = 999;

#[derive(Debug, Clone, PartialEq)]
pub struct RollCallEntry {
    pub student_id: String,
    pub name: String,
    pub present: bool,
}

/// Class-wide totals, kept as the text the user typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollCallTotals {
    pub offering: String,
    pub bibles: String,
    pub magazines: String,
    pub visitors: String,
    pub post_call: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalField {
    Offering,
    Bibles,
    Magazines,
    Visitors,
    PostCall,
}

impl RollCallTotals {
    /// Applies an edit. Edits that break the field's input format are
    /// ignored so the field keeps its last valid text.
    pub fn set(&mut self, field: TotalField, value: String) {
        let valid = match field {
            TotalField::Offering => is_valid_offering_input(&value),
            _ => is_valid_count_input(&value),
        };
        if !valid {
            return;
        }
        match field {
            TotalField::Offering => self.offering = value,
            TotalField::Bibles => self.bibles = value,
            TotalField::Magazines => self.magazines = value,
            TotalField::Visitors => self.visitors = value,
            TotalField::PostCall => self.post_call = value,
        }
    }
}

pub fn is_valid_offering_input(input: &str) -> bool {
    OFFERING_INPUT.is_match(input)
}

pub fn is_valid_count_input(input: &str) -> bool {
    COUNT_INPUT.is_match(input)
}

/// `"12,50"` → 12.50. Empty or unparsable text counts as zero.
pub fn parse_offering(input: &str) -> Decimal {
    input
        .trim()
        .replace(',', ".")
        .parse::<Decimal>()
        .unwrap_or(Decimal::ZERO)
}

/// Counter fields: unparsable or negative text counts as zero, anything
/// above [`MAX_COUNT`] as `MAX_COUNT`.
pub fn parse_count(input: &str) -> i64 {
    input.trim().parse::<i64>().unwrap_or(0).clamp(0, MAX_COUNT)
}

fn blank_if_zero(n: i64) -> String {
    if n > 0 { n.to_string() } else { String::new() }
}

/// Builds the sheet for `turma_id`: one entry per active student of the class,
/// ticked when a stored record says present, plus totals summed from the
/// stored records.
pub fn prefill(
    turma_id: &str,
    students: &[Student],
    records: &[AttendanceRecord],
) -> (Vec<RollCallEntry>, RollCallTotals) {
    let entries = students
        .iter()
        .filter(|s| s.turma_id == turma_id && s.ativo)
        .map(|s| RollCallEntry {
            student_id: s.id.clone(),
            name: s.nome_completo.clone(),
            present: records
                .iter()
                .any(|r| r.aluno_id == s.id && r.status == AttendanceStatus::Present),
        })
        .collect();

    let offering: Decimal = records.iter().filter_map(|r| r.oferta).sum();
    let bibles: i64 = records.iter().filter_map(|r| r.biblias_entregues).sum();
    let magazines: i64 = records.iter().filter_map(|r| r.revistas_entregues).sum();
    let count = |status| records.iter().filter(|r| r.status == status).count() as i64;

    let totals = RollCallTotals {
        offering: if offering > Decimal::ZERO {
            let mut v = offering.round_dp(2);
            v.rescale(2);
            v.to_string().replace('.', ",")
        } else {
            String::new()
        },
        bibles: blank_if_zero(bibles),
        magazines: blank_if_zero(magazines),
        visitors: blank_if_zero(count(AttendanceStatus::Visitor)),
        post_call: blank_if_zero(count(AttendanceStatus::PostCall)),
    };
    (entries, totals)
}

/// Turns the sheet into the bulk payload.
///
/// The whole offering is booked on the first present student and the bibles
/// and magazines on the first student, so class totals are never duplicated.
/// Visitors and post-call arrivals become synthetic entries whose ids embed
/// `stamp` to keep them unique across saves.
pub fn build_payload(
    turma_id: &str,
    date: NaiveDate,
    entries: &[RollCallEntry],
    totals: &RollCallTotals,
    stamp: i64,
) -> Vec<AttendanceInput> {
    let offering = parse_offering(&totals.offering);
    let bibles = parse_count(&totals.bibles);
    let magazines = parse_count(&totals.magazines);
    let first_present = entries.iter().position(|e| e.present);

    let input = |aluno_id: String, status| AttendanceInput {
        aluno_id,
        turma_id: turma_id.to_string(),
        data: date,
        status,
        oferta: Decimal::ZERO,
        biblias_entregues: 0,
        revistas_entregues: 0,
    };

    let mut payload: Vec<AttendanceInput> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let status = if entry.present {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Absent
            };
            let mut item = input(entry.student_id.clone(), status);
            if Some(index) == first_present {
                item.oferta = offering;
            }
            if index == 0 {
                item.biblias_entregues = bibles;
                item.revistas_entregues = magazines;
            }
            item
        })
        .collect();

    for i in 0..parse_count(&totals.visitors) {
        payload.push(input(format!("visitante_{stamp}_{i}"), AttendanceStatus::Visitor));
    }
    for i in 0..parse_count(&totals.post_call) {
        payload.push(input(format!("pos_chamada_{stamp}_{i}"), AttendanceStatus::PostCall));
    }
    payload
}
