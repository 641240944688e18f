//! Request and response schemas of the EBD backend.
//!
//! Wire names are the backend's Portuguese field names; the Rust side uses
//! English names through `#[serde(rename)]`.

use std::collections::BTreeMap;
use std::fmt;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// User role as sent in the `tipo` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "moderador")]
    Moderator,
    /// Any unrecognised role decodes as a teacher.
    #[default]
    #[serde(rename = "professor")]
    #[serde(other)]
    Teacher,
}

impl Role {
    pub const ALL: &'static [Role] = &[Role::Admin, Role::Moderator, Role::Teacher];

    /// Admins and moderators may open the administrative screens.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderador",
            Role::Teacher => "professor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match self {
            Role::Admin => "Administrador",
            Role::Moderator => "Moderador",
            Role::Teacher => "Professor",
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub senha: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub nome: String,
    #[serde(default)]
    pub email: String,
    pub tipo: Role,
    #[serde(default)]
    pub turmas_permitidas: Vec<String>,
}

/// One row of `GET reports/dashboard`: a class's numbers for one Sunday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRow {
    #[serde(rename = "turma_id")]
    pub class_id: String,
    #[serde(rename = "turma_nome")]
    pub class_name: String,
    #[serde(rename = "data", default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "matriculados")]
    pub enrolled: i64,
    #[serde(rename = "presentes")]
    pub present: i64,
    #[serde(rename = "ausentes", default)]
    pub absent: i64,
    #[serde(rename = "visitantes", default)]
    pub visitors: i64,
    #[serde(rename = "pos_chamada", default)]
    pub post_call: i64,
    #[serde(rename = "total_ofertas", with = "rust_decimal::serde::float")]
    pub offerings_total: Decimal,
    #[serde(rename = "total_biblias", default)]
    pub bibles: i64,
    #[serde(rename = "total_revistas", default)]
    pub magazines: i64,
}

/// Student or teacher entry of the attendance rankings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonRanking {
    #[serde(rename = "aluno_id")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "turma", default)]
    pub class_name: Option<String>,
    #[serde(rename = "total_presencas", default)]
    pub total_presences: i64,
    #[serde(rename = "domingos_presentes", default)]
    pub sundays_present: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassRanking {
    #[serde(rename = "turma_id")]
    pub class_id: String,
    #[serde(rename = "turma_nome")]
    pub class_name: String,
    #[serde(rename = "matriculados", default)]
    pub enrolled: i64,
    #[serde(rename = "media_presencas", default)]
    pub average_presences: f64,
    #[serde(rename = "percentual_frequencia", default)]
    pub attendance_percent: f64,
    #[serde(rename = "domingos_com_dados", default)]
    pub sundays_with_data: i64,
}

/// The three ranking categories, each fetched on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rankings {
    pub students: Vec<PersonRanking>,
    pub teachers: Vec<PersonRanking>,
    pub classes: Vec<ClassRanking>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turma {
    pub id: String,
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default = "active_by_default")]
    pub ativa: bool,
}

impl fmt::Display for Turma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nome)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurmaInput {
    pub nome: String,
    pub descricao: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub nome_completo: String,
    pub data_nascimento: NaiveDate,
    #[serde(default)]
    pub contato: String,
    pub turma_id: String,
    #[serde(default = "active_by_default")]
    pub ativo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentInput {
    pub nome_completo: String,
    pub data_nascimento: NaiveDate,
    pub contato: String,
    pub turma_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub nome: String,
    pub email: String,
    pub tipo: Role,
    #[serde(default)]
    pub turmas_permitidas: Vec<String>,
    #[serde(default = "active_by_default")]
    pub ativo: bool,
}

/// Body of user create/update; `senha` is left out on updates that keep the
/// current password.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInput {
    pub nome: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub senha: Option<String>,
    pub tipo: Role,
    pub turmas_permitidas: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub user_id: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "presente")]
    Present,
    #[serde(rename = "ausente")]
    Absent,
    #[serde(rename = "visitante")]
    Visitor,
    #[serde(rename = "pos_chamada")]
    PostCall,
}

/// Stored attendance record, as returned by `GET attendance`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default)]
    pub id: String,
    pub aluno_id: String,
    pub turma_id: String,
    pub data: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub oferta: Option<Decimal>,
    #[serde(default)]
    pub biblias_entregues: Option<i64>,
    #[serde(default)]
    pub revistas_entregues: Option<i64>,
}

/// One entry of the bulk roll-call payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceInput {
    pub aluno_id: String,
    pub turma_id: String,
    pub data: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub oferta: Decimal,
    pub biblias_entregues: i64,
    pub revistas_entregues: i64,
}

/// `{"message": ...}` acknowledgement used by deletes, transfers and bulk saves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: String,
}

/// One lesson of a quarterly magazine, taught on `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Licao {
    pub titulo: String,
    pub data: NaiveDate,
}

/// Quarterly magazine (revista) followed by one or more classes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Revista {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub tema: String,
    #[serde(default)]
    pub turma_ids: Vec<String>,
    #[serde(default)]
    pub licoes: Vec<Licao>,
    #[serde(default = "active_by_default")]
    pub ativa: bool,
    /// ISO timestamp as stored by the backend.
    #[serde(default)]
    pub criada_em: Option<String>,
}

impl Revista {
    /// Lesson scheduled for `date`, with its 1-based number.
    pub fn lesson_on(&self, date: NaiveDate) -> Option<(usize, &Licao)> {
        self.licoes
            .iter()
            .enumerate()
            .find(|(_, licao)| licao.data == date)
            .map(|(index, licao)| (index + 1, licao))
    }

    pub fn created_on(&self) -> Option<NaiveDate> {
        self.criada_em.as_deref()?.get(..10)?.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevistaInput {
    pub tema: String,
    pub turma_ids: Vec<String>,
    pub licoes: Vec<Licao>,
}

/// Record counts per collection, as reported by `backup/generate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct BackupSummary {
    #[serde(default)]
    pub users: i64,
    #[serde(default)]
    pub turmas: i64,
    #[serde(default)]
    pub students: i64,
    #[serde(default)]
    pub attendance: i64,
    #[serde(default)]
    pub revistas: i64,
}

/// Answer of `GET backup/generate`; `backup` is the document to save as is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedBackup {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub backup: Option<serde_json::Value>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size_mb: Option<f64>,
    #[serde(default)]
    pub summary: BackupSummary,
}

/// Answer of `POST backup/restore`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RestoreOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub restore_summary: BTreeMap<String, i64>,
    #[serde(default)]
    pub total_restored: i64,
}

fn active_by_default() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attendance_row_decodes_backend_report() {
        let row: AttendanceRow = serde_json::from_value(json!({
            "turma_nome": "Jovens",
            "turma_id": "t-1",
            "data": "2025-03-02",
            "matriculados": 20,
            "presentes": 18,
            "ausentes": 2,
            "visitantes": 1,
            "pos_chamada": 0,
            "total_ofertas": 42.5,
            "total_biblias": 3,
            "total_revistas": 4
        }))
        .unwrap();

        assert_eq!(row.class_name, "Jovens");
        assert_eq!(row.enrolled, 20);
        assert_eq!(row.present, 18);
        assert_eq!(row.offerings_total, Decimal::new(425, 1));
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2025, 3, 2));
    }

    #[test]
    fn unknown_role_decodes_as_teacher() {
        let role: Role = serde_json::from_value(json!("secretaria")).unwrap();
        assert_eq!(role, Role::Teacher);
        let role: Role = serde_json::from_value(json!("moderador")).unwrap();
        assert_eq!(role, Role::Moderator);
        assert!(role.is_admin());
        assert!(!Role::Teacher.is_admin());
    }

    #[test]
    fn user_input_omits_empty_password() {
        let input = UserInput {
            nome: "Ana".into(),
            email: "ana@ebd.org".into(),
            senha: None,
            tipo: Role::Teacher,
            turmas_permitidas: vec!["t-1".into()],
        };
        let value = serde_json::to_value(&input).unwrap();
        assert!(value.get("senha").is_none());
        assert_eq!(value["tipo"], "professor");
    }

    #[test]
    fn revista_decodes_lessons_and_finds_the_lesson_of_a_day() {
        let revista: Revista = serde_json::from_value(json!({
            "id": "r-1",
            "tema": "A Liberdade em Cristo",
            "turma_ids": ["t-1"],
            "licoes": [
                { "titulo": "Gálatas: a carta da liberdade cristã", "data": "2025-07-06" },
                { "titulo": "O falso evangelho", "data": "2025-07-13" }
            ],
            "criada_em": "2025-06-30T14:02:11.123456"
        }))
        .unwrap();

        let sunday = NaiveDate::from_ymd_opt(2025, 7, 13).unwrap();
        let (number, licao) = revista.lesson_on(sunday).unwrap();
        assert_eq!(number, 2);
        assert_eq!(licao.titulo, "O falso evangelho");
        assert!(revista.lesson_on(NaiveDate::from_ymd_opt(2025, 7, 20).unwrap()).is_none());
        assert_eq!(revista.created_on(), NaiveDate::from_ymd_opt(2025, 6, 30));
        assert!(revista.ativa);
    }

    #[test]
    fn restore_outcome_tolerates_missing_summary() {
        let outcome: RestoreOutcome =
            serde_json::from_value(json!({ "success": false, "message": "Formato inválido" }))
                .unwrap();
        assert!(!outcome.success);
        assert!(outcome.restore_summary.is_empty());
        assert_eq!(outcome.total_restored, 0);
    }

    #[test]
    fn attendance_record_tolerates_null_offering() {
        let record: AttendanceRecord = serde_json::from_value(json!({
            "id": "a-1",
            "aluno_id": "s-1",
            "turma_id": "t-1",
            "data": "2025-03-02",
            "status": "pos_chamada",
            "oferta": null
        }))
        .unwrap();
        assert_eq!(record.status, AttendanceStatus::PostCall);
        assert_eq!(record.oferta, None);
        assert_eq!(record.biblias_entregues, None);
    }
}
