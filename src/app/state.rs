use std::fmt;
use chrono::{Datelike, Local, NaiveDate};
use iced::Theme;
use iced_aw::date_picker::Date;
use crate::api::ApiClient;
use crate::api::models::{AttendanceRecord, AttendanceRow, Rankings, Revista, Student, Turma, User};
use crate::backup::BackupFile;
use crate::attendance::{RollCallEntry, RollCallTotals};
use crate::config::{self, AppConfig};
use crate::dashboard;
use crate::error::NetworkError;
use crate::forms::{PasswordForm, RevistaForm, StudentFilter, StudentForm, TurmaForm, UserForm};
use crate::router::View;
use crate::session::SessionStore;
use crate::storage::LocalStorage;
use super::scope::ScopeTracker;

/// Subdirectory of the data dir holding the session entries.
pub const STORAGE_DIR: &str = "storage";

pub struct App {
    pub config: AppConfig,
    pub theme: Theme,
    pub session: SessionStore,
    pub api: ApiClient,
    /// View the user asked for; what is rendered comes from `resolve_view`.
    pub requested: View,
    pub scope: ScopeTracker,
    /// Source of the current date; read again on every view change.
    pub clock: fn() -> NaiveDate,
    pub today: NaiveDate,
    pub notice: Option<Notice>,
    pub date_picker_open: DatePickerOpen,
    //
    pub login_email: String,
    pub login_password: String,
    pub login_error: Option<String>,
    pub logging_in: bool,
    //
    pub dashboard_date: NaiveDate,
    pub dashboard_rows: Vec<AttendanceRow>,
    pub dashboard_loading: bool,
    //
    pub report_date: NaiveDate,
    pub report_rows: Vec<AttendanceRow>,
    //
    pub rankings: Rankings,
    pub ranking_tab: RankingTab,
    pub rankings_loading: bool,
    //
    pub turmas: Vec<Turma>,
    pub students: Vec<Student>,
    pub users: Vec<User>,
    // Chamada
    pub attendance_turma: Option<Turma>,
    pub attendance_date: NaiveDate,
    pub attendance_records: Vec<AttendanceRecord>,
    pub roll_call: Vec<RollCallEntry>,
    pub roll_totals: RollCallTotals,
    /// Magazine of the selected class, for the lesson of the day.
    pub attendance_revista: Option<Revista>,
    /// Set once the user touches the sheet; later loads keep their edits.
    pub roll_call_edited: bool,
    pub attendance_saving: bool,
    // Alunos
    pub student_filter: StudentFilter,
    pub student_form: Option<StudentForm>,
    pub transfer: Option<Transfer>,
    // Turmas
    pub turma_form: Option<TurmaForm>,
    // Usuários
    pub user_form: Option<UserForm>,
    // Revistas
    pub revistas: Vec<Revista>,
    pub revistas_loading: bool,
    pub revista_form: Option<RevistaForm>,
    // Backup
    pub backup_busy: bool,
    /// Backup file read from disk, waiting for confirmation.
    pub pending_restore: Option<BackupFile>,
    //
    pub password_form: PasswordForm,
    pub pending_delete: Option<DeleteTarget>,
}

impl App {
    pub fn with_parts(config: AppConfig, api: ApiClient, clock: fn() -> NaiveDate) -> Self {
        let today = clock();
        let theme = config::load_theme(&config.data_dir).unwrap_or(Theme::Light);
        let storage = LocalStorage::new(config.data_dir.join(STORAGE_DIR));
        Self {
            theme,
            session: SessionStore::new(storage),
            api,
            requested: View::Home,
            scope: ScopeTracker::new(View::Home),
            clock,
            today,
            notice: None,
            date_picker_open: DatePickerOpen::None,
            login_email: String::new(),
            login_password: String::new(),
            login_error: None,
            logging_in: false,
            dashboard_date: dashboard::last_sunday(today),
            dashboard_rows: Vec::new(),
            dashboard_loading: false,
            report_date: dashboard::last_sunday(today),
            report_rows: Vec::new(),
            rankings: Rankings::default(),
            ranking_tab: RankingTab::default(),
            rankings_loading: false,
            turmas: Vec::new(),
            students: Vec::new(),
            users: Vec::new(),
            attendance_turma: None,
            attendance_date: dashboard::upcoming_sunday(today),
            attendance_records: Vec::new(),
            roll_call: Vec::new(),
            roll_totals: RollCallTotals::default(),
            attendance_revista: None,
            roll_call_edited: false,
            attendance_saving: false,
            student_filter: StudentFilter::default(),
            student_form: None,
            transfer: None,
            turma_form: None,
            user_form: None,
            revistas: Vec::new(),
            revistas_loading: false,
            revista_form: None,
            backup_busy: false,
            pending_restore: None,
            password_form: PasswordForm::default(),
            pending_delete: None,
            config,
        }
    }

    pub fn local_today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Classes the current user may take attendance for.
    pub fn visible_turmas(&self) -> Vec<Turma> {
        self.session.visible_classes(&self.turmas)
    }

    pub fn turma_name(&self, turma_id: &str) -> String {
        self.turmas
            .iter()
            .find(|t| t.id == turma_id)
            .map(|t| t.nome.clone())
            .unwrap_or_else(|| "Sem turma".to_string())
    }

    /// Drops everything fetched for the previous session.
    pub fn clear_session_data(&mut self) {
        self.dashboard_rows.clear();
        self.report_rows.clear();
        self.rankings = Rankings::default();
        self.turmas.clear();
        self.students.clear();
        self.users.clear();
        self.attendance_turma = None;
        self.attendance_records.clear();
        self.roll_call.clear();
        self.roll_totals = RollCallTotals::default();
        self.attendance_revista = None;
        self.roll_call_edited = false;
        self.attendance_saving = false;
        self.student_filter = StudentFilter::default();
        self.student_form = None;
        self.transfer = None;
        self.turma_form = None;
        self.user_form = None;
        self.revistas.clear();
        self.revista_form = None;
        self.backup_busy = false;
        self.pending_restore = None;
        self.password_form = PasswordForm::default();
        self.pending_delete = None;
        self.notice = None;
        self.date_picker_open = DatePickerOpen::None;
    }
}

/// Status line shown above the current screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), is_error: false }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), is_error: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePickerOpen {
    None,
    Dashboard,
    Reports,
    Attendance,
    StudentBirth,
    /// Date of the n-th lesson in the magazine form.
    Lesson(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingTab {
    #[default]
    Students,
    Teachers,
    Classes,
}

impl RankingTab {
    pub const ALL: &'static [RankingTab] =
        &[RankingTab::Students, RankingTab::Teachers, RankingTab::Classes];
}

impl fmt::Display for RankingTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match self {
            RankingTab::Students => "Alunos",
            RankingTab::Teachers => "Professores",
            RankingTab::Classes => "Turmas",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub student: Student,
    pub target: Option<Turma>,
}

/// Entity awaiting delete confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    Student { id: String, name: String },
    Turma { id: String, name: String },
    User { id: String, name: String },
    Revista { id: String, name: String },
}

impl DeleteTarget {
    pub fn name(&self) -> &str {
        match self {
            DeleteTarget::Student { name, .. }
            | DeleteTarget::Turma { name, .. }
            | DeleteTarget::User { name, .. }
            | DeleteTarget::Revista { name, .. } => name,
        }
    }
}

/// Entry of the class filter pick list; `id == None` means every class.
#[derive(Debug, Clone, PartialEq)]
pub struct TurmaChoice {
    pub id: Option<String>,
    pub label: String,
}

impl TurmaChoice {
    pub fn all() -> Self {
        Self { id: None, label: "Todas as turmas".to_string() }
    }
}

impl From<&Turma> for TurmaChoice {
    fn from(turma: &Turma) -> Self {
        Self { id: Some(turma.id.clone()), label: turma.nome.clone() }
    }
}

impl fmt::Display for TurmaChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Picker date to calendar date; `None` for an impossible day.
pub fn from_picker(date: Date) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year, date.month, date.day)
}

pub fn to_picker(date: NaiveDate) -> Date {
    Date {
        year: date.year(),
        month: date.month(),
        day: date.day(),
    }
}

/// `dd/mm/yyyy`, as dates are shown everywhere in the UI.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Failed loads only reach the log; the screen keeps its previous data.
pub fn log_load_error(what: &str, err: &NetworkError) {
    tracing::warn!(what, error = %err, "failed to load data");
}
