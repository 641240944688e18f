use std::future::Future;
use chrono::Local;
use iced::Task;
use tokio::task;
use crate::api::ApiClient;
use crate::api::models::{RestoreOutcome, Role};
use crate::attendance;
use crate::backup::{self, BackupFile};
use crate::dashboard;
use crate::config::{self, AppConfig};
use crate::error::{BackupError, NetworkError};
use crate::forms::{RevistaForm, StudentForm, TurmaForm, UserForm};
use crate::router::{View, resolve_view};
use crate::session::SessionStore;
use super::scope::FetchScope;
use super::state::{DatePickerOpen, DeleteTarget, Notice, Transfer, from_picker, log_load_error};
use super::{App, Message, Mutation};

impl App {
    pub fn new(config: AppConfig, api: ApiClient) -> (Self, Task<Message>) {
        let mut app = Self::with_parts(config, api, Self::local_today);
        let task = app.boot();
        (app, task)
    }

    /// Restores the persisted session and loads the first screen.
    pub fn boot(&mut self) -> Task<Message> {
        match self.session.restore().map(|s| s.token.clone()) {
            Some(token) => {
                self.api.set_token(Some(token));
                self.requested = View::Dashboard;
            }
            None => {
                self.api.set_token(None);
                self.requested = View::Home;
            }
        }
        self.enter_requested()
    }

    /// The view that is actually rendered.
    pub fn effective_view(&self) -> View {
        resolve_view(self.requested, self.session.is_authenticated(), self.session.role())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LoginEmailChanged(v) => {
                self.login_email = v;
                Task::none()
            }
            Message::LoginPasswordChanged(v) => {
                self.login_password = v;
                Task::none()
            }
            Message::LoginPressed => {
                if self.logging_in {
                    return Task::none();
                }
                let email = self.login_email.trim().to_string();
                if email.is_empty() || self.login_password.is_empty() {
                    self.login_error = Some("Preencha email e senha".to_string());
                    return Task::none();
                }
                self.logging_in = true;
                self.login_error = None;
                let api = self.api.clone();
                let password = self.login_password.clone();
                Task::perform(
                    async move { SessionStore::authenticate(&api, &email, &password).await },
                    Message::LoginFinished,
                )
            }
            Message::LoginFinished(result) => {
                self.logging_in = false;
                let established = result
                    .and_then(|session| self.session.establish(session).map(|s| s.token.clone()));
                match established {
                    Ok(token) => {
                        self.api.set_token(Some(token));
                        self.login_password.clear();
                        self.login_error = None;
                        self.requested = View::Dashboard;
                        self.enter_requested()
                    }
                    Err(e) => {
                        self.login_error = Some(e.to_string());
                        Task::none()
                    }
                }
            }
            Message::Logout => {
                let previous = self.session.logout();
                self.api.set_token(None);
                self.clear_session_data();
                self.requested = View::Home;
                let enter = self.enter_requested();

                let notify = match previous {
                    Some(session) => {
                        let api = self.api.clone();
                        Task::perform(
                            async move { api.logout(&session.token).await.map(|_| ()) },
                            Message::LogoutSent,
                        )
                    }
                    None => Task::none(),
                };
                Task::batch([enter, notify])
            }
            Message::LogoutSent(result) => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "backend logout failed, local session already cleared");
                }
                Task::none()
            }
            Message::Navigate(view) => {
                self.requested = view;
                self.notice = None;
                self.enter_requested()
            }
            Message::ThemeSelected(name) => {
                if let Some(theme) = config::theme_from_str(name) {
                    if let Err(e) = config::save_theme(&self.config.data_dir, &theme) {
                        tracing::error!(error = %e, "failed to save preferences");
                    }
                    self.theme = theme;
                }
                Task::none()
            }
            Message::OpenDatePicker(target) => {
                self.date_picker_open = target;
                Task::none()
            }
            Message::CancelDatePicker => {
                self.date_picker_open = DatePickerOpen::None;
                Task::none()
            }
            Message::SubmitDate(picked) => {
                let target = std::mem::replace(&mut self.date_picker_open, DatePickerOpen::None);
                let Some(date) = from_picker(picked) else {
                    tracing::warn!(?picked, "date picker returned an invalid date");
                    return Task::none();
                };
                match target {
                    DatePickerOpen::Dashboard => {
                        self.dashboard_date = date;
                        self.load_dashboard()
                    }
                    DatePickerOpen::Reports => {
                        self.report_date = date;
                        self.load_reports()
                    }
                    DatePickerOpen::Attendance => {
                        self.attendance_date = date;
                        self.attendance_records.clear();
                        self.reset_roll_call();
                        self.load_attendance_records()
                    }
                    DatePickerOpen::StudentBirth => {
                        if let Some(form) = &mut self.student_form {
                            form.data_nascimento = date;
                        }
                        Task::none()
                    }
                    DatePickerOpen::Lesson(index) => {
                        if let Some(lesson) = self.revista_form.as_mut().and_then(|f| f.licoes.get_mut(index)) {
                            lesson.data = date;
                        }
                        Task::none()
                    }
                    DatePickerOpen::None => Task::none(),
                }
            }
            Message::DashboardLoaded(scope, date, result) => {
                if !self.accepts(scope, "dashboard") || date != self.dashboard_date {
                    return Task::none();
                }
                self.dashboard_loading = false;
                match result {
                    Ok(rows) => {
                        tracing::debug!(%date, rows = rows.len(), "dashboard loaded");
                        self.dashboard_rows = rows;
                    }
                    Err(e) => log_load_error("dashboard", &e),
                }
                Task::none()
            }
            Message::ReportsLoaded(scope, date, result) => {
                if !self.accepts(scope, "reports") || date != self.report_date {
                    return Task::none();
                }
                match result {
                    Ok(rows) => self.report_rows = rows,
                    Err(e) => log_load_error("reports", &e),
                }
                Task::none()
            }
            Message::RankingsLoaded(scope, result) => {
                if !self.accepts(scope, "rankings") {
                    return Task::none();
                }
                self.rankings_loading = false;
                match result {
                    Ok(rankings) => self.rankings = rankings,
                    Err(e) => log_load_error("rankings", &e),
                }
                Task::none()
            }
            Message::TurmasLoaded(scope, result) => {
                if !self.accepts(scope, "turmas") {
                    return Task::none();
                }
                match result {
                    Ok(turmas) => {
                        self.turmas = turmas;
                        if scope.view == View::Attendance && self.attendance_turma.is_none() {
                            // a teacher with a single class gets it preselected
                            if let [only] = self.visible_turmas().as_slice() {
                                return self.update(Message::AttendanceTurmaSelected(only.clone()));
                            }
                        }
                    }
                    Err(e) => log_load_error("turmas", &e),
                }
                Task::none()
            }
            Message::StudentsLoaded(scope, result) => {
                if !self.accepts(scope, "students") {
                    return Task::none();
                }
                match result {
                    Ok(students) => {
                        self.students = students;
                        self.refresh_roll_call();
                    }
                    Err(e) => log_load_error("students", &e),
                }
                Task::none()
            }
            Message::UsersLoaded(scope, result) => {
                if !self.accepts(scope, "users") {
                    return Task::none();
                }
                match result {
                    Ok(users) => self.users = users,
                    Err(e) => log_load_error("users", &e),
                }
                Task::none()
            }
            Message::AttendanceLoaded { scope, turma_id, date, result } => {
                let selected = self.attendance_turma.as_ref().is_some_and(|t| t.id == turma_id)
                    && self.attendance_date == date;
                if !self.accepts(scope, "attendance") || !selected {
                    return Task::none();
                }
                match result {
                    Ok(records) => {
                        self.attendance_records = records;
                        self.refresh_roll_call();
                    }
                    Err(e) => log_load_error("attendance", &e),
                }
                Task::none()
            }
            Message::RevistasLoaded(scope, result) => {
                if !self.accepts(scope, "revistas") {
                    return Task::none();
                }
                self.revistas_loading = false;
                match result {
                    Ok(revistas) => self.revistas = revistas,
                    Err(e) => log_load_error("revistas", &e),
                }
                Task::none()
            }
            Message::AttendanceRevistaLoaded { scope, turma_id, result } => {
                let selected = self.attendance_turma.as_ref().is_some_and(|t| t.id == turma_id);
                if !self.accepts(scope, "class magazine") || !selected {
                    return Task::none();
                }
                self.attendance_revista = result.unwrap_or_else(|e| {
                    log_load_error("class magazine", &e);
                    None
                });
                Task::none()
            }
            Message::RefreshDashboard => self.load_dashboard(),
            Message::RankingTabSelected(tab) => {
                self.ranking_tab = tab;
                Task::none()
            }
            Message::AttendanceTurmaSelected(turma) => {
                self.attendance_turma = Some(turma);
                self.attendance_records.clear();
                self.attendance_revista = None;
                self.reset_roll_call();
                Task::batch([self.load_attendance_records(), self.load_attendance_revista()])
            }
            Message::PresenceToggled(index, present) => {
                if let Some(entry) = self.roll_call.get_mut(index) {
                    entry.present = present;
                    self.roll_call_edited = true;
                }
                Task::none()
            }
            Message::TotalChanged(field, value) => {
                let before = self.roll_totals.clone();
                self.roll_totals.set(field, value);
                self.roll_call_edited |= self.roll_totals != before;
                Task::none()
            }
            Message::SaveAttendance => self.save_attendance(),
            Message::StudentSearchChanged(v) => {
                self.student_filter.search_input = v;
                Task::none()
            }
            Message::StudentSearchApplied => {
                self.student_filter.apply_search();
                Task::none()
            }
            Message::StudentTurmaFilterSelected(choice) => {
                self.student_filter.turma_id = choice.id;
                Task::none()
            }
            Message::StudentStatusFilterSelected(status) => {
                self.student_filter.status = status;
                Task::none()
            }
            Message::NewStudent => {
                self.student_form = Some(StudentForm::new(self.today));
                Task::none()
            }
            Message::EditStudent(student) => {
                self.student_form = Some(StudentForm::edit(&student));
                Task::none()
            }
            Message::StudentNameChanged(v) => {
                if let Some(form) = &mut self.student_form {
                    form.nome_completo = v;
                }
                Task::none()
            }
            Message::StudentContactChanged(v) => {
                if let Some(form) = &mut self.student_form {
                    form.contato = v;
                }
                Task::none()
            }
            Message::StudentTurmaSelected(turma) => {
                if let Some(form) = &mut self.student_form {
                    form.turma_id = Some(turma.id);
                }
                Task::none()
            }
            Message::SubmitStudent => {
                let Some(form) = &self.student_form else {
                    return Task::none();
                };
                let input = match form.to_input() {
                    Ok(input) => input,
                    Err(msg) => return self.fail(msg),
                };
                let api = self.api.clone();
                match form.editing.clone() {
                    Some(id) => self.mutate(Mutation::SaveStudent, async move {
                        api.update_student(&id, &input).await
                    }),
                    None => self.mutate(Mutation::SaveStudent, async move {
                        api.create_student(&input).await
                    }),
                }
            }
            Message::CancelStudentForm => {
                self.student_form = None;
                self.date_picker_open = DatePickerOpen::None;
                Task::none()
            }
            Message::StartTransfer(student) => {
                self.transfer = Some(Transfer { student, target: None });
                Task::none()
            }
            Message::TransferTargetSelected(turma) => {
                if let Some(transfer) = &mut self.transfer {
                    transfer.target = Some(turma);
                }
                Task::none()
            }
            Message::ConfirmTransfer => {
                let Some(Transfer { student, target: Some(target) }) = &self.transfer else {
                    return self.fail("Selecione a turma de destino");
                };
                if target.id == student.turma_id {
                    return self.fail("O aluno já está nesta turma");
                }
                let api = self.api.clone();
                let (student_id, target_id) = (student.id.clone(), target.id.clone());
                self.mutate(Mutation::TransferStudent, async move {
                    api.transfer_student(&student_id, &target_id).await
                })
            }
            Message::CancelTransfer => {
                self.transfer = None;
                Task::none()
            }
            Message::NewTurma => {
                self.turma_form = Some(TurmaForm::default());
                Task::none()
            }
            Message::EditTurma(turma) => {
                self.turma_form = Some(TurmaForm::edit(&turma));
                Task::none()
            }
            Message::TurmaNameChanged(v) => {
                if let Some(form) = &mut self.turma_form {
                    form.nome = v;
                }
                Task::none()
            }
            Message::TurmaDescriptionChanged(v) => {
                if let Some(form) = &mut self.turma_form {
                    form.descricao = v;
                }
                Task::none()
            }
            Message::SubmitTurma => {
                let Some(form) = &self.turma_form else {
                    return Task::none();
                };
                let input = match form.to_input() {
                    Ok(input) => input,
                    Err(msg) => return self.fail(msg),
                };
                let api = self.api.clone();
                match form.editing.clone() {
                    Some(id) => self.mutate(Mutation::SaveTurma, async move {
                        api.update_turma(&id, &input).await
                    }),
                    None => self.mutate(Mutation::SaveTurma, async move {
                        api.create_turma(&input).await
                    }),
                }
            }
            Message::CancelTurmaForm => {
                self.turma_form = None;
                Task::none()
            }
            Message::NewUser => {
                self.user_form = Some(UserForm::default());
                Task::none()
            }
            Message::EditUser(user) => {
                self.user_form = Some(UserForm::edit(&user));
                Task::none()
            }
            Message::UserNameChanged(v) => {
                if let Some(form) = &mut self.user_form {
                    form.nome = v;
                }
                Task::none()
            }
            Message::UserEmailChanged(v) => {
                if let Some(form) = &mut self.user_form {
                    form.email = v;
                }
                Task::none()
            }
            Message::UserPasswordChanged(v) => {
                if let Some(form) = &mut self.user_form {
                    form.senha = v;
                }
                Task::none()
            }
            Message::UserRoleSelected(role) => {
                if let Some(form) = &mut self.user_form {
                    form.tipo = role;
                }
                Task::none()
            }
            Message::UserTurmaToggled(turma_id) => {
                if let Some(form) = &mut self.user_form {
                    form.toggle_turma(&turma_id);
                }
                Task::none()
            }
            Message::SubmitUser => {
                let Some(form) = &self.user_form else {
                    return Task::none();
                };
                let input = match form.to_input() {
                    Ok(input) => input,
                    Err(msg) => return self.fail(msg),
                };
                let api = self.api.clone();
                match form.editing.clone() {
                    Some(id) => self.mutate(Mutation::UpdateUser, async move {
                        api.update_user(&id, &input).await
                    }),
                    None => self.mutate(Mutation::CreateUser, async move {
                        api.create_user(&input).await
                    }),
                }
            }
            Message::CancelUserForm => {
                self.user_form = None;
                Task::none()
            }
            Message::CurrentPasswordChanged(v) => {
                self.password_form.current = v;
                Task::none()
            }
            Message::NewPasswordChanged(v) => {
                self.password_form.new = v;
                Task::none()
            }
            Message::ConfirmPasswordChanged(v) => {
                self.password_form.confirm = v;
                Task::none()
            }
            Message::SubmitPasswordChange => {
                let Some(session) = self.session.current() else {
                    return Task::none();
                };
                let request = match self.password_form.to_request(&session.user.id) {
                    Ok(request) => request,
                    Err(msg) => return self.fail(msg),
                };
                let api = self.api.clone();
                self.mutate(Mutation::ChangePassword, async move {
                    api.change_password(&request).await
                })
            }
            Message::RefreshRevistas => self.load_revistas(),
            Message::NewRevista => {
                self.revista_form = Some(RevistaForm::new(self.today));
                Task::none()
            }
            Message::EditRevista(revista) => {
                self.revista_form = Some(RevistaForm::edit(&revista, self.today));
                Task::none()
            }
            Message::RevistaThemeChanged(v) => {
                if let Some(form) = &mut self.revista_form {
                    form.tema = v;
                }
                Task::none()
            }
            Message::RevistaTurmaToggled(turma_id) => {
                if let Some(form) = &mut self.revista_form {
                    form.toggle_turma(&turma_id);
                }
                Task::none()
            }
            Message::LessonTitleChanged(index, v) => {
                if let Some(lesson) = self.revista_form.as_mut().and_then(|f| f.licoes.get_mut(index)) {
                    lesson.titulo = v;
                }
                Task::none()
            }
            Message::SubmitRevista => {
                let Some(form) = &self.revista_form else {
                    return Task::none();
                };
                let input = match form.to_input() {
                    Ok(input) => input,
                    Err(msg) => return self.fail(msg),
                };
                let api = self.api.clone();
                match form.editing.clone() {
                    Some(id) => self.mutate(Mutation::SaveRevista, async move {
                        api.update_revista(&id, &input).await
                    }),
                    None => self.mutate(Mutation::SaveRevista, async move {
                        api.create_revista(&input).await
                    }),
                }
            }
            Message::CancelRevistaForm => {
                self.revista_form = None;
                self.date_picker_open = DatePickerOpen::None;
                Task::none()
            }
            Message::GenerateBackup => {
                if self.backup_busy || !self.can_manage_backups() {
                    return Task::none();
                }
                self.backup_busy = true;
                self.notice = None;
                let api = self.api.clone();
                let fallback_name = backup::default_filename(Local::now().naive_local());
                let scope = self.scope.current();
                self.scope.track(Task::perform(
                    export_backup(api, fallback_name),
                    move |result| Message::BackupSaved(scope, result),
                ))
            }
            Message::BackupSaved(scope, result) => {
                self.backup_busy = false;
                if !self.accepts(scope, "backup") {
                    return Task::none();
                }
                match result {
                    Ok(message) => self.notice = Some(Notice::success(message)),
                    Err(BackupError::Cancelled) => tracing::debug!("backup save cancelled"),
                    Err(e) => {
                        tracing::warn!(error = %e, "backup failed");
                        self.notice = Some(Notice::error(format!("Erro ao gerar backup: {e}")));
                    }
                }
                Task::none()
            }
            Message::PickRestoreFile => {
                if self.backup_busy || !self.can_manage_backups() {
                    return Task::none();
                }
                self.notice = None;
                let scope = self.scope.current();
                self.scope.track(Task::perform(pick_backup_file(), move |result| {
                    Message::RestoreFileLoaded(scope, result)
                }))
            }
            Message::RestoreFileLoaded(scope, result) => {
                if !self.accepts(scope, "backup file") {
                    return Task::none();
                }
                match result {
                    Ok(file) => self.pending_restore = Some(file),
                    Err(BackupError::Cancelled) => {}
                    Err(e) => self.notice = Some(Notice::error(e.to_string())),
                }
                Task::none()
            }
            Message::ConfirmRestore => {
                if self.backup_busy || !self.can_manage_backups() {
                    return Task::none();
                }
                let Some(file) = self.pending_restore.take() else {
                    return Task::none();
                };
                tracing::info!(collections = file.counts.len(), "restoring backup");
                self.backup_busy = true;
                let api = self.api.clone();
                let scope = self.scope.current();
                self.scope.track(Task::perform(
                    restore_backup(api, file),
                    move |result| Message::RestoreFinished(scope, result),
                ))
            }
            Message::CancelRestore => {
                self.pending_restore = None;
                Task::none()
            }
            Message::RestoreFinished(scope, result) => {
                self.backup_busy = false;
                if !self.accepts(scope, "restore") {
                    return Task::none();
                }
                match result {
                    Ok(outcome) => {
                        tracing::info!(total = outcome.total_restored, "backup restored");
                        self.notice = Some(Notice::success(backup::restored_message(&outcome)));
                        Task::batch([self.load_dashboard(), self.load_turmas(), self.load_students()])
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "restore failed");
                        self.fail(format!("Erro ao restaurar backup: {e}"))
                    }
                }
            }
            Message::RequestDelete(target) => {
                self.pending_delete = Some(target);
                Task::none()
            }
            Message::ConfirmDelete => {
                let Some(target) = self.pending_delete.take() else {
                    return Task::none();
                };
                let api = self.api.clone();
                match target {
                    DeleteTarget::Student { id, .. } => self.mutate(Mutation::DeleteStudent, async move {
                        api.delete_student(&id).await
                    }),
                    DeleteTarget::Turma { id, .. } => self.mutate(Mutation::DeleteTurma, async move {
                        api.delete_turma(&id).await
                    }),
                    DeleteTarget::User { id, .. } => self.mutate(Mutation::DeleteUser, async move {
                        api.delete_user(&id).await
                    }),
                    DeleteTarget::Revista { id, .. } => self.mutate(Mutation::DeleteRevista, async move {
                        api.delete_revista(&id).await
                    }),
                }
            }
            Message::CancelDelete => {
                self.pending_delete = None;
                Task::none()
            }
            Message::MutationFinished(scope, mutation, result) => {
                if mutation == Mutation::SaveAttendance {
                    self.attendance_saving = false;
                }
                if !self.accepts(scope, "mutation") {
                    if let Err(e) = &result {
                        tracing::warn!(?mutation, error = %e, "change failed after leaving its screen");
                    }
                    return Task::none();
                }
                match result {
                    Ok(()) => {
                        tracing::info!(?mutation, "saved");
                        self.notice = Some(Notice::success(mutation.success_message()));
                        self.after_mutation(mutation)
                    }
                    Err(e) => {
                        tracing::warn!(?mutation, error = %e, "backend rejected change");
                        self.notice = Some(Notice::error(mutation.failure_message(&e)));
                        Task::none()
                    }
                }
            }
            Message::Ignore => Task::none(),
        }
    }

    /// Starts a fresh fetch scope for the rendered view and issues its loads.
    fn enter_requested(&mut self) -> Task<Message> {
        let view = self.effective_view();
        let previous = self.scope.current().view;
        self.scope.enter(view);
        if view != previous {
            self.reset_default_dates(view);
        }
        self.date_picker_open = DatePickerOpen::None;
        self.pending_delete = None;
        // whatever was in flight was aborted with the old scope
        self.dashboard_loading = false;
        self.rankings_loading = false;
        self.revistas_loading = false;
        self.attendance_saving = false;
        self.backup_busy = false;
        self.pending_restore = None;

        match view {
            View::Home | View::ChangePassword | View::Settings => Task::none(),
            View::Dashboard => Task::batch([self.load_dashboard(), self.load_turmas()]),
            View::Attendance => Task::batch([
                self.load_turmas(),
                self.load_students(),
                self.load_attendance_records(),
                self.load_attendance_revista(),
            ]),
            View::Reports => self.load_reports(),
            View::Rankings => self.load_rankings(),
            View::Students => Task::batch([self.load_students(), self.load_turmas()]),
            View::Classes => self.load_turmas(),
            View::Users => Task::batch([self.load_users(), self.load_turmas()]),
            View::Magazines | View::MagazineAdmin => {
                Task::batch([self.load_revistas(), self.load_turmas()])
            }
        }
    }

    /// Report screens open on the last Sunday, the roll call on the current
    /// or next one.
    fn reset_default_dates(&mut self, view: View) {
        self.today = (self.clock)();
        match view {
            View::Dashboard => self.dashboard_date = dashboard::last_sunday(self.today),
            View::Reports => self.report_date = dashboard::last_sunday(self.today),
            View::Attendance => {
                let date = dashboard::upcoming_sunday(self.today);
                if date != self.attendance_date {
                    self.attendance_date = date;
                    self.attendance_records.clear();
                    self.reset_roll_call();
                }
            }
            _ => {}
        }
    }

    fn accepts(&self, scope: FetchScope, what: &'static str) -> bool {
        let current = self.scope.is_current(scope);
        if !current {
            tracing::debug!(what, ?scope, now = ?self.scope.current(), "discarding stale response");
        }
        current
    }

    /// Admins only; moderators do not handle backups.
    fn can_manage_backups(&self) -> bool {
        self.session.role() == Some(Role::Admin)
    }

    fn fail(&mut self, message: impl Into<String>) -> Task<Message> {
        self.notice = Some(Notice::error(message));
        Task::none()
    }

    fn load_dashboard(&mut self) -> Task<Message> {
        self.dashboard_loading = true;
        let api = self.api.clone();
        let date = self.dashboard_date;
        let scope = self.scope.current();
        self.scope.track(Task::perform(
            async move { api.dashboard(date).await },
            move |result| Message::DashboardLoaded(scope, date, result),
        ))
    }

    fn load_reports(&mut self) -> Task<Message> {
        let api = self.api.clone();
        let date = self.report_date;
        let scope = self.scope.current();
        self.scope.track(Task::perform(
            async move { api.dashboard(date).await },
            move |result| Message::ReportsLoaded(scope, date, result),
        ))
    }

    fn load_rankings(&mut self) -> Task<Message> {
        self.rankings_loading = true;
        let api = self.api.clone();
        let scope = self.scope.current();
        self.scope.track(Task::perform(
            async move { api.rankings().await },
            move |result| Message::RankingsLoaded(scope, result),
        ))
    }

    fn load_turmas(&mut self) -> Task<Message> {
        let api = self.api.clone();
        let scope = self.scope.current();
        self.scope.track(Task::perform(
            async move { api.turmas().await },
            move |result| Message::TurmasLoaded(scope, result),
        ))
    }

    fn load_students(&mut self) -> Task<Message> {
        let api = self.api.clone();
        let scope = self.scope.current();
        self.scope.track(Task::perform(
            async move { api.students().await },
            move |result| Message::StudentsLoaded(scope, result),
        ))
    }

    fn load_users(&mut self) -> Task<Message> {
        let api = self.api.clone();
        let scope = self.scope.current();
        self.scope.track(Task::perform(
            async move { api.users().await },
            move |result| Message::UsersLoaded(scope, result),
        ))
    }

    fn load_attendance_records(&mut self) -> Task<Message> {
        let Some(turma) = &self.attendance_turma else {
            return Task::none();
        };
        let api = self.api.clone();
        let turma_id = turma.id.clone();
        let date = self.attendance_date;
        let scope = self.scope.current();
        self.scope.track(Task::perform(
            {
                let turma_id = turma_id.clone();
                async move { api.attendance(&turma_id, date).await }
            },
            move |result| Message::AttendanceLoaded {
                scope,
                turma_id: turma_id.clone(),
                date,
                result,
            },
        ))
    }

    fn load_revistas(&mut self) -> Task<Message> {
        self.revistas_loading = true;
        let api = self.api.clone();
        let scope = self.scope.current();
        self.scope.track(Task::perform(
            async move { api.revistas().await },
            move |result| Message::RevistasLoaded(scope, result),
        ))
    }

    fn load_attendance_revista(&mut self) -> Task<Message> {
        let Some(turma) = &self.attendance_turma else {
            return Task::none();
        };
        let api = self.api.clone();
        let turma_id = turma.id.clone();
        let scope = self.scope.current();
        self.scope.track(Task::perform(
            {
                let turma_id = turma_id.clone();
                async move { api.revista_for_turma(&turma_id).await }
            },
            move |result| Message::AttendanceRevistaLoaded {
                scope,
                turma_id: turma_id.clone(),
                result,
            },
        ))
    }

    /// Prefills the roll-call sheet from the loaded students and records.
    /// Once the user has edited the sheet, their presence marks and totals
    /// win over what the backend sent.
    fn refresh_roll_call(&mut self) {
        let Some(turma) = &self.attendance_turma else {
            self.roll_call.clear();
            self.roll_totals = Default::default();
            return;
        };
        let (mut entries, totals) =
            attendance::prefill(&turma.id, &self.students, &self.attendance_records);
        if self.roll_call_edited {
            for entry in &mut entries {
                if let Some(edited) = self.roll_call.iter().find(|e| e.student_id == entry.student_id) {
                    entry.present = edited.present;
                }
            }
            tracing::debug!(entries = entries.len(), "kept roll-call edits over loaded data");
        } else {
            self.roll_totals = totals;
        }
        self.roll_call = entries;
    }

    /// Starts the sheet over for a new class or date, dropping unsaved edits.
    fn reset_roll_call(&mut self) {
        self.roll_call_edited = false;
        self.roll_call.clear();
        self.refresh_roll_call();
    }

    fn save_attendance(&mut self) -> Task<Message> {
        if self.attendance_saving {
            return Task::none();
        }
        let Some(turma) = &self.attendance_turma else {
            return self.fail("Selecione uma turma");
        };
        let Some(session) = self.session.current() else {
            return Task::none();
        };

        let stamp = Local::now().timestamp_millis();
        let payload = attendance::build_payload(
            &turma.id,
            self.attendance_date,
            &self.roll_call,
            &self.roll_totals,
            stamp,
        );
        if payload.is_empty() {
            return self.fail("Nenhum aluno ou visitante para registrar");
        }

        let api = self.api.clone();
        let turma_id = turma.id.clone();
        let date = self.attendance_date;
        let role = session.user.role;
        let user_id = session.user.id.clone();
        tracing::info!(turma = %turma.nome, %date, entries = payload.len(), "saving roll call");
        self.attendance_saving = true;
        self.mutate(Mutation::SaveAttendance, async move {
            api.save_attendance(&turma_id, date, role, &user_id, &payload).await
        })
    }

    /// Runs a write request in the current scope; the outcome comes back as
    /// `MutationFinished` and is dropped if the user has moved on.
    fn mutate<T, F>(&mut self, mutation: Mutation, request: F) -> Task<Message>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, NetworkError>> + Send + 'static,
    {
        let scope = self.scope.current();
        self.scope.track(Task::perform(
            async move { request.await.map(|_| ()) },
            move |result| Message::MutationFinished(scope, mutation, result),
        ))
    }

    fn after_mutation(&mut self, mutation: Mutation) -> Task<Message> {
        match mutation {
            Mutation::SaveStudent => {
                self.student_form = None;
                self.load_students()
            }
            Mutation::TransferStudent => {
                self.transfer = None;
                self.load_students()
            }
            Mutation::DeleteStudent => self.load_students(),
            Mutation::SaveTurma => {
                self.turma_form = None;
                self.load_turmas()
            }
            Mutation::DeleteTurma => self.load_turmas(),
            Mutation::CreateUser | Mutation::UpdateUser => {
                self.user_form = None;
                self.load_users()
            }
            Mutation::DeleteUser => self.load_users(),
            Mutation::SaveAttendance => {
                // the saved sheet comes back from the backend
                self.roll_call_edited = false;
                Task::batch([self.load_dashboard(), self.load_attendance_records()])
            }
            Mutation::ChangePassword => {
                self.password_form = Default::default();
                Task::none()
            }
            Mutation::SaveRevista => {
                self.revista_form = None;
                self.load_revistas()
            }
            Mutation::DeleteRevista => self.load_revistas(),
        }
    }
}


/// Fetches a fresh backup and asks where to save it.
async fn export_backup(api: ApiClient, fallback_name: String) -> Result<String, BackupError> {
    let generated = api.generate_backup().await?;
    if !generated.success {
        return Err(BackupError::Rejected(
            generated.message.clone().unwrap_or_else(|| "backup não gerado".to_string()),
        ));
    }
    let Some(document) = generated.backup.clone() else {
        return Err(BackupError::Rejected("resposta sem conteúdo de backup".to_string()));
    };
    let filename = generated.filename.clone().unwrap_or(fallback_name);

    let path = task::spawn_blocking(move || {
        let path = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(filename)
            .save_file()
            .ok_or(BackupError::Cancelled)?;
        backup::write_backup(&path, &document)?;
        Ok::<_, BackupError>(path)
    })
    .await
    .map_err(|join_err| BackupError::Io(join_err.to_string()))??;

    Ok(backup::generated_message(&generated, &path))
}

async fn pick_backup_file() -> Result<BackupFile, BackupError> {
    task::spawn_blocking(|| {
        let path = rfd::FileDialog::new()
            .add_filter("Backup", &["json"])
            .pick_file()
            .ok_or(BackupError::Cancelled)?;
        backup::read_backup(&path)
    })
    .await
    .map_err(|join_err| BackupError::Io(join_err.to_string()))?
}

async fn restore_backup(api: ApiClient, file: BackupFile) -> Result<RestoreOutcome, BackupError> {
    let outcome = api.restore_backup(&file.document).await?;
    if !outcome.success {
        return Err(BackupError::Rejected(
            outcome.message.clone().unwrap_or_else(|| "restauração recusada".to_string()),
        ));
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tempfile::TempDir;
    use crate::api::models::{AttendanceRecord, AttendanceRow, AttendanceStatus, Role, Student, Turma};
    use crate::attendance::TotalField;
    use crate::error::AuthError;
    use crate::session::{Session, UserProfile};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
    }

    fn app_in(dir: &TempDir) -> App {
        let config = AppConfig::from_values(
            Some("http://127.0.0.1:9".into()),
            Some(dir.path().to_string_lossy().into_owned()),
        )
        .unwrap();
        let api = ApiClient::new(&config.backend_url).unwrap();
        App::with_parts(config, api, today)
    }

    fn session(role: Role) -> Session {
        Session {
            token: "tok".into(),
            user: UserProfile {
                id: "u-1".into(),
                name: "Ana".into(),
                email: "ana@ebd.org".into(),
                role,
                permitted_classes: vec!["t-1".into()],
            },
        }
    }

    fn logged_in(dir: &TempDir, role: Role) -> App {
        let mut app = app_in(dir);
        let _ = app.update(Message::LoginFinished(Ok(session(role))));
        app
    }

    fn row(name: &str) -> AttendanceRow {
        AttendanceRow {
            class_id: format!("id-{name}"),
            class_name: name.into(),
            date: None,
            enrolled: 10,
            present: 5,
            absent: 5,
            visitors: 0,
            post_call: 0,
            offerings_total: Decimal::ZERO,
            bibles: 0,
            magazines: 0,
        }
    }

    fn turma(id: &str) -> Turma {
        Turma {
            id: id.into(),
            nome: format!("Turma {id}"),
            descricao: None,
            ativa: true,
        }
    }

    thread_local! {
        static CALENDAR: Cell<NaiveDate> = Cell::new(today());
    }

    fn calendar() -> NaiveDate {
        CALENDAR.with(Cell::get)
    }

    #[test]
    fn default_dates_follow_the_calendar_on_view_change() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        app.clock = calendar;
        let _ = app.update(Message::LoginFinished(Ok(session(Role::Admin))));
        assert_eq!(app.dashboard_date, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());

        // the window stays open past Sunday the 9th
        CALENDAR.with(|c| c.set(NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()));
        let _ = app.update(Message::Navigate(View::Reports));
        assert_eq!(app.report_date, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        let _ = app.update(Message::Navigate(View::Attendance));
        assert_eq!(app.attendance_date, NaiveDate::from_ymd_opt(2025, 3, 16).unwrap());
        let _ = app.update(Message::Navigate(View::Dashboard));
        assert_eq!(app.dashboard_date, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(app.today, NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());

        // a date picked by hand survives a reload of the same view
        let picked = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let _ = app.update(Message::OpenDatePicker(DatePickerOpen::Dashboard));
        let _ = app.update(Message::SubmitDate(crate::app::state::to_picker(picked)));
        let _ = app.update(Message::Navigate(View::Dashboard));
        assert_eq!(app.dashboard_date, picked);
    }

    #[test]
    fn boot_without_session_lands_home() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        let _ = app.boot();
        assert_eq!(app.requested, View::Home);
        assert_eq!(app.effective_view(), View::Home);
        assert_eq!(app.api.token(), None);
    }

    #[test]
    fn login_persists_session_and_opens_dashboard() {
        let dir = TempDir::new().unwrap();
        let app = logged_in(&dir, Role::Teacher);
        assert_eq!(app.effective_view(), View::Dashboard);
        assert_eq!(app.api.token(), Some("tok"));

        let mut restarted = app_in(&dir);
        let _ = restarted.boot();
        assert_eq!(restarted.effective_view(), View::Dashboard);
        assert_eq!(restarted.api.token(), Some("tok"));
    }

    #[test]
    fn rejected_login_shows_message() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir);
        app.logging_in = true;
        let _ = app.update(Message::LoginFinished(Err(AuthError::Rejected(
            "Email ou senha incorretos".into(),
        ))));
        assert!(!app.logging_in);
        assert_eq!(app.login_error.as_deref(), Some("Email ou senha incorretos"));
        assert_eq!(app.effective_view(), View::Home);
    }

    #[test]
    fn logout_resets_view_and_clears_data() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Admin);
        let _ = app.update(Message::Navigate(View::Users));
        app.dashboard_rows = vec![row("A")];

        let _ = app.update(Message::Logout);
        assert_eq!(app.requested, View::Home);
        assert_eq!(app.effective_view(), View::Home);
        assert!(app.dashboard_rows.is_empty());
        assert_eq!(app.api.token(), None);

        let mut restarted = app_in(&dir);
        let _ = restarted.boot();
        assert!(!restarted.session.is_authenticated());
    }

    #[test]
    fn teacher_requesting_admin_view_gets_dashboard() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Teacher);
        let _ = app.update(Message::Navigate(View::Users));
        assert_eq!(app.requested, View::Users);
        assert_eq!(app.effective_view(), View::Dashboard);
        assert_eq!(app.scope.current().view, View::Dashboard);
    }

    #[test]
    fn late_response_from_previous_view_is_discarded() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Admin);
        let dashboard_scope = app.scope.current();
        let date = app.dashboard_date;

        let _ = app.update(Message::Navigate(View::Reports));
        let _ = app.update(Message::DashboardLoaded(dashboard_scope, date, Ok(vec![row("A")])));
        assert!(app.dashboard_rows.is_empty());

        let reports_scope = app.scope.current();
        let _ = app.update(Message::ReportsLoaded(reports_scope, app.report_date, Ok(vec![row("B")])));
        assert_eq!(app.report_rows.len(), 1);
    }

    #[test]
    fn dashboard_response_for_an_old_date_is_discarded() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Admin);
        let scope = app.scope.current();
        let old_date = app.dashboard_date;
        app.dashboard_date = NaiveDate::from_ymd_opt(2025, 2, 23).unwrap();

        let _ = app.update(Message::DashboardLoaded(scope, old_date, Ok(vec![row("A")])));
        assert!(app.dashboard_rows.is_empty());

        let _ = app.update(Message::DashboardLoaded(scope, app.dashboard_date, Ok(vec![row("A")])));
        assert_eq!(app.dashboard_rows.len(), 1);
        assert!(!app.dashboard_loading);
    }

    #[test]
    fn failed_load_keeps_previous_state() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Admin);
        app.dashboard_rows = vec![row("A")];
        let scope = app.scope.current();
        let err = NetworkError::Transport("refused".into());
        let _ = app.update(Message::DashboardLoaded(scope, app.dashboard_date, Err(err)));
        assert_eq!(app.dashboard_rows.len(), 1);
        assert!(app.notice.is_none());
    }

    #[test]
    fn roll_call_is_prefilled_for_the_selected_class_only() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Teacher);
        let _ = app.update(Message::Navigate(View::Attendance));
        let scope = app.scope.current();

        let students = vec![Student {
            id: "s-1".into(),
            nome_completo: "Maria".into(),
            data_nascimento: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
            contato: String::new(),
            turma_id: "t-1".into(),
            ativo: true,
        }];
        let _ = app.update(Message::StudentsLoaded(scope, Ok(students)));
        // only t-1 is visible to this teacher, so it is preselected
        let _ = app.update(Message::TurmasLoaded(scope, Ok(vec![turma("t-1"), turma("t-2")])));
        assert_eq!(app.attendance_turma.as_ref().map(|t| t.id.as_str()), Some("t-1"));
        assert_eq!(app.roll_call.len(), 1);
        assert!(!app.roll_call[0].present);

        let record = AttendanceRecord {
            id: "r-1".into(),
            aluno_id: "s-1".into(),
            turma_id: "t-1".into(),
            data: app.attendance_date,
            status: AttendanceStatus::Present,
            oferta: Some(Decimal::new(500, 2)),
            biblias_entregues: None,
            revistas_entregues: None,
        };
        let _ = app.update(Message::AttendanceLoaded {
            scope,
            turma_id: "t-2".into(),
            date: app.attendance_date,
            result: Ok(vec![record.clone()]),
        });
        assert!(!app.roll_call[0].present);

        let _ = app.update(Message::AttendanceLoaded {
            scope,
            turma_id: "t-1".into(),
            date: app.attendance_date,
            result: Ok(vec![record]),
        });
        assert!(app.roll_call[0].present);
        assert_eq!(app.roll_totals.offering, "5,00");
    }

    #[test]
    fn late_loads_keep_presence_marks_and_totals() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Teacher);
        let _ = app.update(Message::Navigate(View::Attendance));
        let scope = app.scope.current();
        let maria = Student {
            id: "s-1".into(),
            nome_completo: "Maria".into(),
            data_nascimento: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
            contato: String::new(),
            turma_id: "t-1".into(),
            ativo: true,
        };
        let joao = Student { id: "s-2".into(), nome_completo: "João".into(), ..maria.clone() };
        let _ = app.update(Message::StudentsLoaded(scope, Ok(vec![maria.clone()])));
        let _ = app.update(Message::TurmasLoaded(scope, Ok(vec![turma("t-1")])));
        assert_eq!(app.roll_call.len(), 1);

        let _ = app.update(Message::PresenceToggled(0, true));
        let _ = app.update(Message::TotalChanged(TotalField::Visitors, "3".into()));

        let _ = app.update(Message::StudentsLoaded(scope, Ok(vec![maria, joao])));
        let _ = app.update(Message::AttendanceLoaded {
            scope,
            turma_id: "t-1".into(),
            date: app.attendance_date,
            result: Ok(Vec::new()),
        });
        assert_eq!(app.roll_call.len(), 2);
        assert!(app.roll_call.iter().find(|e| e.student_id == "s-1").unwrap().present);
        assert!(!app.roll_call.iter().find(|e| e.student_id == "s-2").unwrap().present);
        assert_eq!(app.roll_totals.visitors, "3");

        // another date starts from what the backend has
        let _ = app.update(Message::OpenDatePicker(DatePickerOpen::Attendance));
        let _ = app.update(Message::SubmitDate(crate::app::state::to_picker(
            NaiveDate::from_ymd_opt(2025, 3, 16).unwrap(),
        )));
        assert!(!app.roll_call_edited);
        assert!(app.roll_call.iter().all(|e| !e.present));
        assert_eq!(app.roll_totals.visitors, "");
    }

    #[test]
    fn invalid_offering_text_is_not_accepted() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Teacher);
        let _ = app.update(Message::TotalChanged(TotalField::Offering, "7,5".into()));
        let _ = app.update(Message::TotalChanged(TotalField::Offering, "7.50".into()));
        assert_eq!(app.roll_totals.offering, "7,5");
    }

    #[test]
    fn saving_without_class_reports_error() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Teacher);
        let _ = app.update(Message::SaveAttendance);
        assert_eq!(app.notice, Some(Notice::error("Selecione uma turma")));
        assert!(!app.attendance_saving);
    }

    #[test]
    fn password_mismatch_is_caught_before_request() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Teacher);
        let _ = app.update(Message::CurrentPasswordChanged("antiga".into()));
        let _ = app.update(Message::NewPasswordChanged("1234567".into()));
        let _ = app.update(Message::ConfirmPasswordChanged("7654321".into()));
        let _ = app.update(Message::SubmitPasswordChange);
        assert_eq!(
            app.notice,
            Some(Notice::error("Nova senha e confirmação não coincidem"))
        );
    }

    #[test]
    fn mutation_outcome_reaches_status_line() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Admin);
        let _ = app.update(Message::Navigate(View::Classes));
        let scope = app.scope.current();
        app.turma_form = Some(TurmaForm::default());

        let err = NetworkError::Status { status: 400, detail: Some("Nome duplicado".into()) };
        let _ = app.update(Message::MutationFinished(scope, Mutation::SaveTurma, Err(err)));
        assert_eq!(app.notice, Some(Notice::error("Erro: Nome duplicado")));
        assert!(app.turma_form.is_some());

        let _ = app.update(Message::MutationFinished(scope, Mutation::SaveTurma, Ok(())));
        assert_eq!(app.notice, Some(Notice::success("Turma salva com sucesso!")));
        assert!(app.turma_form.is_none());
    }

    #[test]
    fn save_finishing_after_logout_leaves_no_trace() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Admin);
        let _ = app.update(Message::Navigate(View::Attendance));
        let save_scope = app.scope.current();
        app.attendance_saving = true;

        let _ = app.update(Message::Logout);
        let _ = app.update(Message::MutationFinished(save_scope, Mutation::SaveAttendance, Ok(())));
        assert!(app.notice.is_none());
        assert!(!app.dashboard_loading);
        assert!(!app.attendance_saving);

        // nothing was reloaded, so the home scope has no dashboard load to answer
        let home_scope = app.scope.current();
        assert_eq!(home_scope.view, View::Home);
        assert!(app.dashboard_rows.is_empty());
        assert_eq!(app.effective_view(), View::Home);
    }

    #[test]
    fn change_confirmed_after_navigating_away_does_not_touch_new_screen() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Admin);
        let _ = app.update(Message::Navigate(View::Classes));
        let classes_scope = app.scope.current();
        app.turma_form = Some(TurmaForm::default());

        let _ = app.update(Message::Navigate(View::Students));
        let _ = app.update(Message::MutationFinished(classes_scope, Mutation::SaveTurma, Ok(())));
        assert!(app.notice.is_none());
        assert!(app.turma_form.is_some());
    }

    fn backup_file() -> BackupFile {
        backup::parse_backup(r#"{"metadata": {"total_records": 2}, "data": {"turmas": [{}, {}]}}"#).unwrap()
    }

    #[test]
    fn only_admins_may_touch_backups() {
        let dir = TempDir::new().unwrap();
        for role in [Role::Teacher, Role::Moderator] {
            let mut app = logged_in(&dir, role);
            let _ = app.update(Message::GenerateBackup);
            assert!(!app.backup_busy, "{role:?}");
            let scope = app.scope.current();
            let _ = app.update(Message::RestoreFileLoaded(scope, Ok(backup_file())));
            let _ = app.update(Message::ConfirmRestore);
            assert!(!app.backup_busy, "{role:?}");
            let _ = app.update(Message::Logout);
        }

        let mut app = logged_in(&dir, Role::Admin);
        let _ = app.update(Message::GenerateBackup);
        assert!(app.backup_busy);
        let _ = app.update(Message::GenerateBackup);
        let scope = app.scope.current();
        let _ = app.update(Message::BackupSaved(scope, Err(BackupError::Cancelled)));
        assert!(!app.backup_busy);
        assert!(app.notice.is_none());
    }

    #[test]
    fn restore_is_confirmed_then_reloads_data() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Admin);
        let scope = app.scope.current();

        let _ = app.update(Message::RestoreFileLoaded(scope, Ok(backup_file())));
        assert_eq!(app.pending_restore.as_ref().map(|f| f.counts.len()), Some(1));
        let _ = app.update(Message::CancelRestore);
        assert!(app.pending_restore.is_none());

        let _ = app.update(Message::RestoreFileLoaded(scope, Ok(backup_file())));
        let _ = app.update(Message::ConfirmRestore);
        assert!(app.backup_busy);
        assert!(app.pending_restore.is_none());

        app.dashboard_loading = false;
        let outcome = RestoreOutcome {
            success: true,
            message: None,
            restore_summary: [("turmas".to_string(), 2)].into_iter().collect(),
            total_restored: 2,
        };
        let _ = app.update(Message::RestoreFinished(scope, Ok(outcome)));
        assert!(!app.backup_busy);
        assert!(app.dashboard_loading);
        assert_eq!(
            app.notice,
            Some(Notice::success("Backup restaurado com sucesso! Turmas: 2. Total: 2 registros"))
        );
    }

    #[test]
    fn unreadable_backup_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Admin);
        let scope = app.scope.current();
        let _ = app.update(Message::RestoreFileLoaded(scope, Err(BackupError::UnknownFormat)));
        assert!(app.pending_restore.is_none());
        assert_eq!(
            app.notice,
            Some(Notice::error("Arquivo inválido: formato de backup não reconhecido"))
        );

        let _ = app.update(Message::RestoreFinished(
            scope,
            Err(BackupError::Network(NetworkError::Status {
                status: 400,
                detail: Some("Backup corrompido".into()),
            })),
        ));
        assert_eq!(
            app.notice,
            Some(Notice::error("Erro ao restaurar backup: Backup corrompido"))
        );
    }

    #[test]
    fn magazine_form_edits_lessons_and_dates() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Admin);
        let _ = app.update(Message::Navigate(View::MagazineAdmin));
        assert_eq!(app.effective_view(), View::MagazineAdmin);
        assert!(app.revistas_loading);

        let _ = app.update(Message::NewRevista);
        let _ = app.update(Message::RevistaThemeChanged("Os Profetas Menores".into()));
        let _ = app.update(Message::RevistaTurmaToggled("t-1".into()));
        let _ = app.update(Message::LessonTitleChanged(2, "Amós".into()));
        let moved = NaiveDate::from_ymd_opt(2025, 4, 6).unwrap();
        let _ = app.update(Message::OpenDatePicker(DatePickerOpen::Lesson(2)));
        let _ = app.update(Message::SubmitDate(crate::app::state::to_picker(moved)));
        let _ = app.update(Message::LessonTitleChanged(99, "fora".into()));

        let input = app.revista_form.as_ref().unwrap().to_input().unwrap();
        assert_eq!(input.licoes.len(), 1);
        assert_eq!(input.licoes[0].titulo, "Amós");
        assert_eq!(input.licoes[0].data, moved);

        let scope = app.scope.current();
        let _ = app.update(Message::MutationFinished(scope, Mutation::SaveRevista, Ok(())));
        assert!(app.revista_form.is_none());
        assert_eq!(app.notice, Some(Notice::success("Revista salva com sucesso!")));
    }

    #[test]
    fn teachers_read_magazines_but_cannot_manage_them() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Teacher);
        let _ = app.update(Message::Navigate(View::Magazines));
        assert_eq!(app.effective_view(), View::Magazines);
        let _ = app.update(Message::Navigate(View::MagazineAdmin));
        assert_eq!(app.effective_view(), View::Dashboard);
    }

    #[test]
    fn class_magazine_is_kept_only_for_the_selected_class() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Teacher);
        let _ = app.update(Message::Navigate(View::Attendance));
        let _ = app.update(Message::AttendanceTurmaSelected(turma("t-1")));
        let scope = app.scope.current();
        let revista = crate::api::models::Revista {
            id: "r-1".into(),
            tema: "Os Profetas Menores".into(),
            turma_ids: vec!["t-1".into()],
            licoes: Vec::new(),
            ativa: true,
            criada_em: None,
        };

        let _ = app.update(Message::AttendanceRevistaLoaded {
            scope,
            turma_id: "t-2".into(),
            result: Ok(Some(revista.clone())),
        });
        assert!(app.attendance_revista.is_none());

        let _ = app.update(Message::AttendanceRevistaLoaded {
            scope,
            turma_id: "t-1".into(),
            result: Ok(Some(revista)),
        });
        assert_eq!(app.attendance_revista.as_ref().map(|r| r.id.as_str()), Some("r-1"));

        let _ = app.update(Message::AttendanceTurmaSelected(turma("t-2")));
        assert!(app.attendance_revista.is_none());
    }

    #[test]
    fn delete_requires_confirmation() {
        let dir = TempDir::new().unwrap();
        let mut app = logged_in(&dir, Role::Admin);
        let target = DeleteTarget::Turma { id: "t-1".into(), name: "Jovens".into() };
        let _ = app.update(Message::RequestDelete(target.clone()));
        assert_eq!(app.pending_delete, Some(target));
        let _ = app.update(Message::CancelDelete);
        assert!(app.pending_delete.is_none());
    }
}
