use chrono::NaiveDate;
use iced_aw::date_picker::Date;
use crate::api::models::{
    AttendanceRecord, AttendanceRow, Rankings, RestoreOutcome, Revista, Role, Student, Turma, User,
};
use crate::attendance::TotalField;
use crate::backup::BackupFile;
use crate::error::{AuthError, BackupError, NetworkError};
use crate::forms::StatusFilter;
use crate::router::View;
use crate::session::Session;
use super::scope::FetchScope;
use super::state::{DatePickerOpen, DeleteTarget, RankingTab, TurmaChoice};

#[derive(Debug, Clone)]
pub enum Message {
    // Sessão
    LoginEmailChanged(String),
    LoginPasswordChanged(String),
    LoginPressed,
    LoginFinished(Result<Session, AuthError>),
    Logout,
    LogoutSent(Result<(), NetworkError>),
    Navigate(View),
    ThemeSelected(&'static str),
    // Datas
    OpenDatePicker(DatePickerOpen),
    CancelDatePicker,
    SubmitDate(Date),
    // Carregamentos
    DashboardLoaded(FetchScope, NaiveDate, Result<Vec<AttendanceRow>, NetworkError>),
    ReportsLoaded(FetchScope, NaiveDate, Result<Vec<AttendanceRow>, NetworkError>),
    RankingsLoaded(FetchScope, Result<Rankings, NetworkError>),
    TurmasLoaded(FetchScope, Result<Vec<Turma>, NetworkError>),
    StudentsLoaded(FetchScope, Result<Vec<Student>, NetworkError>),
    UsersLoaded(FetchScope, Result<Vec<User>, NetworkError>),
    AttendanceLoaded {
        scope: FetchScope,
        turma_id: String,
        date: NaiveDate,
        result: Result<Vec<AttendanceRecord>, NetworkError>,
    },
    RevistasLoaded(FetchScope, Result<Vec<Revista>, NetworkError>),
    AttendanceRevistaLoaded {
        scope: FetchScope,
        turma_id: String,
        result: Result<Option<Revista>, NetworkError>,
    },
    RefreshDashboard,
    RankingTabSelected(RankingTab),
    // Chamada
    AttendanceTurmaSelected(Turma),
    PresenceToggled(usize, bool),
    TotalChanged(TotalField, String),
    SaveAttendance,
    // Alunos
    StudentSearchChanged(String),
    StudentSearchApplied,
    StudentTurmaFilterSelected(TurmaChoice),
    StudentStatusFilterSelected(StatusFilter),
    NewStudent,
    EditStudent(Student),
    StudentNameChanged(String),
    StudentContactChanged(String),
    StudentTurmaSelected(Turma),
    SubmitStudent,
    CancelStudentForm,
    StartTransfer(Student),
    TransferTargetSelected(Turma),
    ConfirmTransfer,
    CancelTransfer,
    // Turmas
    NewTurma,
    EditTurma(Turma),
    TurmaNameChanged(String),
    TurmaDescriptionChanged(String),
    SubmitTurma,
    CancelTurmaForm,
    // Usuários
    NewUser,
    EditUser(User),
    UserNameChanged(String),
    UserEmailChanged(String),
    UserPasswordChanged(String),
    UserRoleSelected(Role),
    UserTurmaToggled(String),
    SubmitUser,
    CancelUserForm,
    // Alterar senha
    CurrentPasswordChanged(String),
    NewPasswordChanged(String),
    ConfirmPasswordChanged(String),
    SubmitPasswordChange,
    // Revistas
    RefreshRevistas,
    NewRevista,
    EditRevista(Revista),
    RevistaThemeChanged(String),
    RevistaTurmaToggled(String),
    LessonTitleChanged(usize, String),
    SubmitRevista,
    CancelRevistaForm,
    // Backup
    GenerateBackup,
    /// Status text once the file is written.
    BackupSaved(FetchScope, Result<String, BackupError>),
    PickRestoreFile,
    RestoreFileLoaded(FetchScope, Result<BackupFile, BackupError>),
    ConfirmRestore,
    CancelRestore,
    RestoreFinished(FetchScope, Result<RestoreOutcome, BackupError>),
    // Exclusão
    RequestDelete(DeleteTarget),
    ConfirmDelete,
    CancelDelete,
    //
    MutationFinished(FetchScope, Mutation, Result<(), NetworkError>),
    Ignore,
}

/// A write request to the backend; knows what to tell the user afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    SaveStudent,
    TransferStudent,
    DeleteStudent,
    SaveTurma,
    DeleteTurma,
    CreateUser,
    UpdateUser,
    DeleteUser,
    SaveAttendance,
    ChangePassword,
    SaveRevista,
    DeleteRevista,
}

impl Mutation {
    pub fn success_message(self) -> &'static str {
        match self {
            Mutation::SaveStudent => "Aluno salvo com sucesso!",
            Mutation::TransferStudent => "Aluno transferido com sucesso!",
            Mutation::DeleteStudent => "Aluno removido com sucesso!",
            Mutation::SaveTurma => "Turma salva com sucesso!",
            Mutation::DeleteTurma => "Turma removida com sucesso!",
            Mutation::CreateUser => "Usuário criado com sucesso!",
            Mutation::UpdateUser => "Usuário atualizado com sucesso!",
            Mutation::DeleteUser => "Usuário removido com sucesso!",
            Mutation::SaveAttendance => "Chamada salva com sucesso!",
            Mutation::ChangePassword => "Senha alterada com sucesso!",
            Mutation::SaveRevista => "Revista salva com sucesso!",
            Mutation::DeleteRevista => "Revista desativada!",
        }
    }

    fn fallback_message(self) -> &'static str {
        match self {
            Mutation::SaveStudent => "Erro ao salvar aluno",
            Mutation::TransferStudent => "Erro ao transferir aluno",
            Mutation::DeleteStudent => "Erro ao remover aluno",
            Mutation::SaveTurma => "Erro ao salvar turma",
            Mutation::DeleteTurma => "Erro ao remover turma",
            Mutation::CreateUser => "Erro ao criar usuário",
            Mutation::UpdateUser => "Erro ao atualizar usuário",
            Mutation::DeleteUser => "Erro ao remover usuário",
            Mutation::SaveAttendance => "Erro ao salvar chamada",
            Mutation::ChangePassword => "Erro ao alterar senha",
            Mutation::SaveRevista => "Erro ao salvar revista",
            Mutation::DeleteRevista => "Erro ao desativar revista",
        }
    }

    /// `Erro: <detail>` when the backend explained itself, the generic text
    /// otherwise.
    pub fn failure_message(self, err: &NetworkError) -> String {
        match err.detail() {
            Some(detail) => format!("Erro: {detail}"),
            None => self.fallback_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_prefers_server_detail() {
        let err = NetworkError::Status {
            status: 400,
            detail: Some("Turma possui alunos".into()),
        };
        assert_eq!(Mutation::DeleteTurma.failure_message(&err), "Erro: Turma possui alunos");

        let err = NetworkError::Transport("refused".into());
        assert_eq!(Mutation::SaveAttendance.failure_message(&err), "Erro ao salvar chamada");
    }
}
