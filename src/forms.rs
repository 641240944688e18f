//! Editable form state for the CRUD screens and the student list filter.
//!
//! Forms keep raw user text; `to_input` validates it and produces the request
//! body, or the message shown in the screen's status line.

use std::fmt;
use chrono::{Duration, NaiveDate};
use crate::api::models::{
    ChangePasswordRequest, Licao, Revista, RevistaInput, Role, Student, StudentInput, Turma,
    TurmaInput, User, UserInput,
};
use crate::dashboard;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub const ALL: &'static [StatusFilter] =
        &[StatusFilter::All, StatusFilter::Active, StatusFilter::Inactive];

    fn accepts(self, active: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => active,
            StatusFilter::Inactive => !active,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match self {
            StatusFilter::All => "Todos",
            StatusFilter::Active => "Ativos",
            StatusFilter::Inactive => "Inativos",
        })
    }
}

/// Student list filter. `search_input` is what the user is typing; `search`
/// only changes when the search is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFilter {
    pub search_input: String,
    pub search: String,
    pub turma_id: Option<String>,
    pub status: StatusFilter,
}

impl StudentFilter {
    pub fn apply_search(&mut self) {
        self.search = self.search_input.trim().to_string();
    }

    pub fn matches(&self, student: &Student) -> bool {
        let search = self.search.to_lowercase();
        let by_name = search.is_empty() || student.nome_completo.to_lowercase().contains(&search);
        let by_class = self.turma_id.as_ref().is_none_or(|id| &student.turma_id == id);
        by_name && by_class && self.status.accepts(student.ativo)
    }

    pub fn filter<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        students.iter().filter(|s| self.matches(s)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurmaForm {
    pub editing: Option<String>,
    pub nome: String,
    pub descricao: String,
}

impl TurmaForm {
    pub fn edit(turma: &Turma) -> Self {
        Self {
            editing: Some(turma.id.clone()),
            nome: turma.nome.clone(),
            descricao: turma.descricao.clone().unwrap_or_default(),
        }
    }

    pub fn to_input(&self) -> Result<TurmaInput, String> {
        let nome = self.nome.trim();
        if nome.is_empty() {
            return Err("Informe o nome da turma".into());
        }
        let descricao = self.descricao.trim();
        Ok(TurmaInput {
            nome: nome.to_string(),
            descricao: (!descricao.is_empty()).then(|| descricao.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentForm {
    pub editing: Option<String>,
    pub nome_completo: String,
    pub data_nascimento: NaiveDate,
    pub contato: String,
    pub turma_id: Option<String>,
}

impl StudentForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            editing: None,
            nome_completo: String::new(),
            data_nascimento: today,
            contato: String::new(),
            turma_id: None,
        }
    }

    pub fn edit(student: &Student) -> Self {
        Self {
            editing: Some(student.id.clone()),
            nome_completo: student.nome_completo.clone(),
            data_nascimento: student.data_nascimento,
            contato: student.contato.clone(),
            turma_id: Some(student.turma_id.clone()),
        }
    }

    pub fn to_input(&self) -> Result<StudentInput, String> {
        let nome = self.nome_completo.trim();
        if nome.is_empty() {
            return Err("Informe o nome completo do aluno".into());
        }
        let Some(turma_id) = &self.turma_id else {
            return Err("Selecione a turma do aluno".into());
        };
        Ok(StudentInput {
            nome_completo: nome.to_string(),
            data_nascimento: self.data_nascimento,
            contato: self.contato.trim().to_string(),
            turma_id: turma_id.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserForm {
    pub editing: Option<String>,
    pub nome: String,
    pub email: String,
    pub senha: String,
    pub tipo: Role,
    pub turmas_permitidas: Vec<String>,
}

impl UserForm {
    pub fn edit(user: &User) -> Self {
        Self {
            editing: Some(user.id.clone()),
            nome: user.nome.clone(),
            email: user.email.clone(),
            senha: String::new(),
            tipo: user.tipo,
            turmas_permitidas: user.turmas_permitidas.clone(),
        }
    }

    pub fn toggle_turma(&mut self, turma_id: &str) {
        if let Some(pos) = self.turmas_permitidas.iter().position(|id| id == turma_id) {
            self.turmas_permitidas.remove(pos);
        } else {
            self.turmas_permitidas.push(turma_id.to_string());
        }
    }

    /// A password is required when creating; on edit an empty password keeps
    /// the current one.
    pub fn to_input(&self) -> Result<UserInput, String> {
        let nome = self.nome.trim();
        let email = self.email.trim();
        if nome.is_empty() || email.is_empty() {
            return Err("Preencha nome e email".into());
        }
        let senha = match (self.senha.is_empty(), self.editing.is_some()) {
            (true, true) => None,
            (true, false) => return Err("Informe a senha do novo usuário".into()),
            (false, _) => Some(self.senha.clone()),
        };
        Ok(UserInput {
            nome: nome.to_string(),
            email: email.to_string(),
            senha,
            tipo: self.tipo,
            turmas_permitidas: self.turmas_permitidas.clone(),
        })
    }
}

/// A quarter has thirteen Sundays, one lesson each.
pub const LESSONS_PER_QUARTER: usize = 13;

#[derive(Debug, Clone, PartialEq)]
pub struct LessonDraft {
    pub titulo: String,
    pub data: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevistaForm {
    pub editing: Option<String>,
    pub tema: String,
    pub turma_ids: Vec<String>,
    pub licoes: Vec<LessonDraft>,
}

impl RevistaForm {
    /// Thirteen untitled lessons on consecutive Sundays, starting this week.
    pub fn new(today: NaiveDate) -> Self {
        let first = dashboard::upcoming_sunday(today);
        Self {
            editing: None,
            tema: String::new(),
            turma_ids: Vec::new(),
            licoes: sundays_from(first, LESSONS_PER_QUARTER),
        }
    }

    /// Loads an existing magazine; missing lesson slots continue weekly
    /// after the last lesson.
    pub fn edit(revista: &Revista, today: NaiveDate) -> Self {
        let mut licoes: Vec<LessonDraft> = revista
            .licoes
            .iter()
            .map(|l| LessonDraft { titulo: l.titulo.clone(), data: l.data })
            .collect();
        if licoes.len() < LESSONS_PER_QUARTER {
            let next = licoes
                .last()
                .map_or_else(|| dashboard::upcoming_sunday(today), |l| l.data + Duration::weeks(1));
            licoes.extend(sundays_from(next, LESSONS_PER_QUARTER - licoes.len()));
        }
        Self {
            editing: Some(revista.id.clone()),
            tema: revista.tema.clone(),
            turma_ids: revista.turma_ids.clone(),
            licoes,
        }
    }

    pub fn toggle_turma(&mut self, turma_id: &str) {
        if let Some(pos) = self.turma_ids.iter().position(|id| id == turma_id) {
            self.turma_ids.remove(pos);
        } else {
            self.turma_ids.push(turma_id.to_string());
        }
    }

    /// Lessons without a title are left out, so a quarter can be filled in
    /// over several edits.
    pub fn to_input(&self) -> Result<RevistaInput, String> {
        let tema = self.tema.trim();
        if tema.is_empty() || self.turma_ids.is_empty() {
            return Err("Preencha o tema e selecione pelo menos uma turma".into());
        }
        Ok(RevistaInput {
            tema: tema.to_string(),
            turma_ids: self.turma_ids.clone(),
            licoes: self
                .licoes
                .iter()
                .filter(|l| !l.titulo.trim().is_empty())
                .map(|l| Licao { titulo: l.titulo.trim().to_string(), data: l.data })
                .collect(),
        })
    }
}

fn sundays_from(first: NaiveDate, count: usize) -> Vec<LessonDraft> {
    (0..count)
        .map(|week| LessonDraft {
            titulo: String::new(),
            data: first + Duration::weeks(week as i64),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasswordForm {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl PasswordForm {
    pub fn to_request(&self, user_id: &str) -> Result<ChangePasswordRequest, String> {
        if self.current.is_empty() {
            return Err("Informe a senha atual".into());
        }
        if self.new != self.confirm {
            return Err("Nova senha e confirmação não coincidem".into());
        }
        if self.new.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!("Nova senha deve ter pelo menos {MIN_PASSWORD_LEN} caracteres"));
        }
        Ok(ChangePasswordRequest {
            user_id: user_id.to_string(),
            current_password: self.current.clone(),
            new_password: self.new.clone(),
            confirm_password: self.confirm.clone(),
        })
    }
}
