//! Session store: the auth token and user profile, persisted to local storage.
//!
//! The store is owned by the top-level `App` and handed to whatever needs it;
//! `restore`, `establish`/`login` and `logout` are its only mutators.

use serde::{Deserialize, Serialize};
use crate::api::ApiClient;
use crate::api::models::{LoginResponse, Role, Turma};
use crate::error::AuthError;
use crate::storage::LocalStorage;

pub const TOKEN_KEY: &str = "ebd_token";
pub const USER_KEY: &str = "ebd_user";

/// Profile persisted under [`USER_KEY`], in the backend's field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "user_id")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "tipo")]
    pub role: Role,
    #[serde(rename = "turmas_permitidas", default)]
    pub permitted_classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl From<LoginResponse> for Session {
    fn from(resp: LoginResponse) -> Self {
        Self {
            token: resp.token,
            user: UserProfile {
                id: resp.user_id,
                name: resp.nome,
                email: resp.email,
                role: resp.tipo,
                permitted_classes: resp.turmas_permitidas,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: LocalStorage,
    current: Option<Session>,
}

impl SessionStore {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage, current: None }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.current.as_ref().map(|s| s.user.role)
    }

    /// Loads the persisted session. Absent or malformed entries leave the
    /// store logged out; nothing here touches the network.
    pub fn restore(&mut self) -> Option<&Session> {
        self.current = self.read_persisted();
        match &self.current {
            Some(session) => tracing::info!(user = %session.user.name, role = ?session.user.role, "session restored"),
            None => tracing::debug!(dir = %self.storage.dir().display(), "no persisted session"),
        }
        self.current.as_ref()
    }

    fn read_persisted(&self) -> Option<Session> {
        let token = self.storage.get_item(TOKEN_KEY)?;
        let raw_user = self.storage.get_item(USER_KEY)?;
        if token.trim().is_empty() {
            tracing::warn!("persisted token is empty, ignoring session");
            return None;
        }
        match serde_json::from_str::<UserProfile>(&raw_user) {
            Ok(user) => Some(Session { token, user }),
            Err(e) => {
                tracing::warn!(error = %e, "persisted user profile is malformed, ignoring session");
                None
            }
        }
    }

    /// Network half of a login: needs no access to the store, so it can run
    /// inside a background task.
    pub async fn authenticate(
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let resp = api.login(email, password).await.map_err(|e| {
            tracing::warn!(email, error = %e, "login rejected");
            AuthError::from(e)
        })?;
        Ok(Session::from(resp))
    }

    /// Persists `session` and makes it current. If persisting fails the
    /// store, in memory and on disk, stays as it was.
    ///
    /// The profile is written before the token and put back if the token
    /// write fails, so storage never pairs a token with another user.
    pub fn establish(&mut self, session: Session) -> Result<&Session, AuthError> {
        let user_json = serde_json::to_string(&session.user).map_err(|e| AuthError::Storage(e.to_string()))?;
        let previous_user = self.storage.get_item(USER_KEY);
        self.storage.set_item(USER_KEY, &user_json)?;
        if let Err(e) = self.storage.set_item(TOKEN_KEY, &session.token) {
            let rollback = match &previous_user {
                Some(raw) => self.storage.set_item(USER_KEY, raw),
                None => self.storage.remove_item(USER_KEY),
            };
            if let Err(rollback_err) = rollback {
                tracing::error!(error = %rollback_err, "failed to roll back persisted profile");
            }
            return Err(e.into());
        }
        tracing::info!(user = %session.user.name, role = ?session.user.role, "logged in");
        Ok(&*self.current.insert(session))
    }

    /// `authenticate` followed by `establish`. The app runs the two halves
    /// separately so the network part can live in a task.
    #[cfg(test)]
    pub async fn login(
        &mut self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<&Session, AuthError> {
        let session = Self::authenticate(api, email, password).await?;
        self.establish(session)
    }

    /// Clears the session from memory and storage and hands back the old one,
    /// if any, so the caller can notify the backend.
    pub fn logout(&mut self) -> Option<Session> {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                tracing::error!(key, error = %e, "failed to clear persisted session");
            }
        }
        let previous = self.current.take();
        if let Some(session) = &previous {
            tracing::info!(user = %session.user.name, "logged out");
        }
        previous
    }

    /// Classes the current user may take attendance for: everything for
    /// admins and moderators, the permitted list for teachers.
    pub fn visible_classes(&self, turmas: &[Turma]) -> Vec<Turma> {
        match &self.current {
            None => turmas.to_vec(),
            Some(session) if session.user.role.is_admin() => turmas.to_vec(),
            Some(session) => turmas
                .iter()
                .filter(|t| session.user.permitted_classes.contains(&t.id))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::new(LocalStorage::new(dir.path()))
    }

    fn login_backend() -> Router {
        Router::new().route(
            "/api/login",
            post(|Json(body): Json<Value>| async move {
                if body["senha"] == "certa" {
                    (
                        StatusCode::OK,
                        Json(json!({
                            "token": "tok-123",
                            "user_id": "u-1",
                            "nome": "Márcio",
                            "email": body["email"],
                            "tipo": "admin",
                            "turmas_permitidas": []
                        })),
                    )
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "detail": "Email ou senha incorretos" })),
                    )
                }
            }),
        )
    }

    fn teacher_session() -> Session {
        Session {
            token: "t".into(),
            user: UserProfile {
                id: "u-2".into(),
                name: "Ana".into(),
                email: "ana@ebd.org".into(),
                role: Role::Teacher,
                permitted_classes: vec!["t-2".into()],
            },
        }
    }

    #[test]
    fn restore_without_persisted_data_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert!(store.restore().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn restore_with_malformed_user_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.set_item(TOKEN_KEY, "tok").unwrap();
        storage.set_item(USER_KEY, "{not json").unwrap();

        let mut store = SessionStore::new(storage);
        assert!(store.restore().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn restore_requires_both_entries() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage
            .set_item(USER_KEY, r#"{"user_id":"u","nome":"N","tipo":"admin"}"#)
            .unwrap();

        let mut store = SessionStore::new(storage);
        assert!(store.restore().is_none());
    }

    #[tokio::test]
    async fn login_persists_what_restore_reads_back() {
        let backend = MockBackend::start(login_backend()).await;
        let api = ApiClient::new(&backend.base_url()).unwrap();
        let dir = TempDir::new().unwrap();

        let mut store = store_in(&dir);
        let session = store.login(&api, "marcio@ebd.org", "certa").await.unwrap().clone();
        assert_eq!(session.token, "tok-123");
        assert_eq!(session.user.role, Role::Admin);
        assert!(store.is_authenticated());

        let mut fresh = store_in(&dir);
        assert_eq!(fresh.restore(), Some(&session));
    }

    #[tokio::test]
    async fn failed_login_surfaces_server_detail_and_stays_logged_out() {
        let backend = MockBackend::start(login_backend()).await;
        let api = ApiClient::new(&backend.base_url()).unwrap();
        let dir = TempDir::new().unwrap();

        let mut store = store_in(&dir);
        let err = store.login(&api, "marcio@ebd.org", "errada").await.unwrap_err();
        assert_eq!(err, AuthError::Rejected("Email ou senha incorretos".into()));
        assert!(!store.is_authenticated());
        assert!(store_in(&dir).restore().is_none());
    }

    #[test]
    fn logout_clears_storage() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.establish(teacher_session()).unwrap();

        let previous = store.logout();
        assert_eq!(previous.map(|s| s.token), Some("t".to_string()));
        assert!(!store.is_authenticated());
        assert!(store_in(&dir).restore().is_none());
    }

    #[test]
    fn failed_token_write_keeps_previous_session_on_disk() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.establish(teacher_session()).unwrap();

        // a directory where the token file should go makes the write fail
        std::fs::remove_file(dir.path().join(TOKEN_KEY)).unwrap();
        std::fs::create_dir(dir.path().join(TOKEN_KEY)).unwrap();

        let mut other = teacher_session();
        other.token = "t2".into();
        other.user.id = "u-9".into();
        other.user.name = "Outra".into();
        assert!(matches!(store.establish(other), Err(AuthError::Storage(_))));

        let storage = LocalStorage::new(dir.path());
        let persisted: UserProfile =
            serde_json::from_str(&storage.get_item(USER_KEY).unwrap()).unwrap();
        assert_eq!(persisted, teacher_session().user);
        assert_eq!(store.current(), Some(&teacher_session()));
    }

    #[test]
    fn failed_first_login_leaves_no_profile_behind() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(TOKEN_KEY)).unwrap();

        let mut store = store_in(&dir);
        assert!(store.establish(teacher_session()).is_err());
        assert!(!store.is_authenticated());
        assert_eq!(LocalStorage::new(dir.path()).get_item(USER_KEY), None);
    }

    #[test]
    fn teachers_only_see_permitted_classes() {
        let dir = TempDir::new().unwrap();
        let turmas: Vec<Turma> = ["t-1", "t-2", "t-3"]
            .iter()
            .map(|id| Turma {
                id: id.to_string(),
                nome: format!("Turma {id}"),
                descricao: None,
                ativa: true,
            })
            .collect();

        let mut store = store_in(&dir);
        store.establish(teacher_session()).unwrap();
        let visible = store.visible_classes(&turmas);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "t-2");

        let mut admin = teacher_session();
        admin.user.role = Role::Moderator;
        store.establish(admin).unwrap();
        assert_eq!(store.visible_classes(&turmas).len(), 3);
    }
}
