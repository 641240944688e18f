//! HTTP client for the EBD backend.
//!
//! Every call targets `{base_url}/api/{resource}`, attaches the bearer token
//! when one is set, and is fired exactly once: no retries.

pub mod models;

use std::time::Duration;
use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use crate::error::NetworkError;
use models::*;

pub type Query<'a> = [(&'a str, String)];

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// FastAPI error body: `detail` is a string for HTTPException and a list for
/// validation errors.
#[derive(serde::Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[cfg(test)]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/api/{}", self.base_url, resource.trim_start_matches('/'))
    }

    fn request(&self, method: Method, resource: &str, query: &Query<'_>) -> RequestBuilder {
        let mut req = self.client.request(method, self.url(resource));
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, NetworkError> {
        let response = req.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .map(|body| match body.detail {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                });
            tracing::debug!(%url, status = status.as_u16(), ?detail, "backend returned an error");
            return Err(NetworkError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!(%url, error = %e, "response did not match schema");
            NetworkError::Decode(e.to_string())
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &Query<'_>,
    ) -> Result<T, NetworkError> {
        self.send(self.request(Method::GET, resource, query)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        resource: &str,
        query: &Query<'_>,
        body: &B,
    ) -> Result<T, NetworkError> {
        self.send(self.request(Method::POST, resource, query).json(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        resource: &str,
        body: &B,
    ) -> Result<T, NetworkError> {
        self.send(self.request(Method::PUT, resource, &[]).json(body)).await
    }

    pub async fn delete(&self, resource: &str) -> Result<Acknowledgement, NetworkError> {
        self.acknowledged(self.request(Method::DELETE, resource, &[])).await
    }

    /// Sends a write whose answer is a plain `{"message": ...}`.
    async fn acknowledged(&self, req: RequestBuilder) -> Result<Acknowledgement, NetworkError> {
        let ack: Acknowledgement = self.send(req).await?;
        if !ack.message.is_empty() {
            tracing::debug!(message = %ack.message, "backend acknowledged");
        }
        Ok(ack)
    }

    // ========== Auth ==========

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, NetworkError> {
        let body = LoginRequest { email, senha: password };
        self.post("login", &[], &body).await
    }

    pub async fn logout(&self, token: &str) -> Result<serde_json::Value, NetworkError> {
        self.send(self.request(Method::POST, "logout", &[("token", token.to_string())]))
            .await
    }

    // ========== Reports ==========

    pub async fn dashboard(&self, date: NaiveDate) -> Result<Vec<AttendanceRow>, NetworkError> {
        self.get("reports/dashboard", &[("data", date.to_string())]).await
    }

    /// Fetches the three ranking categories concurrently; the first failure
    /// wins and the other results are dropped.
    pub async fn rankings(&self) -> Result<Rankings, NetworkError> {
        let (students, teachers, classes) = tokio::try_join!(
            self.get::<Vec<PersonRanking>>("ranking/alunos", &[]),
            self.get::<Vec<PersonRanking>>("ranking/professores-oficiais", &[]),
            self.get::<Vec<ClassRanking>>("ranking/turmas", &[]),
        )?;
        Ok(Rankings { students, teachers, classes })
    }

    // ========== Turmas ==========

    pub async fn turmas(&self) -> Result<Vec<Turma>, NetworkError> {
        self.get("turmas", &[]).await
    }

    pub async fn create_turma(&self, input: &TurmaInput) -> Result<Turma, NetworkError> {
        self.post("turmas", &[], input).await
    }

    pub async fn update_turma(&self, id: &str, input: &TurmaInput) -> Result<Turma, NetworkError> {
        self.put(&format!("turmas/{id}"), input).await
    }

    pub async fn delete_turma(&self, id: &str) -> Result<Acknowledgement, NetworkError> {
        self.delete(&format!("turmas/{id}")).await
    }

    // ========== Students ==========

    pub async fn students(&self) -> Result<Vec<Student>, NetworkError> {
        self.get("students", &[]).await
    }

    pub async fn create_student(&self, input: &StudentInput) -> Result<Student, NetworkError> {
        self.post("students", &[], input).await
    }

    pub async fn update_student(&self, id: &str, input: &StudentInput) -> Result<Student, NetworkError> {
        self.put(&format!("students/{id}"), input).await
    }

    pub async fn delete_student(&self, id: &str) -> Result<Acknowledgement, NetworkError> {
        self.delete(&format!("students/{id}")).await
    }

    pub async fn transfer_student(
        &self,
        id: &str,
        new_turma_id: &str,
    ) -> Result<Acknowledgement, NetworkError> {
        self.acknowledged(self.request(
            Method::POST,
            &format!("students/{id}/transfer"),
            &[("nova_turma_id", new_turma_id.to_string())],
        ))
        .await
    }

    // ========== Users ==========

    pub async fn users(&self) -> Result<Vec<User>, NetworkError> {
        self.get("users", &[]).await
    }

    pub async fn create_user(&self, input: &UserInput) -> Result<User, NetworkError> {
        self.post("users", &[], input).await
    }

    pub async fn update_user(&self, id: &str, input: &UserInput) -> Result<User, NetworkError> {
        self.put(&format!("users/{id}"), input).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<Acknowledgement, NetworkError> {
        self.delete(&format!("users/{id}")).await
    }

    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<Acknowledgement, NetworkError> {
        let resource = format!("users/{}/change-password", request.user_id);
        self.acknowledged(self.request(Method::PUT, &resource, &[]).json(request))
            .await
    }

    // ========== Attendance ==========

    pub async fn attendance(
        &self,
        turma_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, NetworkError> {
        self.get(
            "attendance",
            &[("turma_id", turma_id.to_string()), ("data", date.to_string())],
        )
        .await
    }

    pub async fn save_attendance(
        &self,
        turma_id: &str,
        date: NaiveDate,
        user_role: Role,
        user_id: &str,
        entries: &[AttendanceInput],
    ) -> Result<Acknowledgement, NetworkError> {
        let query = [
            ("data", date.to_string()),
            ("user_tipo", user_role.as_wire().to_string()),
            ("user_id", user_id.to_string()),
        ];
        self.acknowledged(
            self.request(Method::POST, &format!("attendance/bulk/{turma_id}"), &query)
                .json(entries),
        )
        .await
    }

    // ========== Revistas ==========

    pub async fn revistas(&self) -> Result<Vec<Revista>, NetworkError> {
        self.get("revistas", &[]).await
    }

    /// Magazine the class is following, if any. A 404, a `null` body or a
    /// magazine without a theme all mean "none".
    pub async fn revista_for_turma(&self, turma_id: &str) -> Result<Option<Revista>, NetworkError> {
        match self.get::<Option<Revista>>(&format!("revistas/turma/{turma_id}"), &[]).await {
            Ok(revista) => Ok(revista.filter(|r| !r.tema.trim().is_empty())),
            Err(e) if e.status() == Some(404) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create_revista(&self, input: &RevistaInput) -> Result<serde_json::Value, NetworkError> {
        self.post("revistas", &[], input).await
    }

    pub async fn update_revista(
        &self,
        id: &str,
        input: &RevistaInput,
    ) -> Result<serde_json::Value, NetworkError> {
        self.put(&format!("revistas/{id}"), input).await
    }

    /// Deactivates the magazine; the backend keeps the record.
    pub async fn delete_revista(&self, id: &str) -> Result<Acknowledgement, NetworkError> {
        self.delete(&format!("revistas/{id}")).await
    }

    // ========== Backup ==========

    pub async fn generate_backup(&self) -> Result<GeneratedBackup, NetworkError> {
        self.get("backup/generate", &[]).await
    }

    /// Replaces every collection on the backend with the content of `backup`.
    pub async fn restore_backup(&self, backup: &serde_json::Value) -> Result<RestoreOutcome, NetworkError> {
        self.post("backup/restore", &[], backup).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;
    use axum::extract::{Path, Query as AxumQuery};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[tokio::test]
    async fn dashboard_sends_date_and_bearer_token() {
        let router = Router::new().route(
            "/api/reports/dashboard",
            get(|headers: HeaderMap, AxumQuery(q): AxumQuery<HashMap<String, String>>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!([{
                    "turma_id": "t-1",
                    "turma_nome": auth,
                    "data": q.get("data").cloned().unwrap_or_default(),
                    "matriculados": 10,
                    "presentes": 5,
                    "total_ofertas": 12.5
                }]))
            }),
        );
        let backend = MockBackend::start(router).await;

        let mut api = ApiClient::new(&backend.base_url()).unwrap();
        api.set_token(Some("tok-1".into()));
        let date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let rows = api.dashboard(date).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].class_name, "Bearer tok-1");
        assert_eq!(rows[0].date, Some(date));
    }

    #[tokio::test]
    async fn error_status_carries_server_detail() {
        let router = Router::new().route(
            "/api/login",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "detail": "Email ou senha incorretos" })),
                )
            }),
        );
        let backend = MockBackend::start(router).await;
        let api = ApiClient::new(&backend.base_url()).unwrap();

        let err = api.login("a@b.c", "wrong").await.unwrap_err();
        assert_eq!(
            err,
            NetworkError::Status {
                status: 401,
                detail: Some("Email ou senha incorretos".into()),
            }
        );
    }

    #[tokio::test]
    async fn error_without_json_body_has_no_detail() {
        let router = Router::new().route(
            "/api/turmas",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let backend = MockBackend::start(router).await;
        let api = ApiClient::new(&backend.base_url()).unwrap();

        let err = api.turmas().await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.detail(), None);
    }

    #[tokio::test]
    async fn schema_mismatch_is_a_decode_error() {
        let router = Router::new().route(
            "/api/students",
            get(|| async { Json(json!({ "unexpected": true })) }),
        );
        let backend = MockBackend::start(router).await;
        let api = ApiClient::new(&backend.base_url()).unwrap();

        let err = api.students().await.unwrap_err();
        assert!(matches!(err, NetworkError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn rankings_fetch_all_three_categories() {
        let router = Router::new().route(
            "/api/ranking/{kind}",
            get(|Path(kind): Path<String>| async move {
                let body: Value = match kind.as_str() {
                    "turmas" => json!([{
                        "turma_id": "t-1",
                        "turma_nome": "Jovens",
                        "matriculados": 20,
                        "media_presencas": 15.5,
                        "percentual_frequencia": 77.5,
                        "domingos_com_dados": 4
                    }]),
                    other => json!([{
                        "aluno_id": format!("{other}-1"),
                        "nome": "Maria",
                        "total_presencas": 4,
                        "domingos_presentes": 4
                    }]),
                };
                Json(body)
            }),
        );
        let backend = MockBackend::start(router).await;
        let api = ApiClient::new(&backend.base_url()).unwrap();

        let rankings = api.rankings().await.unwrap();
        assert_eq!(rankings.students[0].id, "alunos-1");
        assert_eq!(rankings.teachers[0].id, "professores-oficiais-1");
        assert_eq!(rankings.classes[0].class_name, "Jovens");
    }

    #[tokio::test]
    async fn rankings_fail_when_any_category_fails() {
        let router = Router::new().route(
            "/api/ranking/{kind}",
            get(|Path(kind): Path<String>| async move {
                if kind == "professores-oficiais" {
                    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "boom" })))
                } else {
                    (StatusCode::OK, Json(json!([])))
                }
            }),
        );
        let backend = MockBackend::start(router).await;
        let api = ApiClient::new(&backend.base_url()).unwrap();

        let err = api.rankings().await.unwrap_err();
        assert_eq!(err.detail(), Some("boom"));
    }

    #[tokio::test]
    async fn bulk_attendance_sends_query_and_body() {
        let router = Router::new().route(
            "/api/attendance/bulk/{turma_id}",
            post(
                |Path(turma_id): Path<String>,
                 AxumQuery(q): AxumQuery<HashMap<String, String>>,
                 Json(body): Json<Vec<Value>>| async move {
                    Json(json!({
                        "message": format!(
                            "{turma_id}|{}|{}|{}|{}|{}",
                            q["data"], q["user_tipo"], q["user_id"], body.len(), body[0]["status"]
                        )
                    }))
                },
            ),
        );
        let backend = MockBackend::start(router).await;
        let api = ApiClient::new(&backend.base_url()).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let entries = vec![AttendanceInput {
            aluno_id: "s-1".into(),
            turma_id: "t-1".into(),
            data: date,
            status: AttendanceStatus::Present,
            oferta: rust_decimal::Decimal::ZERO,
            biblias_entregues: 0,
            revistas_entregues: 0,
        }];

        let ack = api
            .save_attendance("t-1", date, Role::Teacher, "u-9", &entries)
            .await
            .unwrap();
        assert_eq!(ack.message, "t-1|2025-03-02|professor|u-9|1|\"presente\"");
    }

    #[tokio::test]
    async fn class_without_magazine_yields_none() {
        let router = Router::new().route(
            "/api/revistas/turma/{id}",
            get(|Path(id): Path<String>| async move {
                match id.as_str() {
                    "t-1" => (
                        StatusCode::OK,
                        Json(json!({
                            "id": "r-1",
                            "tema": "Os Profetas Menores",
                            "turma_ids": ["t-1"],
                            "licoes": [{ "titulo": "Oseias", "data": "2025-03-09" }]
                        })),
                    ),
                    "t-2" => (StatusCode::OK, Json(json!({ "tema": "" }))),
                    "t-3" => (StatusCode::OK, Json(Value::Null)),
                    _ => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Revista não encontrada" }))),
                }
            }),
        );
        let backend = MockBackend::start(router).await;
        let api = ApiClient::new(&backend.base_url()).unwrap();

        let revista = api.revista_for_turma("t-1").await.unwrap().unwrap();
        assert_eq!(revista.tema, "Os Profetas Menores");
        assert_eq!(revista.licoes.len(), 1);
        assert_eq!(api.revista_for_turma("t-2").await.unwrap(), None);
        assert_eq!(api.revista_for_turma("t-3").await.unwrap(), None);
        assert_eq!(api.revista_for_turma("t-9").await.unwrap(), None);
    }

    #[tokio::test]
    async fn restore_posts_the_backup_document_untouched() {
        let router = Router::new()
            .route(
                "/api/backup/generate",
                get(|| async {
                    Json(json!({
                        "success": true,
                        "backup": { "metadata": { "total_records": 3 }, "data": { "turmas": [{}, {}, {}] } },
                        "filename": "ebd_backup_20250309.json",
                        "size_mb": 0.01,
                        "summary": { "users": 0, "turmas": 3, "students": 0, "attendance": 0, "revistas": 0 }
                    }))
                }),
            )
            .route(
                "/api/backup/restore",
                post(|Json(body): Json<Value>| async move {
                    let turmas = body["data"]["turmas"].as_array().map_or(0, Vec::len);
                    Json(json!({
                        "success": true,
                        "restore_summary": { "turmas": turmas },
                        "total_restored": turmas
                    }))
                }),
            );
        let backend = MockBackend::start(router).await;
        let api = ApiClient::new(&backend.base_url()).unwrap();

        let generated = api.generate_backup().await.unwrap();
        assert!(generated.success);
        assert_eq!(generated.summary.turmas, 3);
        let document = generated.backup.unwrap();

        let outcome = api.restore_backup(&document).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.restore_summary.get("turmas"), Some(&3));
        assert_eq!(outcome.total_restored, 3);
    }

    #[test]
    fn base_url_is_normalised() {
        let api = ApiClient::new("http://localhost:8001/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:8001");
        assert_eq!(api.url("/turmas"), "http://localhost:8001/api/turmas");
    }
}
