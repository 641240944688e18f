//! Error types shared by the API client, the session store and the config layer.

use thiserror::Error;

/// Failure of a single HTTP call to the EBD backend.
///
/// Clone so it can travel inside UI messages; the transport error is kept as
/// text for that reason.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("sem detalhes"))]
    Status { status: u16, detail: Option<String> },

    /// The request never produced a response (DNS, connect, TLS, ...).
    #[error("Falha de conexão: {0}")]
    Transport(String),

    /// The response body did not match the expected schema.
    #[error("Resposta inválida: {0}")]
    Decode(String),
}

impl NetworkError {
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided `detail`, if the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            NetworkError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Text suitable for a status line: the server detail when present.
    pub fn user_message(&self) -> String {
        self.detail()
            .map(str::to_string)
            .unwrap_or_else(|| self.to_string())
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NetworkError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            NetworkError::Status {
                status: status.as_u16(),
                detail: None,
            }
        } else {
            NetworkError::Transport(err.to_string())
        }
    }
}

/// Fallback shown when the backend rejects a login without a detail.
pub const LOGIN_FALLBACK_MESSAGE: &str = "Erro ao fazer login";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    /// Credentials rejected or the login call failed; carries the message shown
    /// to the user.
    #[error("{0}")]
    Rejected(String),

    #[error("Não foi possível salvar a sessão: {0}")]
    Storage(String),
}

impl From<NetworkError> for AuthError {
    fn from(err: NetworkError) -> Self {
        let message = err
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| LOGIN_FALLBACK_MESSAGE.to_string());
        AuthError::Rejected(message)
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::Storage(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("log file error: {0}")]
    LogFile(#[from] tracing_appender::rolling::InitError),
}

/// Failure while generating, saving, reading or restoring a backup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackupError {
    /// The user closed the file dialog.
    #[error("operação cancelada")]
    Cancelled,

    #[error("Erro ao acessar arquivo: {0}")]
    Io(String),

    #[error("Erro ao ler arquivo: formato JSON inválido")]
    InvalidJson,

    #[error("Arquivo inválido: formato de backup não reconhecido")]
    UnknownFormat,

    /// The backend answered `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("{}", .0.user_message())]
    Network(#[from] NetworkError),
}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        BackupError::Io(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend URL {0:?}: expected http:// or https://")]
    InvalidBackendUrl(String),
}
