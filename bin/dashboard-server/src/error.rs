use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use evm_multisig_dashboard_engine::DashboardEngineError;

#[derive(Debug, thiserror::Error)]
pub(crate) enum AppError {
    #[error("dashboard engine error: {0}")]
    DashboardEngine(Box<DashboardEngineError>),
}

impl From<DashboardEngineError> for AppError {
    fn from(err: DashboardEngineError) -> Self {
        Self::DashboardEngine(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = match self {
            AppError::DashboardEngine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!("server error: {self}");

        (code, self.to_string()).into_response()
    }
}
