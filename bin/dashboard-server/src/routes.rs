use axum::{Json, extract::State, http::StatusCode};

use crate::{
    App, AppDissolved,
    error::AppError,
    payload::{
        ActionStatus,
        request::{
            ApproveMultisigTxRequestPayload, ExecuteMultisigTxRequestPayload,
            SetAccountLabelRequestPayload, SubmitMultisigTxRequestPayload,
        },
        response::{ActionResponsePayload, ConnectWalletResponsePayload, DashboardResponsePayload},
    },
};

#[tracing::instrument]
pub async fn health() -> StatusCode {
    StatusCode::OK
}

#[tracing::instrument(skip_all)]
pub async fn get_dashboard(
    State(app): State<App>,
) -> Result<Json<DashboardResponsePayload>, AppError> {
    let AppDissolved { engine, wallet_connect_project_id } = app.dissolve();

    let dashboard = engine
        .get_dashboard()
        .await
        .inspect_err(|e| tracing::error!("failed to get dashboard: {e}"))?;

    let response = DashboardResponsePayload::builder()
        .dashboard(dashboard)
        .wallet_connect_project_id(wallet_connect_project_id.to_string())
        .build();

    Ok(Json(response))
}

#[tracing::instrument(skip_all)]
pub async fn refresh_dashboard(
    State(app): State<App>,
) -> Result<Json<DashboardResponsePayload>, AppError> {
    let AppDissolved { engine, .. } = app.dissolve();

    let dashboard = engine
        .refresh()
        .await
        .inspect_err(|e| tracing::error!("failed to refresh dashboard: {e}"))?;

    Ok(Json(dashboard.into()))
}

#[tracing::instrument(skip_all)]
pub async fn connect_wallet(
    State(app): State<App>,
) -> Result<(StatusCode, Json<ConnectWalletResponsePayload>), AppError> {
    let AppDissolved { engine, .. } = app.dissolve();

    let response: ConnectWalletResponsePayload = engine
        .connect_wallet()
        .await
        .inspect_err(|e| tracing::error!("failed to connect wallet: {e}"))?
        .into();

    let code = match response.error() {
        None => StatusCode::OK,
        Some(message) => {
            tracing::error!("wallet connection failed: {message}");
            StatusCode::BAD_GATEWAY
        },
    };

    Ok((code, Json(response)))
}

#[tracing::instrument(skip_all)]
pub async fn disconnect_wallet(
    State(app): State<App>,
) -> Result<Json<DashboardResponsePayload>, AppError> {
    let AppDissolved { engine, .. } = app.dissolve();

    let dashboard = engine
        .disconnect_wallet()
        .await
        .inspect_err(|e| tracing::error!("failed to disconnect wallet: {e}"))?;

    Ok(Json(dashboard.into()))
}

#[tracing::instrument(skip_all)]
pub async fn set_account_label(
    State(app): State<App>,
    Json(payload): Json<SetAccountLabelRequestPayload>,
) -> Result<Json<DashboardResponsePayload>, AppError> {
    let AppDissolved { engine, .. } = app.dissolve();

    let dashboard = engine
        .set_account_label(payload.into())
        .await
        .inspect_err(|e| tracing::error!("failed to set account label: {e}"))?;

    Ok(Json(dashboard.into()))
}

#[tracing::instrument(skip_all)]
pub async fn submit_multisig_tx(
    State(app): State<App>,
    Json(payload): Json<SubmitMultisigTxRequestPayload>,
) -> Result<(StatusCode, Json<ActionResponsePayload>), AppError> {
    let AppDissolved { engine, .. } = app.dissolve();

    let response = engine
        .submit_multisig_tx(payload.into())
        .await
        .inspect_err(|e| tracing::error!("failed to submit multisig tx: {e}"))?;

    Ok(action_response(response.into()))
}

#[tracing::instrument(skip_all)]
pub async fn approve_multisig_tx(
    State(app): State<App>,
    Json(payload): Json<ApproveMultisigTxRequestPayload>,
) -> Result<(StatusCode, Json<ActionResponsePayload>), AppError> {
    let AppDissolved { engine, .. } = app.dissolve();

    let response = engine
        .approve_multisig_tx(payload.into())
        .await
        .inspect_err(|e| tracing::error!("failed to approve multisig tx: {e}"))?;

    Ok(action_response(response.into()))
}

#[tracing::instrument(skip_all)]
pub async fn execute_multisig_tx(
    State(app): State<App>,
    Json(payload): Json<ExecuteMultisigTxRequestPayload>,
) -> Result<(StatusCode, Json<ActionResponsePayload>), AppError> {
    let AppDissolved { engine, .. } = app.dissolve();

    let response = engine
        .execute_multisig_tx(payload.into())
        .await
        .inspect_err(|e| tracing::error!("failed to execute multisig tx: {e}"))?;

    Ok(action_response(response.into()))
}

fn action_response(payload: ActionResponsePayload) -> (StatusCode, Json<ActionResponsePayload>) {
    let outcome = payload.outcome();

    let code = match outcome.status() {
        ActionStatus::Settled => StatusCode::OK,
        ActionStatus::Rejected => StatusCode::BAD_REQUEST,
        ActionStatus::Busy => StatusCode::CONFLICT,
        ActionStatus::Failed => StatusCode::BAD_GATEWAY,
    };

    if code.is_server_error() {
        tracing::error!("action failed: {outcome:?}");
    } else if code.is_client_error() {
        tracing::warn!("action refused: {outcome:?}");
    }

    (code, Json(payload))
}
