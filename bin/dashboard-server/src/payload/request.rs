use dissolve_derive::Dissolve;
use evm_multisig_dashboard_engine::request::{
    ApproveMultisigTxRequest, ExecuteMultisigTxRequest, SetAccountLabelRequest,
    SubmitMultisigTxRequest,
};
use serde::Deserialize;

/// Submit form inputs, passed through as typed.
#[derive(Debug, Deserialize, Dissolve)]
pub struct SubmitMultisigTxRequestPayload {
    to: String,

    #[serde(default)]
    value_eth: String,

    #[serde(default)]
    data_hex: String,
}

#[derive(Debug, Deserialize, Dissolve)]
pub struct ApproveMultisigTxRequestPayload {
    tx_id: u64,
}

#[derive(Debug, Deserialize, Dissolve)]
pub struct ExecuteMultisigTxRequestPayload {
    tx_id: u64,
}

#[derive(Debug, Deserialize, Dissolve)]
pub struct SetAccountLabelRequestPayload {
    label: String,
}

impl From<SubmitMultisigTxRequestPayload> for SubmitMultisigTxRequest {
    fn from(payload: SubmitMultisigTxRequestPayload) -> Self {
        let SubmitMultisigTxRequestPayloadDissolved { to, value_eth, data_hex } = payload.dissolve();

        SubmitMultisigTxRequest::builder().to(to).value_eth(value_eth).data_hex(data_hex).build()
    }
}

impl From<ApproveMultisigTxRequestPayload> for ApproveMultisigTxRequest {
    fn from(payload: ApproveMultisigTxRequestPayload) -> Self {
        ApproveMultisigTxRequest::builder().tx_id(payload.tx_id).build()
    }
}

impl From<ExecuteMultisigTxRequestPayload> for ExecuteMultisigTxRequest {
    fn from(payload: ExecuteMultisigTxRequestPayload) -> Self {
        ExecuteMultisigTxRequest::builder().tx_id(payload.tx_id).build()
    }
}

impl From<SetAccountLabelRequestPayload> for SetAccountLabelRequest {
    fn from(payload: SetAccountLabelRequestPayload) -> Self {
        SetAccountLabelRequest::builder().label(payload.label).build()
    }
}
