use std::borrow::Cow;

pub type Result<T, E = DashboardRuntimeError> = core::result::Result<T, E>;

/// Errors that can occur in the dashboard runtime.
#[derive(Debug, thiserror::Error)]
pub enum DashboardRuntimeError {
    /// Error sending a response back through the oneshot channel.
    ///
    /// The caller dropped its receiver before the response was ready.
    #[error("sender error: {0}")]
    Sender(Cow<'static, str>),
}

impl DashboardRuntimeError {
    /// Creates a `Sender` error naming what could not be sent.
    pub fn sender<E>(err: E) -> Self
    where
        Cow<'static, str>: From<E>,
    {
        Self::Sender(err.into())
    }
}
