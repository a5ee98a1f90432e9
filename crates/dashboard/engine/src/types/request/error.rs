use std::borrow::Cow;

/// Errors that can occur when validating the submit form.
///
/// The messages are shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitFormError {
    /// The recipient is not a well-formed address.
    #[error("Recipient address is invalid.")]
    InvalidRecipient,

    /// The amount is not a non-negative decimal with at most 18 fractional digits.
    #[error("Value \"{0}\" is not a valid ETH amount.")]
    InvalidValue(Cow<'static, str>),

    /// The calldata is not `0x`-prefixed, even-length hex.
    #[error("dataHex must be valid hex starting with 0x.")]
    InvalidData,
}

impl SubmitFormError {
    pub(crate) fn invalid_value<E>(input: E) -> Self
    where
        Cow<'static, str>: From<E>,
    {
        Self::InvalidValue(input.into())
    }
}
