//! Request types for dashboard engine operations.

mod error;

pub use self::error::SubmitFormError;

use alloy_primitives::{Address, Bytes, U256, hex, utils};
use bon::Builder;
use dissolve_derive::Dissolve;
use evm_multisig_dashboard_domain::tx::TxId;

/// Number of decimals of the native currency.
const ETHER_DECIMALS: usize = 18;

/// Request to submit a new multisig transaction from the form inputs.
///
/// The inputs are kept as typed by the user; the dashboard stores them as the form draft
/// and validates them with [`SubmitMultisigTxRequest::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Dissolve)]
pub struct SubmitMultisigTxRequest {
    /// Recipient address.
    #[builder(into, default)]
    to: String,

    /// Decimal amount of ether to transfer.
    #[builder(into, default)]
    value_eth: String,

    /// Calldata as `0x`-prefixed hex.
    #[builder(into, default)]
    data_hex: String,
}

/// A submit request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Dissolve)]
pub struct ValidatedSubmit {
    to: Address,
    value: U256,
    data: Bytes,
}

/// Request to approve a transaction.
#[derive(Debug, Clone, Copy, Builder, Dissolve)]
pub struct ApproveMultisigTxRequest {
    /// The transaction to approve.
    #[builder(into)]
    tx_id: TxId,
}

/// Request to execute a transaction.
#[derive(Debug, Clone, Copy, Builder, Dissolve)]
pub struct ExecuteMultisigTxRequest {
    /// The transaction to execute.
    #[builder(into)]
    tx_id: TxId,
}

/// Request to store a display label for the connected account.
#[derive(Debug, Clone, Builder, Dissolve)]
pub struct SetAccountLabelRequest {
    /// The label as typed; blank input removes the stored label.
    #[builder(into)]
    label: String,
}

impl SubmitMultisigTxRequest {
    /// The form as it is reset after a successful submit.
    pub fn reset() -> Self {
        Self { to: String::new(), value_eth: "0".to_owned(), data_hex: "0x".to_owned() }
    }

    /// Returns the recipient input.
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Returns the amount input.
    pub fn value_eth(&self) -> &str {
        &self.value_eth
    }

    /// Returns the calldata input.
    pub fn data_hex(&self) -> &str {
        &self.data_hex
    }

    /// Validates the inputs, in the order recipient, amount, calldata.
    pub fn validate(&self) -> Result<ValidatedSubmit, SubmitFormError> {
        let to = parse_address(&self.to).ok_or(SubmitFormError::InvalidRecipient)?;
        let value = parse_ether_amount(&self.value_eth)?;
        let data = parse_hex_payload(&self.data_hex)?;

        Ok(ValidatedSubmit { to, value, data })
    }
}

impl ValidatedSubmit {
    /// Returns the recipient.
    pub fn to(&self) -> Address {
        self.to
    }

    /// Returns the amount in wei.
    pub fn value(&self) -> U256 {
        self.value
    }

    /// Returns the calldata.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// Parses a `0x`-prefixed 20-byte address.
///
/// All-lowercase and all-uppercase input is accepted as is; mixed case must carry a valid
/// EIP-55 checksum.
pub fn parse_address(input: &str) -> Option<Address> {
    let input = input.trim();
    let digits = input.strip_prefix("0x")?;

    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());

    if has_lower && has_upper {
        Address::parse_checksummed(input, None).ok()
    } else {
        input.parse().ok()
    }
}

/// Converts a decimal ether amount into wei. Empty input is zero.
pub fn parse_ether_amount(input: &str) -> Result<U256, SubmitFormError> {
    let trimmed = input.trim();
    let invalid = || SubmitFormError::invalid_value(trimmed.to_owned());

    if trimmed.is_empty() {
        return Ok(U256::ZERO);
    }

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    if (whole.is_empty() && fraction.is_empty())
        || !digits_only(whole)
        || !digits_only(fraction)
        || fraction.len() > ETHER_DECIMALS
    {
        return Err(invalid());
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized =
        if fraction.is_empty() { whole.to_owned() } else { format!("{whole}.{fraction}") };

    utils::parse_ether(&normalized).map_err(|_| invalid())
}

/// Decodes `0x`-prefixed hex calldata. Empty input is the empty payload.
pub fn parse_hex_payload(input: &str) -> Result<Bytes, SubmitFormError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Ok(Bytes::new());
    }

    let digits = trimmed.strip_prefix("0x").ok_or(SubmitFormError::InvalidData)?;

    if digits.len() % 2 != 0 {
        return Err(SubmitFormError::InvalidData);
    }

    hex::decode(digits).map(Bytes::from).map_err(|_| SubmitFormError::InvalidData)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ether_amounts() {
        assert_eq!(parse_ether_amount("").unwrap(), U256::ZERO);
        assert_eq!(parse_ether_amount("0").unwrap(), U256::ZERO);
        assert_eq!(parse_ether_amount("1").unwrap(), utils::parse_ether("1").unwrap());
        let half = U256::from(500_000_000_000_000_000_u64);

        assert_eq!(parse_ether_amount(" 0.5 ").unwrap(), half);
        assert_eq!(parse_ether_amount(".5").unwrap(), half);
        assert_eq!(parse_ether_amount("2.").unwrap(), utils::parse_ether("2").unwrap());
        assert_eq!(parse_ether_amount("0.000000000000000001").unwrap(), U256::from(1));
    }

    #[test]
    fn rejects_bad_ether_amounts() {
        for input in ["-1", "abc", "1.2.3", ".", "1e18", "0.0000000000000000001", "0x10", "1 000"] {
            assert!(
                matches!(parse_ether_amount(input), Err(SubmitFormError::InvalidValue(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn parses_addresses() {
        let checksummed = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

        assert!(parse_address(checksummed).is_some());
        assert!(parse_address(&checksummed.to_lowercase()).is_some());
        assert!(parse_address(&format!("0x{}", checksummed[2..].to_uppercase())).is_some());
        assert_eq!(parse_address(&format!(" {checksummed} ")), parse_address(checksummed));

        // broken checksum
        assert!(parse_address("0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_none());
        assert!(parse_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_none());
        assert!(parse_address("0x1234").is_none());
        assert!(parse_address("").is_none());
    }

    #[test]
    fn parses_hex_payloads() {
        assert_eq!(parse_hex_payload("").unwrap(), Bytes::new());
        assert_eq!(parse_hex_payload("0x").unwrap(), Bytes::new());
        assert_eq!(
            parse_hex_payload("0xdeadBEEF").unwrap(),
            Bytes::from(vec![0xde, 0xad, 0xbe, 0xef])
        );

        for input in ["deadbeef", "0xabc", "0xzz", "0X12"] {
            assert_eq!(parse_hex_payload(input), Err(SubmitFormError::InvalidData), "{input}");
        }
    }

    #[test]
    fn validation_order_and_messages() {
        let request = SubmitMultisigTxRequest::builder().to("nope").value_eth("-1").build();
        assert_eq!(request.validate().unwrap_err().to_string(), "Recipient address is invalid.");

        let request = SubmitMultisigTxRequest::builder()
            .to("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")
            .value_eth("0.25")
            .data_hex("")
            .build();

        let validated = request.validate().unwrap();
        assert_eq!(validated.value(), U256::from(250_000_000_000_000_000_u64));
        assert!(validated.data().is_empty());

        assert_eq!(SubmitMultisigTxRequest::reset().data_hex(), "0x");
    }
}
