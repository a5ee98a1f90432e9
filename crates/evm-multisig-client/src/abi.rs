//! Solidity interface of the multisig wallet contract.
//!
//! The contract exposes owners only by index, so there is no owner count accessor here.

#![allow(missing_docs)]

alloy_sol_types::sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IMultisig {
        function owners(uint256 index) external view returns (address);
        function threshold() external view returns (uint256);
        function getTransactionCount() external view returns (uint256);
        function transactions(uint256 txId)
            external
            view
            returns (address to, uint256 value, bytes data, bool executed, uint256 numApprovals);
        function approved(uint256 txId, address owner) external view returns (bool);

        function submit(address to, uint256 value, bytes data) external;
        function approve(uint256 txId) external;
        function execute(uint256 txId) external;
    }
}
