//! Domain types for the multisig dashboard.
//!
//! This crate provides the models shared by the dashboard engine and server: connected
//! accounts and their display labels, the target network, contract transactions with their
//! eligibility rules, and the single in-flight write action.

pub mod account;
pub mod action;
pub mod display;
pub mod network;
pub mod tx;
