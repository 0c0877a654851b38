//! Turn-based USSD registration of health workers.
//!
//! Each inbound message is one [`orchestrator::InboundTurn`]. The
//! [`orchestrator::Orchestrator`] moves the sender's persisted
//! [`session::UserSession`] through the [`registration`] dialogue graph and
//! returns a reply of at most 163 characters.

pub mod cli;
pub mod config;
pub mod dialogue;
pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod notify;
pub mod orchestrator;
pub mod pagination;
pub mod registration;
pub mod session;
pub mod ui;
pub mod value;
