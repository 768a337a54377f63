//! cfseeker - find where Cloud Foundry apps are running
//!
//! Resolves an app, by GUID or by org/space/app name, to its running
//! instances and, with a BOSH director configured, to the VMs hosting them.

pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod remote;
pub mod seeker;
pub mod ui;

pub use error::{SeekerError, SeekerResult};
pub use seeker::Seeker;
