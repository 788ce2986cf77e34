//! Client for the Clado deep-research people-search API.
//!
//! A deep-research job is submitted with [`CladoClient::start_deep_research`] and then
//! polled with [`CladoClient::fetch_deep_research`] until it reports a terminal state.

mod clado_url;
mod client;
mod domain;

pub(crate) use clado_url::*;

pub use client::*;
pub use domain::*;
