//! Types shared by the OpenVidu client crates: REST wire protocol and
//! client configuration.

pub mod config;
pub mod protocol;
