#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod cfg;

pub use cfg::credentials::Credentials;
pub use cfg::error::ConfigError;
pub use cfg::net_cfg::Key;
