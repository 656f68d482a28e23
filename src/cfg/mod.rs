// src/cfg/mod.rs
pub mod credentials;
pub mod env_file;
pub mod error;
pub mod net_cfg;
pub mod topic;
