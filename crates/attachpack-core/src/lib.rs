pub mod config;
pub mod logging;

pub mod archive;
pub mod auth;
pub mod checksum;
pub mod collect;
pub mod gmail;
pub mod http;
pub mod retry;
