pub mod auth;
pub mod completion;
pub mod config;
pub mod port;
pub mod storage;
