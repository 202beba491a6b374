//! Daemon and cli that keep a daily work session within a configured limit.
//! The daemon samples user inactivity every second, credits time to work, break or idle, and
//! reminds the user once the limit is exceeded. Days start at a configurable reset time rather
//! than at midnight.

pub mod cli;
pub mod daemon;
pub mod engine;
pub mod idle_api;
pub mod notification;
pub mod settings;
pub mod storage;
pub mod utils;
