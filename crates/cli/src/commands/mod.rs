pub mod ask;
pub mod chat;
pub mod config_cmd;
pub mod demo;
pub mod learn;
pub mod session;
pub mod stats;
pub mod think;
