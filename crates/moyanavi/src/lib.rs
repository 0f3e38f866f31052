pub mod agent;
pub mod config;
pub mod errors;
pub mod search;
pub mod session;
pub mod trace;
