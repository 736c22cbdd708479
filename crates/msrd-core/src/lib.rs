pub mod config;
pub mod error;
pub mod logging;

// Orchestration core
pub mod codec;
pub mod dedup;
pub mod dispatcher;
pub mod job;
pub mod plan;
pub mod policy;
pub mod report;
pub mod resolver;

// Collaborators
pub mod assets;
pub mod cache;
pub mod catalog;
pub mod http;
pub mod storage;
