pub mod block;
pub mod chain;
pub mod config;
pub mod error;
pub mod http;
pub mod ledger;
pub mod quality;
pub mod query;
pub mod service;
