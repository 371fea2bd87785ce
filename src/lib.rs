pub mod activity;
pub mod apis;
pub mod config;
pub mod errors;
pub mod holders;
pub mod logger;
pub mod pipeline;
pub mod receipts;
pub mod reconcile;
pub mod report;
pub mod transfers;
pub mod types;
