pub mod app;
pub mod config;
pub mod credentials;
pub mod dedup;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod login;
pub mod options;
pub mod output;
pub mod sample;
pub mod synth;
