pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod ffmpeg;
pub mod http;
pub mod observability;
pub mod openai;
pub mod queue;
pub mod service;
pub mod summarize;
pub mod transcribe;
pub mod ui;
pub mod worker;
