mod config;
mod discovery;
mod email_client;
mod error;
mod helpers;
mod launcher;
mod service;
