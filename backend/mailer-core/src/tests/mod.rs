mod config;
mod discovery;
mod email_client;
mod launcher;
