mod discovery;
mod email_client;
mod launch;
