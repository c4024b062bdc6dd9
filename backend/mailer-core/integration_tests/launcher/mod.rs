mod payload;
mod port;
mod readiness;
