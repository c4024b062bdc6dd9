mod payload;
mod spawn;
