mod credentials;
mod load;
