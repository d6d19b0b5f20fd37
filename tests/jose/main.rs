mod algorithms;
mod claims;
mod e2e;
mod fixtures;
mod key_set;
mod keys;
