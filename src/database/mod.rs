pub mod connection;
#[cfg(test)]
pub(crate) mod memory;
pub mod models;
