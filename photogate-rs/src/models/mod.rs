pub mod connection;
pub mod errors;
pub mod shutdown;
