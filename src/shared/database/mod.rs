pub mod connection;

pub use connection::{create_tables, initialize_database};
