
pub mod connection;
pub use connection::{
    Connection,
    TestHandle,
};

pub mod results;
pub use results::QueryError;

pub mod schema;
pub mod seed;

pub mod due_items;
