
// Operations
mod operations;
pub use operations::*;

// Models
mod due_items;
pub use due_items::*;

pub mod datetime;
