mod setup;
pub use setup::*;

mod items;
pub use items::*;
