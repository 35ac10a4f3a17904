pub mod stats;
pub mod container;
pub mod event;

pub use stats::*;
pub use container::*;
pub use event::*;
