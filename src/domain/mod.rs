pub mod quest;

pub use quest::*;
