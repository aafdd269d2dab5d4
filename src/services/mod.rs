pub mod data_persistance;
pub mod quest_parser;
pub mod roster;
pub mod session;
pub mod tracker;

pub use data_persistance::*;
pub use quest_parser::*;
pub use roster::*;
pub use session::*;
pub use tracker::*;
