pub mod common;
pub mod configs;
pub mod errors;
pub mod events;
pub mod hashing;
pub mod risk;
pub mod roles;
pub mod strategy;

pub use common::*;
pub use configs::*;
pub use errors::*;
pub use events::*;
pub use risk::*;
pub use roles::*;
pub use strategy::*;
