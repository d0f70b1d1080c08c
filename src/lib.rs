pub mod bounds_detector;
pub mod comms;
pub mod config;
pub mod error;
pub mod strategy;
pub mod threat;
pub mod vec2;
pub mod world;

pub use bounds_detector::*;
pub use comms::*;
pub use config::*;
pub use error::*;
pub use strategy::*;
pub use threat::*;
pub use vec2::*;
pub use world::*;
