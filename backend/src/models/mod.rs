//! Domain model of the review scheduling engine.

pub mod faculty;
pub mod ids;
pub mod macros;
pub mod review;
pub mod schedule;
pub mod team;

pub use faculty::*;
pub use ids::*;
pub use review::*;
pub use schedule::*;
pub use team::*;
