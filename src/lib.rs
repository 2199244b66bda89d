pub mod component;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod math;
pub mod region;
pub mod registry;

pub use error::{McgeomError, Result};
