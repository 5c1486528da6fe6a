pub mod components;
pub mod host;
pub mod object;
pub mod tracking;
pub mod world;

pub use host::*;
pub use object::*;
pub use tracking::*;
pub use world::*;
