pub mod config;
pub mod geofence;
pub mod memory;
pub mod mode;
pub mod model;
pub mod overlay;
pub mod session;
pub mod services;

#[cfg(test)]
mod testing;

pub use config::*;
pub use mode::*;
pub use model::*;
pub use overlay::*;
pub use session::*;
pub use services::*;
