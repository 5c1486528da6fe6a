pub mod completion;
pub mod event_bus;
pub mod frame;
pub mod loading;

pub use completion::*;
pub use event_bus::*;
pub use frame::*;
pub use loading::*;
