pub mod converter;
pub mod geodesy;
pub mod local;
pub mod mat4;
pub mod projection;
pub mod quat;
pub mod vec;

pub use converter::*;
pub use geodesy::*;
pub use local::*;
pub use mat4::*;
pub use projection::*;
pub use quat::*;
pub use vec::*;
