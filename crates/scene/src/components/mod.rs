pub mod content;
pub mod transform;

pub use content::*;
pub use transform::*;
