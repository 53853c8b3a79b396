pub mod encoder;
pub mod split;
pub mod cross_validation;

pub use encoder::*;
pub use split::*;
pub use cross_validation::*;
