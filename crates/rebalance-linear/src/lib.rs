pub mod solve;
pub mod logistic;

pub use solve::*;
pub use logistic::*;
