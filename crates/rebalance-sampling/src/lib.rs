//! Resamplers for imbalanced classification.
//!
//! Every sampler implements [`Sampler`]; which classes it touches is chosen
//! by a [`SamplingStrategy`].

pub mod strategy;
pub mod sampler;
pub mod random;
pub mod tomek;
pub mod smote;

pub use strategy::{SamplingKind, SamplingStrategy};
pub use sampler::{NoResampling, Resampled, Sampler};
pub use random::{RandomOverSampler, RandomUnderSampler};
pub use tomek::TomekLinks;
pub use smote::Smote;
