pub mod artifact;
pub mod experiments;
