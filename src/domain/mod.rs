// Domain layer - Composition model and timing rules

pub mod errors;
pub mod model;
pub mod rules;
