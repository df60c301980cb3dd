// Domain layer - Core types and validation rules

pub mod model;
pub mod rules;
