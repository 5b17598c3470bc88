// Domain layer - pure data model, no I/O
pub mod quality;
pub mod reading;
