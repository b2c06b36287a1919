// Domain layer: core models and ports (interfaces) for the iVIT-T tools.

pub mod model;
pub mod ports;
