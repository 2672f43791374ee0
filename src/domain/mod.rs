// Domain layer: core models and ports (interfaces). No external dependencies
// beyond chrono/serde for the timestamp and passthrough types.

pub mod model;
pub mod ports;
