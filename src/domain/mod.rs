// Domain layer: subprocess request/response types and the ports tools depend on.

pub mod model;
pub mod ports;
