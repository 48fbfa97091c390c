// Domain layer: records, generated documents and the ports the core talks through.

pub mod model;
pub mod ports;
