// Domain layer: persisted and upstream models plus the ports the pipeline is generic over.

pub mod model;
pub mod ports;
