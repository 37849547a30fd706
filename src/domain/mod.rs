// Domain layer: models, ports and the pure decision logic. No network or filesystem access here.

pub mod model;
pub mod parity;
pub mod ports;
pub mod query;
pub mod state_machine;
