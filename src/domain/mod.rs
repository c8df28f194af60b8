// Domain layer: news models and ports. No HTTP or protocol types leak in here.

pub mod model;
pub mod ports;
