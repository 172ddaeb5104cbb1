// Domain layer: records exchanged between the harvester, the scrapers and the aggregator,
// plus the ports the core is written against.

pub mod model;
pub mod ports;
