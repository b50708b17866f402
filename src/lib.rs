pub mod config;
pub mod control;
pub mod logger;
pub mod measurement;
pub mod sampler;
pub mod sensor;
pub mod store;
