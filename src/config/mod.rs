pub mod lift_config;

pub use lift_config::LiftConfig;
