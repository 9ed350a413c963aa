// Logwatch application support: layered configuration for both binaries

pub mod config;

pub use config::LogwatchConfig;
