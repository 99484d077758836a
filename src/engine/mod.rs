pub mod models;
pub mod simulator;
