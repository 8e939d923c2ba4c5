pub mod calculator;
pub mod models;
pub mod scheduler;
pub mod signal;
