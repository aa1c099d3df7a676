pub mod core;
pub mod halaqas;
pub mod periods;
pub mod progress;
pub mod students;
pub mod teachers;
pub mod views;
