pub mod app;
pub mod rendering;
pub mod simulation;
