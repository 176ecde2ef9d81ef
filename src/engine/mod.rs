pub mod report;
pub mod types;
pub mod walls;
