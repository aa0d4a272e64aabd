pub mod generate;
pub mod tables;
