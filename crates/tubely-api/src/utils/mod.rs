pub mod staging;
pub mod upload;
