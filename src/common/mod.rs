pub mod response;
pub mod staging;
