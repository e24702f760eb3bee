pub mod course;
pub mod module;
pub mod prediction;
pub mod user;
