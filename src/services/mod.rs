pub mod codes;
pub mod summary;
