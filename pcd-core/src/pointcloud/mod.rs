pub mod compression;
pub mod point;
