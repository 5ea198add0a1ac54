pub mod common;
pub mod geary;
pub mod join_count;
pub mod losh;
