pub mod clean;
pub mod describe;
pub mod up;
