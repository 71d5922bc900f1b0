pub mod fixed;
pub mod tiered;
