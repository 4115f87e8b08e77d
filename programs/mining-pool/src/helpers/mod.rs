pub mod cpi;
pub mod math;
pub mod mining;
pub mod signature;
