pub mod errors;
pub mod numeric;
pub mod ports;
pub mod types;
