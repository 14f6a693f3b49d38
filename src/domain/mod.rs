pub mod checkout;
pub mod errors;
pub mod partition;
pub mod ports;
pub mod validate;
