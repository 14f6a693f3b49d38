pub mod checkout_store;
pub mod models;
pub mod order_numbers;
