mod checkout_database;

pub use checkout_database::{CheckoutDatabase, CheckoutError};
