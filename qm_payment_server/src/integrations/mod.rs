mod square;

pub use square::build_payment_link_request;
