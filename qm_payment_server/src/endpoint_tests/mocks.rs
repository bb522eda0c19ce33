use mockall::mock;
use qm_payment_engine::{
    db_types::{Customer, NewCustomer, NewOrder, NewOrderItem, Order, OrderId, OrderItem, PaymentStatus, Product},
    traits::{CheckoutDatabase, CheckoutError},
};
use square_tools::{OrderLookup, SquareApiError};

mock! {
    pub CheckoutDb {}

    impl Clone for CheckoutDb {
        fn clone(&self) -> Self;
    }

    impl CheckoutDatabase for CheckoutDb {
        fn url(&self) -> &str;
        async fn upsert_customer(&self, customer: NewCustomer) -> Result<Customer, CheckoutError>;
        async fn fetch_product_by_slug(&self, slug: &str) -> Result<Option<Product>, CheckoutError>;
        async fn insert_order(&self, order: NewOrder, items: &[NewOrderItem]) -> Result<(Order, Vec<OrderItem>), CheckoutError>;
        async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutError>;
        async fn fetch_order_by_square_order_id(&self, square_order_id: &str) -> Result<Option<Order>, CheckoutError>;
        async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, CheckoutError>;
        async fn attach_square_order(&self, order_id: &OrderId, square_order_id: &str) -> Result<Order, CheckoutError>;
        async fn transition_from_pending(&self, order_id: &OrderId, status: PaymentStatus) -> Result<Option<Order>, CheckoutError>;
        async fn complete_order(&self, order_id: &OrderId, square_order_id: &str, square_payment_id: &str) -> Result<Option<Order>, CheckoutError>;
    }
}

mock! {
    pub OrderLookupClient {}

    impl OrderLookup for OrderLookupClient {
        async fn order_reference(&self, square_order_id: &str) -> Result<Option<String>, SquareApiError>;
    }
}
