use serde_json::Value;

use super::PayloadError;
use crate::models::Document;

pub const PLACE_ORDER: &str = "place_order";
pub const LIST_ORDERS: &str = "list_orders";

pub const ORDER_PLACED: &str = "Order placed successfully";

pub const CUSTOMER_NAME: &str = "customerName";
pub const CART: &str = "cart";

/// Validate an order body and return it as the document to store.
///
/// The body is kept verbatim; only `customerName` (non-empty string) and
/// `cart` (non-empty array) are checked. Cart entries are not checked
/// against the catalog.
pub fn order_from_body(body: Value) -> Result<Document, PayloadError> {
    let has_customer = body
        .get(CUSTOMER_NAME)
        .and_then(Value::as_str)
        .is_some_and(|name| !name.is_empty());
    let has_cart = body
        .get(CART)
        .and_then(Value::as_array)
        .is_some_and(|cart| !cart.is_empty());

    if !has_customer || !has_cart {
        return Err(PayloadError::InvalidOrder);
    }

    Document::try_from(body).map_err(|_| PayloadError::InvalidOrder)
}
