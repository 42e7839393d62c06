use serde::Serialize;

use crate::models::order::OrderItem;

pub const DEFAULT_DELIVERY_FEE: f64 = 50.0;
pub const DEFAULT_TAX: f64 = 40.0;

/// Checkout breakdown the client shows before placing an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub tax: f64,
    pub total: f64,
}

pub fn quote(items: &[OrderItem], delivery_fee: f64, tax: f64) -> Quote {
    let subtotal: f64 = items.iter().map(OrderItem::subtotal).sum();

    Quote {
        subtotal,
        delivery_fee,
        tax,
        total: subtotal + delivery_fee + tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: u32, unit_price: f64) -> OrderItem {
        OrderItem {
            name: name.to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn default_cart_totals_590() {
        let cart = [
            item("Hakka Noodles", 1, 220.0),
            item("Chicken Fried Rice", 1, 280.0),
        ];

        let quote = quote(&cart, DEFAULT_DELIVERY_FEE, DEFAULT_TAX);
        assert_eq!(quote.subtotal, 500.0);
        assert_eq!(quote.total, 590.0);
    }

    #[test]
    fn quantity_multiplies_unit_price() {
        let quote = quote(&[item("Momos", 3, 120.0)], 0.0, 0.0);
        assert_eq!(quote.subtotal, 360.0);
        assert_eq!(quote.total, 360.0);
    }
}
