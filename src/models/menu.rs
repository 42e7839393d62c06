use serde::Serialize;

use crate::models::order::OrderItem;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub id: u32,
    pub name: &'static str,
    pub price: f64,
    /// Emoji shown in place of a photo.
    pub image: &'static str,
    pub description: &'static str,
    pub rating: f64,
    /// Preparation plus delivery window, e.g. `"25-30 min"`.
    pub time: &'static str,
}

impl MenuItem {
    pub fn order_item(&self, quantity: u32) -> OrderItem {
        OrderItem {
            name: self.name.to_string(),
            quantity,
            unit_price: self.price,
        }
    }
}

/// Fixed catalogue shown on the home screen.
pub static FEATURED_ITEMS: [MenuItem; 3] = [
    MenuItem {
        id: 1,
        name: "Margherita Pizza",
        price: 299.0,
        image: "🍕",
        description: "Fresh tomatoes, mozzarella, basil",
        rating: 4.8,
        time: "25-30 min",
    },
    MenuItem {
        id: 2,
        name: "Chicken Biryani",
        price: 350.0,
        image: "🍛",
        description: "Aromatic basmati rice with tender chicken",
        rating: 4.9,
        time: "30-35 min",
    },
    MenuItem {
        id: 3,
        name: "Garlic Bread",
        price: 120.0,
        image: "🥖",
        description: "Crispy bread with garlic butter",
        rating: 4.6,
        time: "15-20 min",
    },
];
