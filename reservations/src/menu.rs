//! The fixed menu shown next to the booking form.

use serde::Serialize;

/// One dish and its price
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// Decorative glyph
    pub icon: &'static str,
    /// Dish name
    pub name: &'static str,
    /// Price in cents
    pub price_cents: u32,
}

impl MenuItem {
    const fn new(icon: &'static str, name: &'static str, price_cents: u32) -> Self {
        Self {
            icon,
            name,
            price_cents,
        }
    }

    /// Price as shown to guests, e.g. `$10` or `$7.50`
    #[must_use]
    pub fn price_label(&self) -> String {
        let (dollars, cents) = (self.price_cents / 100, self.price_cents % 100);
        if cents == 0 {
            format!("${dollars}")
        } else {
            format!("${dollars}.{cents:02}")
        }
    }
}

impl std::fmt::Display for MenuItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} - {}", self.icon, self.name, self.price_label())
    }
}

/// Everything the kitchen serves
pub const MENU: [MenuItem; 6] = [
    MenuItem::new("🍕", "Margherita Pizza", 1000),
    MenuItem::new("🍔", "Cheeseburger", 800),
    MenuItem::new("🍣", "Sushi Platter", 1500),
    MenuItem::new("🥗", "Greek Salad", 700),
    MenuItem::new("🍝", "Spaghetti Carbonara", 1200),
    MenuItem::new("🍹", "Fresh Lemonade", 400),
];
