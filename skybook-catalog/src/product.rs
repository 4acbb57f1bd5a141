use serde::{Deserialize, Serialize};

/// Add-on categories. Everything except `Service` is bought per passenger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AddonCategory {
    Baggage,
    Meal,
    Service,
}

/// Optional paid extra offered during booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Addon {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category: AddonCategory,
}

impl Addon {
    pub fn new(id: &str, name: &str, description: &str, price_cents: i64, category: AddonCategory) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price_cents,
            category,
        }
    }

    pub fn is_quantity_adjustable(&self) -> bool {
        self.category != AddonCategory::Service
    }

    /// Clamp a requested quantity into what this add-on allows for the party size.
    pub fn clamp_quantity(&self, requested: u32, passenger_count: usize) -> u32 {
        if !self.is_quantity_adjustable() {
            return 1;
        }
        let max = u32::try_from(passenger_count).unwrap_or(u32::MAX).max(1);
        requested.clamp(1, max)
    }
}

/// An add-on on the booking draft together with how many were bought.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedAddon {
    pub addon: Addon,
    pub quantity: u32,
}

impl SelectedAddon {
    pub fn new(addon: Addon, quantity: u32) -> Self {
        Self { addon, quantity }
    }

    pub fn line_total_cents(&self) -> i64 {
        self.addon.price_cents * i64::from(self.quantity)
    }
}

/// Add-ons on sale for a flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonCatalog {
    addons: Vec<Addon>,
}

impl AddonCatalog {
    pub fn new(addons: Vec<Addon>) -> Self {
        Self { addons }
    }

    pub fn get(&self, id: &str) -> Option<&Addon> {
        self.addons.iter().find(|a| a.id == id)
    }

    pub fn all(&self) -> &[Addon] {
        &self.addons
    }

    /// Convenience for UI handlers that only hold an id and a quantity.
    pub fn select(&self, id: &str, quantity: u32) -> Option<SelectedAddon> {
        self.get(id).map(|addon| SelectedAddon::new(addon.clone(), quantity))
    }
}

impl Default for AddonCatalog {
    fn default() -> Self {
        Self::new(vec![
            Addon::new("extra_baggage", "Extra Baggage", "Additional 15kg baggage allowance", 2500, AddonCategory::Baggage),
            Addon::new("meal_veg", "Vegetarian Meal", "Fresh vegetarian meal prepared onboard", 1500, AddonCategory::Meal),
            Addon::new("meal_nonveg", "Non-Vegetarian Meal", "Delicious non-vegetarian meal", 1800, AddonCategory::Meal),
            Addon::new("priority_boarding", "Priority Boarding", "Board the aircraft first and get settled in", 1200, AddonCategory::Service),
            Addon::new("lounge_access", "Airport Lounge Access", "Relax in premium airport lounge before your flight", 3500, AddonCategory::Service),
        ])
    }
}
