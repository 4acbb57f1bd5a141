pub mod inventory;
pub mod pricing;
pub mod product;

pub use inventory::{SeatCode, SeatCodeError, SeatMapSnapshot};
pub use pricing::{PriceBreakdown, PricingConfig, PricingEngine};
pub use product::{Addon, AddonCatalog, AddonCategory, SelectedAddon};
