//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu item as seen by the ordering core (菜品)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    pub name: String,
    pub price: f64,
    pub is_available: bool,
    /// No kitchen preparation step (drinks, packaged goods)
    #[serde(default)]
    pub is_quick_serve: bool,
}
