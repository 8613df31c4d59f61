//! Menu catalog port.
//!
//! Order creation validates line items against the menu; the catalog itself
//! (inventory CRUD) is an external collaborator.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::shared::{MenuItemId, Money, RestaurantId};

/// A menu item as the catalog knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Item id.
    pub id: MenuItemId,
    /// Restaurant selling the item.
    pub restaurant_id: RestaurantId,
    /// Current unit price.
    pub unit_price: Money,
}

/// Port to the menu catalog.
#[async_trait]
pub trait MenuCatalogPort: Send + Sync {
    /// Look up a menu item by id.
    async fn find_item(&self, id: &MenuItemId) -> Option<MenuItem>;
}

/// In-memory menu catalog for tests and development.
#[derive(Debug, Default)]
pub struct InMemoryMenuCatalog {
    items: RwLock<HashMap<String, MenuItem>>,
}

impl InMemoryMenuCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the catalog.
    pub fn add(&self, item: MenuItem) {
        #[allow(clippy::unwrap_used)]
        let mut items = self.items.write().unwrap();
        items.insert(item.id.as_str().to_string(), item);
    }
}

#[async_trait]
impl MenuCatalogPort for InMemoryMenuCatalog {
    async fn find_item(&self, id: &MenuItemId) -> Option<MenuItem> {
        #[allow(clippy::unwrap_used)]
        let items = self.items.read().unwrap();
        items.get(id.as_str()).cloned()
    }
}
