use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockroute_core::{ItemName, Quantity, WarehouseName};

/// Units taken from one warehouse, per item.
///
/// Never holds a zero quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    warehouse: WarehouseName,
    items: HashMap<ItemName, Quantity>,
}

impl AllocationEntry {
    fn new(warehouse: WarehouseName) -> Self {
        Self {
            warehouse,
            items: HashMap::new(),
        }
    }

    pub fn warehouse(&self) -> &WarehouseName {
        &self.warehouse
    }

    pub fn items(&self) -> &HashMap<ItemName, Quantity> {
        &self.items
    }

    pub fn quantity_of(&self, item: &str) -> Quantity {
        self.items.get(item).copied().unwrap_or(Quantity::ZERO)
    }
}

/// Ordered warehouse contributions that together satisfy an order.
///
/// Entries are in first-contribution order. An empty plan means nothing is
/// shipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationPlan {
    entries: Vec<AllocationEntry>,
}

impl AllocationPlan {
    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    pub fn get(&self, warehouse: &str) -> Option<&AllocationEntry> {
        self.entries
            .iter()
            .find(|e| e.warehouse.as_str() == warehouse)
    }

    /// Units of `item` allocated across all entries.
    pub fn total_for(&self, item: &str) -> Quantity {
        self.entries
            .iter()
            .fold(Quantity::ZERO, |acc, e| acc.saturating_add(e.quantity_of(item)))
    }

    pub fn warehouse_names(&self) -> impl Iterator<Item = &WarehouseName> {
        self.entries.iter().map(|e| &e.warehouse)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `quantity` units of `item` against `warehouse`.
    ///
    /// Zero quantities are dropped. Each warehouse is visited at most once per
    /// item, so a (warehouse, item) pair is written at most once.
    pub(crate) fn record(&mut self, warehouse: &WarehouseName, item: &ItemName, quantity: Quantity) {
        if quantity.is_zero() {
            return;
        }

        let idx = match self.entries.iter().position(|e| &e.warehouse == warehouse) {
            Some(idx) => idx,
            None => {
                self.entries.push(AllocationEntry::new(warehouse.clone()));
                self.entries.len() - 1
            }
        };

        let previous = self.entries[idx].items.insert(item.clone(), quantity);
        debug_assert!(
            previous.is_none(),
            "warehouse '{warehouse}' recorded item '{item}' twice"
        );
    }
}
