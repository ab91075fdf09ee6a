use std::sync::{Mutex, MutexGuard};

use stockroute_core::{DomainError, DomainResult, ItemName, Quantity, WarehouseName};

use crate::order::Order;
use crate::plan::AllocationPlan;
use crate::warehouse::Inventory;

/// Shared stock pool with serialized allocation.
///
/// Each call holds the lock for one full allocation, so concurrent orders
/// never draw on the same units.
#[derive(Debug, Default)]
pub struct InventoryStore {
    inventory: Mutex<Inventory>,
}

impl InventoryStore {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory: Mutex::new(inventory),
        }
    }

    fn lock(&self) -> DomainResult<MutexGuard<'_, Inventory>> {
        self.inventory
            .lock()
            .map_err(|_| DomainError::invariant("inventory lock poisoned"))
    }

    /// Allocate and commit `order`. Returns an empty plan when it cannot be fulfilled.
    pub fn allocate(&self, order: &Order) -> DomainResult<AllocationPlan> {
        let mut inventory = self.lock()?;
        Ok(inventory.commit(order))
    }

    pub fn restock(
        &self,
        warehouse: &WarehouseName,
        item: ItemName,
        quantity: Quantity,
    ) -> DomainResult<()> {
        self.lock()?.restock(warehouse, item, quantity)
    }

    pub fn snapshot(&self) -> DomainResult<Inventory> {
        Ok(self.lock()?.clone())
    }

    pub fn into_inner(self) -> DomainResult<Inventory> {
        self.inventory
            .into_inner()
            .map_err(|_| DomainError::invariant("inventory lock poisoned"))
    }
}
