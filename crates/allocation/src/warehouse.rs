use std::collections::HashMap;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use stockroute_core::{DomainError, DomainResult, ItemName, Quantity, WarehouseName};

/// A named stock location with per-item quantities.
///
/// Items missing from `inventory` are treated as zero stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWarehouse")]
pub struct Warehouse {
    name: WarehouseName,
    inventory: HashMap<ItemName, Quantity>,
}

/// Wire shape of a warehouse before the stock list is checked for repeats.
#[derive(Deserialize)]
struct RawWarehouse {
    name: WarehouseName,
    #[serde(default)]
    inventory: StockEntries,
}

/// Stock map read entry by entry, so repeated keys survive to validation.
#[derive(Default)]
struct StockEntries(Vec<(ItemName, Quantity)>);

impl<'de> Deserialize<'de> for StockEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StockVisitor;

        impl<'de> Visitor<'de> for StockVisitor {
            type Value = StockEntries;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of item name to quantity")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<StockEntries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<ItemName, Quantity>()? {
                    entries.push(entry);
                }
                Ok(StockEntries(entries))
            }
        }

        deserializer.deserialize_map(StockVisitor)
    }
}

impl TryFrom<RawWarehouse> for Warehouse {
    type Error = DomainError;

    fn try_from(raw: RawWarehouse) -> Result<Self, Self::Error> {
        Self::from_entries(raw.name, raw.inventory.0)
    }
}

impl Warehouse {
    pub fn new(name: WarehouseName) -> Self {
        Self {
            name,
            inventory: HashMap::new(),
        }
    }

    /// Build a warehouse from raw `(item, quantity)` pairs, validating both.
    pub fn from_pairs<I, S>(name: impl Into<String>, stock: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let name = WarehouseName::new(name)?;
        let entries = stock
            .into_iter()
            .map(|(item, quantity)| -> DomainResult<(ItemName, Quantity)> {
                Ok((ItemName::new(item)?, Quantity::new(quantity)?))
            })
            .collect::<DomainResult<Vec<_>>>()?;
        Self::from_entries(name, entries)
    }

    /// Build a warehouse from validated stock entries; an item may appear once.
    pub fn from_entries(
        name: WarehouseName,
        entries: impl IntoIterator<Item = (ItemName, Quantity)>,
    ) -> DomainResult<Self> {
        let mut warehouse = Self::new(name);
        for (item, quantity) in entries {
            if warehouse.inventory.contains_key(&item) {
                return Err(DomainError::conflict(format!(
                    "item '{item}' listed twice for warehouse '{}'",
                    warehouse.name
                )));
            }
            warehouse.inventory.insert(item, quantity);
        }
        Ok(warehouse)
    }

    pub fn name(&self) -> &WarehouseName {
        &self.name
    }

    pub fn inventory(&self) -> &HashMap<ItemName, Quantity> {
        &self.inventory
    }

    pub fn stock_of(&self, item: &str) -> Quantity {
        self.inventory.get(item).copied().unwrap_or(Quantity::ZERO)
    }

    /// Remove up to `wanted` units of `item`; returns how many were taken.
    pub(crate) fn take(&mut self, item: &ItemName, wanted: Quantity) -> Quantity {
        match self.inventory.get_mut(item) {
            Some(available) => {
                let taken = (*available).min(wanted);
                *available = available.saturating_sub(taken);
                taken
            }
            None => Quantity::ZERO,
        }
    }

    pub(crate) fn add_stock(&mut self, item: ItemName, quantity: Quantity) {
        let entry = self.inventory.entry(item).or_insert(Quantity::ZERO);
        *entry = entry.saturating_add(quantity);
    }
}

/// Priority-ordered list of warehouses (cheapest first).
///
/// Warehouse names are unique; this is checked on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Warehouse>", into = "Vec<Warehouse>")]
pub struct Inventory {
    warehouses: Vec<Warehouse>,
}

impl Inventory {
    pub fn new(warehouses: impl IntoIterator<Item = Warehouse>) -> DomainResult<Self> {
        let mut inventory = Self::default();
        for warehouse in warehouses {
            if inventory.get(warehouse.name.as_str()).is_some() {
                return Err(DomainError::conflict(format!(
                    "warehouse '{}' appears more than once",
                    warehouse.name
                )));
            }
            inventory.warehouses.push(warehouse);
        }
        Ok(inventory)
    }

    pub fn warehouses(&self) -> &[Warehouse] {
        &self.warehouses
    }

    pub(crate) fn warehouses_mut(&mut self) -> &mut [Warehouse] {
        &mut self.warehouses
    }

    pub fn get(&self, warehouse: &str) -> Option<&Warehouse> {
        self.warehouses.iter().find(|w| w.name.as_str() == warehouse)
    }

    /// Units of `item` held across every warehouse.
    pub fn total_stock(&self, item: &str) -> Quantity {
        self.warehouses
            .iter()
            .fold(Quantity::ZERO, |acc, w| acc.saturating_add(w.stock_of(item)))
    }

    /// Add units of `item` to an existing warehouse.
    pub fn restock(
        &mut self,
        warehouse: &WarehouseName,
        item: ItemName,
        quantity: Quantity,
    ) -> DomainResult<()> {
        let target = self
            .warehouses
            .iter_mut()
            .find(|w| &w.name == warehouse)
            .ok_or_else(|| DomainError::not_found(format!("warehouse '{warehouse}'")))?;
        target.add_stock(item, quantity);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.warehouses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warehouses.is_empty()
    }
}

impl TryFrom<Vec<Warehouse>> for Inventory {
    type Error = DomainError;

    fn try_from(warehouses: Vec<Warehouse>) -> Result<Self, Self::Error> {
        Self::new(warehouses)
    }
}

impl From<Inventory> for Vec<Warehouse> {
    fn from(inventory: Inventory) -> Self {
        inventory.warehouses
    }
}
