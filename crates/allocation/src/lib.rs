//! Order allocation across priority-ordered warehouses.
//!
//! Pure, deterministic domain logic (no IO, no storage). Given an order and a
//! cheapest-first warehouse list, [`fulfill_order`] decides whether the order
//! can ship in full and, if so, which warehouse supplies which units.

pub mod allocator;
pub mod order;
pub mod plan;
pub mod store;
pub mod warehouse;

pub use allocator::{Allocation, Shortfall, fulfill_order};
pub use order::{Order, OrderLine};
pub use plan::{AllocationEntry, AllocationPlan};
pub use store::InventoryStore;
pub use warehouse::{Inventory, Warehouse};
