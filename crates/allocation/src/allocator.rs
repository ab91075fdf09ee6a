//! Greedy split of an order across priority-ordered warehouses.

use serde::{Deserialize, Serialize};

use stockroute_core::{ItemName, Quantity};

use crate::order::Order;
use crate::plan::AllocationPlan;
use crate::warehouse::Inventory;

/// First item (in order line order) whose total stock cannot cover the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub item: ItemName,
    pub requested: Quantity,
    pub available: Quantity,
}

/// Outcome of [`fulfill_order`]: the plan plus the stock left afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    plan: AllocationPlan,
    inventory: Inventory,
    shortfall: Option<Shortfall>,
}

impl Allocation {
    pub fn plan(&self) -> &AllocationPlan {
        &self.plan
    }

    /// Stock after allocation. Identical to the input when unfulfilled.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn shortfall(&self) -> Option<&Shortfall> {
        self.shortfall.as_ref()
    }

    /// `true` when every line is covered. An order with only zero-quantity
    /// lines is fulfilled by an empty plan.
    pub fn is_fulfilled(&self) -> bool {
        self.shortfall.is_none()
    }

    pub fn into_parts(self) -> (AllocationPlan, Inventory, Option<Shortfall>) {
        (self.plan, self.inventory, self.shortfall)
    }
}

/// Split `order` across `inventory`, cheapest (earliest) warehouse first.
///
/// Items are processed in order line order. For each item, warehouses are
/// drained in priority order until the request is covered; later warehouses
/// are not touched for that item. If any item cannot be fully covered by the
/// combined stock, the plan is empty and no stock is consumed.
///
/// The input inventory is left untouched; the post-allocation stock is
/// returned in [`Allocation::inventory`].
pub fn fulfill_order(order: &Order, inventory: &Inventory) -> Allocation {
    let span = tracing::info_span!(
        "fulfill_order",
        lines = order.len(),
        warehouses = inventory.len()
    );
    let _guard = span.enter();

    // Feasibility first, on read-only sums, so the greedy pass below cannot fail.
    if let Some(shortfall) = find_shortfall(order, inventory) {
        tracing::info!(
            item = %shortfall.item,
            requested = shortfall.requested.get(),
            available = shortfall.available.get(),
            "order cannot be fulfilled"
        );
        return Allocation {
            plan: AllocationPlan::default(),
            inventory: inventory.clone(),
            shortfall: Some(shortfall),
        };
    }

    let mut remaining_stock = inventory.clone();
    let mut plan = AllocationPlan::default();

    for line in order.lines() {
        let mut remaining = line.quantity;

        for warehouse in remaining_stock.warehouses_mut() {
            if remaining.is_zero() {
                break;
            }

            let taken = warehouse.take(&line.item, remaining);
            if taken.is_zero() {
                continue;
            }
            remaining = remaining.saturating_sub(taken);

            tracing::debug!(
                warehouse = %warehouse.name(),
                item = %line.item,
                taken = taken.get(),
                remaining = remaining.get(),
                "allocated from warehouse"
            );
            plan.record(warehouse.name(), &line.item, taken);
        }

        debug_assert!(remaining.is_zero(), "feasible item left uncovered");
    }

    tracing::info!(entries = plan.len(), "order fulfilled");

    Allocation {
        plan,
        inventory: remaining_stock,
        shortfall: None,
    }
}

fn find_shortfall(order: &Order, inventory: &Inventory) -> Option<Shortfall> {
    order.lines().iter().find_map(|line| {
        let available = inventory.total_stock(line.item.as_str());
        (available < line.quantity).then(|| Shortfall {
            item: line.item.clone(),
            requested: line.quantity,
            available,
        })
    })
}

impl Inventory {
    /// Allocate `order` against this inventory and keep the result.
    ///
    /// On success the consumed units are removed; on failure nothing changes
    /// and the returned plan is empty. Repeated calls see earlier consumption.
    pub fn commit(&mut self, order: &Order) -> AllocationPlan {
        let (plan, remaining, shortfall) = fulfill_order(order, self).into_parts();
        if shortfall.is_none() {
            *self = remaining;
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::Warehouse;
    use proptest::prelude::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::EnvFilter;

    fn inventory(warehouses: Vec<Warehouse>) -> Inventory {
        Inventory::new(warehouses).unwrap()
    }

    #[test]
    fn earlier_warehouse_is_drained_before_later_one() {
        let order = Order::from_pairs([("apple", 7)]).unwrap();
        let stock = inventory(vec![
            Warehouse::from_pairs("owd", [("apple", 5)]).unwrap(),
            Warehouse::from_pairs("dm", [("apple", 5)]).unwrap(),
        ]);

        let allocation = fulfill_order(&order, &stock);
        let plan = allocation.plan();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.get("owd").unwrap().quantity_of("apple").get(), 5);
        assert_eq!(plan.get("dm").unwrap().quantity_of("apple").get(), 2);

        let after = allocation.inventory();
        assert_eq!(after.get("owd").unwrap().stock_of("apple").get(), 0);
        assert_eq!(after.get("dm").unwrap().stock_of("apple").get(), 3);
    }

    #[test]
    fn input_inventory_is_not_mutated() {
        let order = Order::from_pairs([("apple", 1)]).unwrap();
        let stock = inventory(vec![Warehouse::from_pairs("owd", [("apple", 1)]).unwrap()]);
        let before = stock.clone();

        let allocation = fulfill_order(&order, &stock);
        assert!(allocation.is_fulfilled());
        assert_eq!(stock, before);
    }

    #[test]
    fn plan_order_follows_first_contribution_not_warehouse_order() {
        // apple only lives in dm, banana only in owd: dm contributes first.
        let order = Order::from_pairs([("apple", 1), ("banana", 1)]).unwrap();
        let stock = inventory(vec![
            Warehouse::from_pairs("owd", [("banana", 1)]).unwrap(),
            Warehouse::from_pairs("dm", [("apple", 1)]).unwrap(),
        ]);

        let allocation = fulfill_order(&order, &stock);
        let names: Vec<&str> = allocation
            .plan()
            .warehouse_names()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(names, vec!["dm", "owd"]);
    }

    #[test]
    fn shortfall_reports_first_uncoverable_item_and_consumes_nothing() {
        let order = Order::from_pairs([("banana", 1), ("apple", 3), ("kiwi", 9)]).unwrap();
        let stock = inventory(vec![
            Warehouse::from_pairs("owd", [("apple", 1), ("banana", 1)]).unwrap(),
            Warehouse::from_pairs("dm", [("apple", 1)]).unwrap(),
        ]);

        let allocation = fulfill_order(&order, &stock);
        assert!(!allocation.is_fulfilled());
        assert!(allocation.plan().is_empty());
        assert_eq!(allocation.inventory(), &stock);
        assert_eq!(
            allocation.shortfall(),
            Some(&Shortfall {
                item: ItemName::new("apple").unwrap(),
                requested: Quantity::from_units(3),
                available: Quantity::from_units(2),
            })
        );
    }

    #[test]
    fn zero_quantity_line_consumes_nothing_and_is_not_in_plan() {
        let order = Order::from_pairs([("apple", 0), ("banana", 1)]).unwrap();
        let stock = inventory(vec![
            Warehouse::from_pairs("owd", [("apple", 4), ("banana", 1)]).unwrap(),
        ]);

        let allocation = fulfill_order(&order, &stock);
        assert!(allocation.is_fulfilled());
        let owd = allocation.plan().get("owd").unwrap();
        assert!(!owd.items().contains_key("apple"));
        assert_eq!(owd.quantity_of("banana").get(), 1);
        assert_eq!(
            allocation.inventory().get("owd").unwrap().stock_of("apple").get(),
            4
        );
    }

    #[test]
    fn all_zero_order_is_fulfilled_with_empty_plan() {
        let order = Order::from_pairs([("apple", 0)]).unwrap();
        let allocation = fulfill_order(&order, &Inventory::default());
        assert!(allocation.is_fulfilled());
        assert!(allocation.plan().is_empty());

        let empty = fulfill_order(&Order::new(), &Inventory::default());
        assert!(empty.is_fulfilled());
        assert!(empty.plan().is_empty());
    }

    #[test]
    fn zero_stock_warehouse_is_skipped() {
        let order = Order::from_pairs([("apple", 2)]).unwrap();
        let stock = inventory(vec![
            Warehouse::from_pairs("owd", [("apple", 0)]).unwrap(),
            Warehouse::from_pairs("dm", [("apple", 2)]).unwrap(),
        ]);

        let allocation = fulfill_order(&order, &stock);
        assert_eq!(allocation.plan().len(), 1);
        assert!(allocation.plan().get("owd").is_none());
    }

    #[test]
    fn commit_keeps_consumption_only_on_success() {
        let mut stock = inventory(vec![Warehouse::from_pairs("owd", [("apple", 3)]).unwrap()]);
        let two = Order::from_pairs([("apple", 2)]).unwrap();

        let first = stock.commit(&two);
        assert_eq!(first.total_for("apple").get(), 2);
        assert_eq!(stock.total_stock("apple").get(), 1);

        let second = stock.commit(&two);
        assert!(second.is_empty());
        assert_eq!(stock.total_stock("apple").get(), 1);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn outcome_is_logged_inside_the_span_at_info_level() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("info"))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let order = Order::from_pairs([("apple", 1)]).unwrap();
        let stock = inventory(vec![Warehouse::from_pairs("owd", [("apple", 1)]).unwrap()]);
        tracing::subscriber::with_default(subscriber, || fulfill_order(&order, &stock));

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let outcome = output
            .lines()
            .find(|line| line.contains("order fulfilled"))
            .expect("outcome line logged at info");
        assert!(outcome.contains("fulfill_order{"), "span missing: {outcome}");
        assert!(!output.contains("allocated from warehouse"));
    }

    const ITEMS: [&str; 4] = ["apple", "banana", "orange", "kiwi"];

    fn order_strategy() -> impl Strategy<Value = Order> {
        prop::collection::vec(prop::option::of(0i64..15), ITEMS.len()).prop_map(|qty| {
            let pairs = ITEMS
                .iter()
                .zip(qty)
                .filter_map(|(item, q)| q.map(|q| (*item, q)));
            Order::from_pairs(pairs).unwrap()
        })
    }

    fn inventory_strategy() -> impl Strategy<Value = Inventory> {
        prop::collection::vec(
            prop::collection::vec(prop::option::of(0i64..10), ITEMS.len()),
            0..5,
        )
        .prop_map(|warehouses| {
            let warehouses = warehouses.into_iter().enumerate().map(|(idx, stock)| {
                let pairs = ITEMS
                    .iter()
                    .zip(stock)
                    .filter_map(|(item, q)| q.map(|q| (*item, q)));
                Warehouse::from_pairs(format!("w{idx}"), pairs).unwrap()
            });
            Inventory::new(warehouses).unwrap()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            max_global_rejects: 65536,
            ..ProptestConfig::default()
        })]

        /// Property: an order is fulfilled exactly when every item's combined stock covers it.
        #[test]
        fn fulfilled_iff_combined_stock_covers_every_line(
            order in order_strategy(),
            stock in inventory_strategy()
        ) {
            let coverable = order
                .lines()
                .iter()
                .all(|l| stock.total_stock(l.item.as_str()) >= l.quantity);

            let allocation = fulfill_order(&order, &stock);
            prop_assert_eq!(allocation.is_fulfilled(), coverable);
            if !coverable {
                prop_assert!(allocation.plan().is_empty());
                prop_assert_eq!(allocation.inventory(), &stock);
            }
        }

        /// Property: a fulfilled plan sums to the request per item and never records zero.
        #[test]
        fn fulfilled_plan_matches_request_exactly(
            order in order_strategy(),
            stock in inventory_strategy()
        ) {
            let allocation = fulfill_order(&order, &stock);
            prop_assume!(allocation.is_fulfilled());

            let plan = allocation.plan();
            for line in order.lines() {
                prop_assert_eq!(plan.total_for(line.item.as_str()), line.quantity);
            }
            for entry in plan.entries() {
                prop_assert!(!entry.items().is_empty());
                for (item, qty) in entry.items() {
                    prop_assert!(!qty.is_zero());
                    prop_assert!(order.quantity_of(item.as_str()).is_some());
                }
            }
        }

        /// Property: allocated units plus leftover stock equal the original stock, per warehouse and item.
        #[test]
        fn stock_is_conserved(
            order in order_strategy(),
            stock in inventory_strategy()
        ) {
            let allocation = fulfill_order(&order, &stock);
            for (before, after) in stock.warehouses().iter().zip(allocation.inventory().warehouses()) {
                prop_assert_eq!(before.name(), after.name());
                let taken = allocation.plan().get(before.name().as_str());
                for item in ITEMS {
                    let used = taken.map(|e| e.quantity_of(item)).unwrap_or(Quantity::ZERO);
                    prop_assert_eq!(
                        after.stock_of(item).get() + used.get(),
                        before.stock_of(item).get()
                    );
                }
            }
        }

        /// Property: a warehouse only supplies an item once every earlier warehouse is out of it.
        #[test]
        fn earlier_warehouses_are_exhausted_first(
            order in order_strategy(),
            stock in inventory_strategy()
        ) {
            let allocation = fulfill_order(&order, &stock);
            let after = allocation.inventory().warehouses();
            for line in order.lines() {
                let item = line.item.as_str();
                let last_used = after
                    .iter()
                    .rposition(|w| {
                        allocation
                            .plan()
                            .get(w.name().as_str())
                            .is_some_and(|e| !e.quantity_of(item).is_zero())
                    });
                if let Some(last) = last_used {
                    for earlier in &after[..last] {
                        prop_assert!(earlier.stock_of(item).is_zero());
                    }
                }
            }
        }
    }
}
