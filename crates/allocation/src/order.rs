use serde::{Deserialize, Serialize};

use stockroute_core::{DomainError, DomainResult, ItemName, Quantity};

/// Order line: item and requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item: ItemName,
    pub quantity: Quantity,
}

impl OrderLine {
    pub fn new(item: ItemName, quantity: Quantity) -> Self {
        Self { item, quantity }
    }
}

/// A single customer order: requested quantity per item.
///
/// Lines keep insertion order, which is the order items are allocated in.
/// Item names are unique within an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<OrderLine>", into = "Vec<OrderLine>")]
pub struct Order {
    lines: Vec<OrderLine>,
}

impl Order {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an order from already-validated lines.
    pub fn from_lines(lines: impl IntoIterator<Item = OrderLine>) -> DomainResult<Self> {
        let mut order = Self::new();
        for line in lines {
            order.add_line(line.item, line.quantity)?;
        }
        Ok(order)
    }

    /// Build an order from raw `(item, quantity)` pairs, validating both.
    pub fn from_pairs<I, S>(pairs: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut order = Self::new();
        for (item, quantity) in pairs {
            order.add_line(ItemName::new(item)?, Quantity::new(quantity)?)?;
        }
        Ok(order)
    }

    pub fn add_line(&mut self, item: ItemName, quantity: Quantity) -> DomainResult<()> {
        if self.quantity_of(item.as_str()).is_some() {
            return Err(DomainError::conflict(format!(
                "item '{item}' appears more than once in the order"
            )));
        }
        self.lines.push(OrderLine::new(item, quantity));
        Ok(())
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn quantity_of(&self, item: &str) -> Option<Quantity> {
        self.lines
            .iter()
            .find(|line| line.item.as_str() == item)
            .map(|line| line.quantity)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl TryFrom<Vec<OrderLine>> for Order {
    type Error = DomainError;

    fn try_from(lines: Vec<OrderLine>) -> Result<Self, Self::Error> {
        Self::from_lines(lines)
    }
}

impl From<Order> for Vec<OrderLine> {
    fn from(order: Order) -> Self {
        order.lines
    }
}
