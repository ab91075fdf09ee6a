//! Value object trait: equality by value, not identity.
//!
//! Item names, warehouse names and quantities carry no identity of their own;
//! two of them with the same contents are interchangeable.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one (e.g. `Quantity::saturating_sub` returns a fresh value).
///
/// ```ignore
/// let a = ItemName::new("apple")?;
/// let b = ItemName::new("apple")?;
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
