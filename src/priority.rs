//! Priority resolver: picks the one category to actuate per frame.
//!
//! Only one physical output acts per frame.  When several categories are
//! detected together the earliest in the priority order wins and the rest
//! are suppressed for that frame.

use heapless::Vec;

use crate::category::{Category, CategorySet};

/// Fixed total order over categories, highest priority first.
#[derive(Debug, Clone)]
pub struct PriorityOrder {
    order: Vec<Category, { Category::COUNT }>,
}

impl PriorityOrder {
    pub fn new(order: Vec<Category, { Category::COUNT }>) -> Self {
        Self { order }
    }

    /// First category of the order present in `detected`, or `None`.
    pub fn resolve(&self, detected: CategorySet) -> Option<Category> {
        self.order.iter().copied().find(|c| detected.contains(*c))
    }

    /// Categories in `detected` that lose arbitration to the winner.
    pub fn suppressed(&self, detected: CategorySet) -> CategorySet {
        let mut rest = detected;
        if let Some(winner) = self.resolve(detected) {
            rest.remove(winner);
        }
        rest
    }

    /// Rank of `category` (0 = highest), if it is ordered at all.
    pub fn rank(&self, category: Category) -> Option<usize> {
        self.order.iter().position(|c| *c == category)
    }

    pub fn as_slice(&self) -> &[Category] {
        &self.order
    }
}
