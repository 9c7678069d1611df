//! Category classifier: detection label → waste category.

use heapless::Vec;

use crate::category::Category;
use crate::config::{LabelRule, MAX_LABELS};

/// Read-only label table built once at startup.
///
/// Lookup is a linear scan; the table holds a few dozen rules at most.
#[derive(Debug, Clone)]
pub struct LabelTable {
    rules: Vec<LabelRule, MAX_LABELS>,
}

impl LabelTable {
    pub fn new(rules: Vec<LabelRule, MAX_LABELS>) -> Self {
        Self { rules }
    }

    /// Map a label to its category.  Total: any string, including ones
    /// the table has never seen, yields `Some` or `None`.
    pub fn classify(&self, label: &str) -> Option<Category> {
        self.rules
            .iter()
            .find(|rule| rule.label.as_str() == label)
            .map(|rule| rule.category)
    }

    /// Labels that map to `category`.
    pub fn labels_for(&self, category: Category) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(move |rule| rule.category == category)
            .map(|rule| rule.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
