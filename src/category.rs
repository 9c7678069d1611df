//! Waste categories and the per-frame category set.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A waste-sorting class.  Closed set; one actuator per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Category {
    Bottle = 0,
    Book = 1,
    Organic = 2,
}

impl Category {
    /// Total number of categories, used to size per-category arrays.
    pub const COUNT: usize = 3;

    /// Every category in declaration order.
    pub const ALL: [Category; Self::COUNT] = [Self::Bottle, Self::Book, Self::Organic];

    /// Array slot for this category.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Convert an array slot back to a category.
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bottle => "bottle",
            Self::Book => "book",
            Self::Organic => "organic",
        }
    }

    /// Bit for this category inside a [`CategorySet`].
    const fn mask(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// CategorySet
// ---------------------------------------------------------------------------

/// Set of categories seen in one frame.  Inserting a category twice is a
/// no-op, so several detections of the same class collapse to one entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CategorySet(u8);

impl CategorySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, category: Category) {
        self.0 |= category.mask();
    }

    pub fn remove(&mut self, category: Category) {
        self.0 &= !category.mask();
    }

    pub const fn contains(self, category: Category) -> bool {
        self.0 & category.mask() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = Self::empty();
        for c in iter {
            set.insert(c);
        }
        set
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, c) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(c.name())?;
        }
        f.write_str("}")
    }
}
