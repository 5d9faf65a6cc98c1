use bitflags::bitflags;
use fnlab_config::CategoryFlags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A routine group, tracked and scored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Unpack,
    Abs,
    Multiply,
    FixSign,
    Composite,
}

impl Category {
    /// Run order.
    pub const ALL: [Category; 5] = [
        Category::Unpack,
        Category::Abs,
        Category::Multiply,
        Category::FixSign,
        Category::Composite,
    ];

    /// Name of the routine students implement for this category.
    pub fn routine_name(self) -> &'static str {
        match self {
            Category::Unpack => "asmUnpack",
            Category::Abs => "asmAbs",
            Category::Multiply => "asmMult",
            Category::FixSign => "asmFixSign",
            Category::Composite => "asmMain",
        }
    }

    pub fn next(self) -> Option<Category> {
        let idx = Self::ALL.iter().position(|&c| c == self)?;
        Self::ALL.get(idx + 1).copied()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.routine_name())
    }
}

bitflags! {
    /// Set of enabled categories.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CategorySet: u8 {
        const UNPACK = 1 << 0;
        const ABS = 1 << 1;
        const MULTIPLY = 1 << 2;
        const FIX_SIGN = 1 << 3;
        const COMPOSITE = 1 << 4;
    }
}

impl From<Category> for CategorySet {
    fn from(category: Category) -> Self {
        match category {
            Category::Unpack => CategorySet::UNPACK,
            Category::Abs => CategorySet::ABS,
            Category::Multiply => CategorySet::MULTIPLY,
            Category::FixSign => CategorySet::FIX_SIGN,
            Category::Composite => CategorySet::COMPOSITE,
        }
    }
}

impl From<&CategoryFlags> for CategorySet {
    fn from(flags: &CategoryFlags) -> Self {
        let mut set = CategorySet::empty();
        set.set(CategorySet::UNPACK, flags.run_unpack);
        set.set(CategorySet::ABS, flags.run_abs);
        set.set(CategorySet::MULTIPLY, flags.run_multiply);
        set.set(CategorySet::FIX_SIGN, flags.run_fix_sign);
        set.set(CategorySet::COMPOSITE, flags.run_composite);
        set
    }
}

impl CategorySet {
    pub fn includes(self, category: Category) -> bool {
        self.contains(CategorySet::from(category))
    }

    /// First enabled category strictly after `after`, or the first enabled
    /// one overall when `after` is `None`.
    pub fn next_after(self, after: Option<Category>) -> Option<Category> {
        let mut candidate = match after {
            Some(c) => c.next(),
            None => Some(Category::Unpack),
        };
        while let Some(c) = candidate {
            if self.includes(c) {
                return Some(c);
            }
            candidate = c.next();
        }
        None
    }
}
