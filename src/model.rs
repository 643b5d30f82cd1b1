use std::fmt::Display;

/// A member of a pool's population.
///
/// Models are plain keys into every [Column](crate::storage::Column); they own nothing.
/// Ids are handed out densely starting at 1 and are never reused.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Model(u32);

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Model{{{}}}", self.0)
    }
}

impl Model {
    /// Reserved, never assigned to a live member.
    pub const INVALID: Model = Model(0);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(&self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    pub const fn is_invalid(&self) -> bool {
        self.0 == Self::INVALID.0
    }
}

#[cfg(test)]
mod tests {
    use super::Model;

    #[test]
    fn display_and_sentinel() {
        assert_eq!(Model::from_raw(7).to_string(), "Model{7}");
        assert!(Model::INVALID.is_invalid());
        assert!(!Model::from_raw(1).is_invalid());
        assert_eq!(Model::from_raw(3).index(), 3);
    }
}
