//! Proof of occupancy handed out by `enter`.

use crate::category::Category;

/// One occupied slot.
///
/// Returned by `enter` and consumed by `leave`. It is deliberately not
/// `Clone`: a slot can only be released once.
#[must_use = "an admission must be handed back to `leave`, or the slot stays occupied forever"]
#[derive(Debug, PartialEq, Eq)]
pub struct Admission {
    category: Category,
    sequence: u64,
}

impl Admission {
    pub(crate) fn new(category: Category, sequence: u64) -> Self {
        Self { category, sequence }
    }

    /// Category this slot was admitted under.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Value of the room's admission counter right after this admission.
    ///
    /// With `start` read from `admissions()` just before calling `enter`,
    /// `sequence - start - 1` is the number of other actors admitted while
    /// this one waited.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Admissions that happened between `start` and this one.
    pub fn waited_since(&self, start: u64) -> u64 {
        self.sequence.saturating_sub(start).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waited_since_excludes_own_admission() {
        let admission = Admission::new(Category::A, 10);
        assert_eq!(admission.waited_since(9), 0);
        assert_eq!(admission.waited_since(4), 5);
    }

    #[test]
    fn waited_since_never_underflows() {
        let admission = Admission::new(Category::B, 3);
        assert_eq!(admission.waited_since(3), 0);
        assert_eq!(admission.waited_since(7), 0);
    }
}
