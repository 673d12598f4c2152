//! Tagged field wrappers for partial updates.
//!
//! Update payloads must distinguish "clear this field" from "leave this
//! field alone"; a plain `Option` collapses the two. [`FieldPatch`] keeps
//! the distinction explicit on every clearable field.

/// Patch instruction for a single optional field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldPatch<T> {
    /// Leave the stored value untouched.
    #[default]
    Keep,
    /// Clear the stored value.
    Clear,
    /// Replace the stored value.
    Set(T),
}

impl<T> FieldPatch<T> {
    /// Returns `true` when the patch leaves the field untouched.
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Returns a patch borrowing the payload instead of owning it.
    #[must_use]
    pub const fn as_ref(&self) -> FieldPatch<&T> {
        match self {
            Self::Keep => FieldPatch::Keep,
            Self::Clear => FieldPatch::Clear,
            Self::Set(value) => FieldPatch::Set(value),
        }
    }

    /// Applies the patch to a stored slot.
    pub fn apply(self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Clear => *slot = None,
            Self::Set(value) => *slot = Some(value),
        }
    }
}

impl<T> From<Option<T>> for FieldPatch<T> {
    /// Maps an explicitly-present optional value: `Some` sets, `None` clears.
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }
}
