//! Recipe request value type.

use serde::{Deserialize, Serialize};

/// Sentinel dietary preference meaning "no constraint".
pub const NO_PREFERENCE: &str = "none";

/// A caller-supplied recipe request.
///
/// This is an immutable value with structural equality only; two requests
/// with identical fields are interchangeable. The dietary preference is free
/// text with [`NO_PREFERENCE`] as the "no constraint" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeRequest {
    /// What to cook, e.g. "chicken curry". Non-empty.
    pub query: String,
    /// Free-text dietary preference, or [`NO_PREFERENCE`].
    pub dietary_preference: String,
    /// Whether the recipe should include ingredient substitutions.
    pub need_substitutions: bool,
}

impl RecipeRequest {
    /// Creates a new recipe request.
    pub fn new(
        query: impl Into<String>,
        dietary_preference: impl Into<String>,
        need_substitutions: bool,
    ) -> Self {
        Self {
            query: query.into(),
            dietary_preference: dietary_preference.into(),
            need_substitutions,
        }
    }

    /// Returns true when a real dietary preference was supplied.
    ///
    /// An empty string and the [`NO_PREFERENCE`] sentinel both mean
    /// "no constraint".
    pub fn has_dietary_preference(&self) -> bool {
        !self.dietary_preference.is_empty() && self.dietary_preference != NO_PREFERENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(request: &RecipeRequest) -> u64 {
        let mut hasher = DefaultHasher::new();
        request.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_identical_requests_are_equal() {
        let a = RecipeRequest::new("pasta carbonara", "vegetarian", true);
        let b = RecipeRequest::new("pasta carbonara", "vegetarian", true);

        assert_eq!(a, b);
    }

    #[test]
    fn test_identical_requests_hash_identically() {
        let a = RecipeRequest::new("pasta carbonara", "vegetarian", true);
        let b = RecipeRequest::new("pasta carbonara", "vegetarian", true);

        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_field_differences_break_equality() {
        let base = RecipeRequest::new("pasta", "none", false);

        assert_ne!(base, RecipeRequest::new("pizza", "none", false));
        assert_ne!(base, RecipeRequest::new("pasta", "vegan", false));
        assert_ne!(base, RecipeRequest::new("pasta", "none", true));
    }

    #[test]
    fn test_no_preference_sentinel() {
        assert!(!RecipeRequest::new("soup", "none", false).has_dietary_preference());
        assert!(!RecipeRequest::new("soup", "", false).has_dietary_preference());
        assert!(RecipeRequest::new("soup", "vegan", false).has_dietary_preference());
    }

    #[test]
    fn test_serializes_with_expected_field_names() {
        let request = RecipeRequest::new("beef stew", "healthy", false);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["query"], "beef stew");
        assert_eq!(json["dietary_preference"], "healthy");
        assert_eq!(json["need_substitutions"], false);
    }
}
