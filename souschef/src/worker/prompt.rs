//! Prompt construction for the generation workers.
//!
//! Prompts are built deterministically from the request fields; the same
//! request always yields the same prompt.

use crate::recipe::RecipeRequest;

/// Builds the recipe generation prompt.
///
/// The dietary clause is omitted when no real preference was supplied, and
/// the substitution clause is appended only when requested.
pub fn build_recipe_prompt(request: &RecipeRequest) -> String {
    let mut prompt = format!("Generate a detailed recipe for: {}", request.query);

    if request.has_dietary_preference() {
        prompt.push_str(&format!("\nMake it {} friendly.", request.dietary_preference));
    }

    if request.need_substitutions {
        prompt.push_str("\nInclude common ingredient substitutions at the end.");
    }

    prompt.push_str("\nProvide the recipe with:");
    prompt.push_str("\n- A clear title");
    prompt.push_str("\n- Complete ingredients list with measurements");
    prompt.push_str("\n- Detailed step-by-step instructions");
    prompt.push_str("\n- Cooking time and preparation time");
    prompt.push_str("\n- Number of servings");

    prompt
}

/// Builds the substitution expert's prompt.
pub fn build_substitution_prompt(request: &RecipeRequest) -> String {
    let mut prompt = format!(
        "Provide ingredient substitutions for this recipe: {}",
        request.query
    );

    if request.has_dietary_preference() {
        prompt.push_str(&format!(
            "\nFocus on making it {} friendly.",
            request.dietary_preference
        ));
    }

    prompt.push_str("\nProvide:");
    prompt.push_str("\n- Common ingredient substitutions");
    prompt.push_str("\n- Dietary restriction alternatives");
    prompt.push_str("\n- Healthier alternatives");
    prompt.push_str("\n- Budget-friendly substitutions");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_prompt_is_deterministic() {
        let request = RecipeRequest::new("chicken curry", "spicy", true);
        assert_eq!(build_recipe_prompt(&request), build_recipe_prompt(&request));
    }

    #[test]
    fn test_recipe_prompt_includes_topic() {
        let request = RecipeRequest::new("chicken curry", "none", false);
        let prompt = build_recipe_prompt(&request);

        assert!(prompt.starts_with("Generate a detailed recipe for: chicken curry"));
    }

    #[test]
    fn test_dietary_clause_omitted_for_none_sentinel() {
        let request = RecipeRequest::new("soup", "none", false);
        assert!(!build_recipe_prompt(&request).contains("friendly"));

        let request = RecipeRequest::new("soup", "", false);
        assert!(!build_recipe_prompt(&request).contains("friendly"));
    }

    #[test]
    fn test_dietary_clause_present_for_real_preference() {
        let request = RecipeRequest::new("soup", "vegan", false);
        assert!(build_recipe_prompt(&request).contains("Make it vegan friendly."));
    }

    #[test]
    fn test_substitution_clause_follows_flag() {
        let with = RecipeRequest::new("soup", "none", true);
        let without = RecipeRequest::new("soup", "none", false);

        assert!(build_recipe_prompt(&with).contains("Include common ingredient substitutions"));
        assert!(!build_recipe_prompt(&without).contains("Include common ingredient substitutions"));
    }

    #[test]
    fn test_recipe_prompt_ends_with_formatting_directive() {
        let prompt = build_recipe_prompt(&RecipeRequest::new("soup", "none", false));

        assert!(prompt.contains("- A clear title"));
        assert!(prompt.ends_with("- Number of servings"));
    }

    #[test]
    fn test_substitution_prompt_shape() {
        let request = RecipeRequest::new("pasta carbonara", "vegan", true);
        let prompt = build_substitution_prompt(&request);

        assert!(prompt.starts_with("Provide ingredient substitutions for this recipe: pasta carbonara"));
        assert!(prompt.contains("Focus on making it vegan friendly."));
        assert!(prompt.contains("- Budget-friendly substitutions"));
    }

    #[test]
    fn test_substitution_prompt_without_preference() {
        let prompt = build_substitution_prompt(&RecipeRequest::new("pasta", "none", false));
        assert!(!prompt.contains("friendly"));
    }
}
