use serde::{Deserialize, Serialize};

/// A recipe found in a video transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    /// Plain ingredient names without quantities, in the order the model listed them
    pub ingredients: Vec<String>,
}

/// All recipes found in one video. An empty list is a valid answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipesResponse {
    pub recipes: Vec<Recipe>,
}

impl RecipesResponse {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
