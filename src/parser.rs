//! Strict decoder for the model's recipe output.
//!
//! The generation backend is a free-text model, so nothing it returns is
//! trusted: the text must be JSON, must match the recipe schema, and every
//! recipe must carry a non-blank name. Anything else is a [`ParseError`].

use crate::error::ParseError;
use crate::model::{Recipe, RecipesResponse};
use serde::Deserialize;
use serde_json::{Number, Value};

/// Ingredient entries as the model may emit them
#[derive(Deserialize)]
#[serde(untagged)]
enum RawIngredient {
    Text(String),
    Number(Number),
    Flag(bool),
}

impl From<RawIngredient> for String {
    fn from(ingredient: RawIngredient) -> Self {
        match ingredient {
            RawIngredient::Text(text) => text,
            RawIngredient::Number(number) => number.to_string(),
            RawIngredient::Flag(flag) => flag.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct RawRecipe {
    name: String,
    ingredients: Vec<RawIngredient>,
}

/// Either the bare array the prompt asks for or a `{"recipes": [...]}` wrapper
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    List(Vec<RawRecipe>),
    Wrapped { recipes: Vec<RawRecipe> },
}

/// Parse raw model output into a [`RecipesResponse`]
pub fn parse_recipes(raw: &str) -> Result<RecipesResponse, ParseError> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Err(ParseError::Empty {
            raw: raw.to_string(),
        });
    }

    let value: Value = serde_json::from_str(body).map_err(|source| ParseError::InvalidJson {
        raw: raw.to_string(),
        source,
    })?;

    let kind = json_kind(&value);
    let payload = RawPayload::deserialize(value).map_err(|e| ParseError::Schema {
        raw: raw.to_string(),
        reason: format!("expected a list of recipes, got {kind} ({e})"),
    })?;

    let raw_recipes = match payload {
        RawPayload::List(recipes) | RawPayload::Wrapped { recipes } => recipes,
    };

    let mut recipes = Vec::with_capacity(raw_recipes.len());
    for (index, recipe) in raw_recipes.into_iter().enumerate() {
        let name = recipe.name.trim();
        if name.is_empty() {
            return Err(ParseError::Schema {
                raw: raw.to_string(),
                reason: format!("recipe at index {index} has an empty name"),
            });
        }

        recipes.push(Recipe {
            name: name.to_string(),
            ingredients: recipe.ingredients.into_iter().map(String::from).collect(),
        });
    }

    Ok(RecipesResponse::new(recipes))
}

/// Remove one surrounding markdown code fence, with or without a language tag
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return text;
    };

    // Skip the info string ("json") on the opening fence line
    let inner = match inner.find('\n') {
        Some(newline) if !inner[..newline].trim_start().starts_with(['[', '{']) => {
            &inner[newline + 1..]
        }
        _ => inner,
    };
    inner.trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
