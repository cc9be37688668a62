//! Prompt and response-schema builders for the generation calls.

use serde_json::{json, Value};

use crate::models::{DishProposal, PreferenceQuery};

const DIET_RULES: &str = "\
Dietary rules are not negotiable:
- Vegetarian: no meat, poultry or fish.
- Vegan: no animal products at all, including dairy, eggs and honey.
- Non-Veg: favour meat-based dishes.";

pub const NEARBY_STORES_PROMPT: &str =
    "Find grocery stores or supermarkets near me where I can buy cooking ingredients.";

/// Prompt asking for `count` dish proposals
pub fn proposal_prompt(query: &PreferenceQuery, count: usize) -> String {
    let ingredients = if query.has_ingredients() {
        query.include_ingredients.join(", ")
    } else {
        "Not specified. Suggest popular dishes.".to_string()
    };

    format!(
        "You are a pantry chef. Build dishes strictly from the ingredients listed below \
and nothing else, not even oil, salt, pepper, spices or water unless they are listed. \
Treat the pantry as empty apart from the listed items.

{DIET_RULES}

Preferences:
- Cuisine: {cuisine}
- Dietary restriction: {diet}
- Available ingredients: {ingredients}

Recommend {count} dishes. Each dish must be cookable with a subset of the available \
ingredients, must respect the dietary restriction, and its ingredient list must only \
contain available ingredients. Double-check both constraints before answering.

Answer with a JSON array.",
        cuisine = query.cuisine_label(),
        diet = query.diet_label(),
    )
}

/// Schema for the proposal response: an array of `{dishName, description, ingredients}`
pub fn proposal_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "dishName": {
                    "type": "STRING",
                    "description": "Name of the recommended dish."
                },
                "description": {
                    "type": "STRING",
                    "description": "A short, appetising description of the dish."
                },
                "ingredients": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Key ingredients. Every item must come from the available ingredients."
                }
            },
            "required": ["dishName", "description", "ingredients"]
        }
    })
}

/// Whether the restriction should be spelled out in the image prompt
fn diet_is_specific(dietary_restriction: &str) -> bool {
    let diet = dietary_restriction.trim();
    !diet.is_empty() && diet != "None" && diet != "Any"
}

/// Prompt for one dish photograph
pub fn image_prompt(proposal: &DishProposal, dietary_restriction: &str) -> String {
    let diet_line = if diet_is_specific(dietary_restriction) {
        format!(
            "This is a {} dish and the picture must respect that diet; a vegetarian dish shows no meat or fish.",
            dietary_restriction.trim()
        )
    } else {
        "Show the dish exactly as described.".to_string()
    };

    format!(
        "Photograph a single plated dish.

Dish: \"{name}\"
Description: {description}
Key ingredients: {ingredients}

{diet_line}
Use the ingredient list to resolve any ambiguity in the dish name. For example, \
\"Drumstick Masala Rice\" made with moringa drumsticks under a vegetarian diet is a \
vegetable dish, not a chicken dish.

Vibrant, photorealistic, professionally lit, centred on the plate, high resolution.",
        name = proposal.dish_name,
        description = proposal.description,
        ingredients = proposal.ingredients.join(", "),
    )
}

/// Prompt for a full recipe of one dish
pub fn recipe_prompt(dish_name: &str, description: &str, query: &PreferenceQuery) -> String {
    let ingredients = if query.has_ingredients() {
        query.include_ingredients.join(", ")
    } else {
        "Any common ingredients may be used.".to_string()
    };

    format!(
        "You are a pantry chef writing a detailed recipe. Only use the available ingredients \
listed below, including staples such as oil, salt and spices.

{DIET_RULES}

Dish: {dish_name}
Description: {description}
Dietary restriction: {diet}
Available ingredients: {ingredients}

Return:
1. ingredients: every ingredient used, with precise quantities, each one taken from the \
available ingredients and compatible with the dietary restriction.
2. instructions: step-by-step cooking instructions that never rely on an ingredient \
outside the available list or outside the dietary restriction.

Answer with a JSON object.",
        diet = query.diet_label(),
    )
}

/// Schema for the recipe response: `{ingredients, instructions}`
pub fn recipe_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "ingredients": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Ingredients with quantities, all from the available list."
            },
            "instructions": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Step-by-step cooking instructions."
            }
        },
        "required": ["ingredients", "instructions"]
    })
}
