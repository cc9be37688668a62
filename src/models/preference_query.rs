use serde::{Deserialize, Serialize};

/// What the user asked for: cuisine, diet and the ingredients on hand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "RawPreferenceQuery")]
pub struct PreferenceQuery {
    pub cuisine: String,
    pub dietary_restriction: String,
    /// Case-sensitive, de-duplicated, in the order the user added them
    pub include_ingredients: Vec<String>,
}

#[derive(Deserialize)]
struct RawPreferenceQuery {
    #[serde(default)]
    cuisine: String,
    #[serde(default)]
    dietary_restriction: String,
    #[serde(default)]
    include_ingredients: Vec<String>,
}

impl From<RawPreferenceQuery> for PreferenceQuery {
    fn from(raw: RawPreferenceQuery) -> Self {
        Self::new(raw.cuisine, raw.dietary_restriction, raw.include_ingredients)
    }
}

impl PreferenceQuery {
    pub fn new<I, S>(
        cuisine: impl Into<String>,
        dietary_restriction: impl Into<String>,
        ingredients: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut query = Self {
            cuisine: cuisine.into(),
            dietary_restriction: dietary_restriction.into(),
            include_ingredients: Vec::new(),
        };

        for ingredient in ingredients {
            query.add_ingredient(ingredient);
        }

        query
    }

    /// Adds an ingredient unless it is blank or already present
    pub fn add_ingredient(&mut self, ingredient: impl Into<String>) -> bool {
        let ingredient = ingredient.into();
        let trimmed = ingredient.trim();

        if trimmed.is_empty() || self.include_ingredients.iter().any(|i| i == trimmed) {
            return false;
        }

        self.include_ingredients.push(trimmed.to_string());
        true
    }

    pub fn remove_ingredient(&mut self, ingredient: &str) {
        self.include_ingredients.retain(|i| i != ingredient);
    }

    pub fn has_ingredients(&self) -> bool {
        !self.include_ingredients.is_empty()
    }

    /// Cuisine as shown to the model, "Any" when unspecified
    pub fn cuisine_label(&self) -> &str {
        label_or(&self.cuisine, "Any")
    }

    /// Dietary restriction as shown to the model, "None" when unspecified
    pub fn diet_label(&self) -> &str {
        label_or(&self.dietary_restriction, "None")
    }
}

fn label_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}
