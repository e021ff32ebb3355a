//! Static cooking content: attributes, recipes, ingredients and rolls.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::ops::{Add, AddAssign, Mul};
use thiserror::Error;

const DEFAULT_RECIPE_DATA: &str = include_str!("../assets/data/recipes.json");
const DEFAULT_INGREDIENT_DATA: &str = include_str!("../assets/data/ingredients.json");

/// One of the three meters a recipe is judged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Taste,
    Stability,
    Magic,
}

impl Attribute {
    /// Every attribute in overflow-check order.
    pub const ALL: [Self; 3] = [Self::Taste, Self::Stability, Self::Magic];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Taste => 0,
            Self::Stability => 1,
            Self::Magic => 2,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Taste => "taste",
            Self::Stability => "stability",
            Self::Magic => "magic",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive `[min, max]` window used for recipe targets and ingredient effects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRange {
    pub min: f32,
    pub max: f32,
}

impl TargetRange {
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        self.min <= value && value <= self.max
    }

    fn validate(&self, owner: &str, attribute: Attribute) -> Result<(), ContentError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ContentError::NonFiniteRange {
                owner: owner.to_string(),
                attribute,
            });
        }
        if self.min > self.max {
            return Err(ContentError::InvertedRange {
                owner: owner.to_string(),
                attribute,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.min..=self.max)
    }
}

/// Per-attribute additive change applied to the meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Deltas {
    pub taste: f32,
    pub stability: f32,
    pub magic: f32,
}

impl Deltas {
    #[must_use]
    pub const fn new(taste: f32, stability: f32, magic: f32) -> Self {
        Self {
            taste,
            stability,
            magic,
        }
    }

    /// Same delta on every attribute.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value)
    }

    #[must_use]
    pub const fn get(&self, attribute: Attribute) -> f32 {
        match attribute {
            Attribute::Taste => self.taste,
            Attribute::Stability => self.stability,
            Attribute::Magic => self.magic,
        }
    }
}

impl Add for Deltas {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.taste + rhs.taste,
            self.stability + rhs.stability,
            self.magic + rhs.magic,
        )
    }
}

impl AddAssign for Deltas {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f32> for Deltas {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.taste * rhs, self.stability * rhs, self.magic * rhs)
    }
}

/// Recipe difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Elite,
}

impl Difficulty {
    pub const ALL: [Self; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Elite];

    /// Flat per-tier XP table. Coins always come from the reward engine.
    #[must_use]
    pub const fn xp_reward(self) -> u32 {
        match self {
            Self::Easy => 10,
            Self::Medium => 20,
            Self::Hard => 35,
            Self::Elite => 50,
        }
    }

    /// Two-letter tag used in share codes.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Easy => "EZ",
            Self::Medium => "MD",
            Self::Hard => "HD",
            Self::Elite => "EL",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Elite => "Elite",
        };
        f.write_str(label)
    }
}

/// Ingredient rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

/// A cooking challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSpec {
    pub id: String,
    pub name: String,
    pub taste: TargetRange,
    pub stability: TargetRange,
    pub magic: TargetRange,
    #[serde(default = "RecipeSpec::default_total_turns")]
    pub total_turns: u32,
    #[serde(default)]
    pub base_reward: u32,
    #[serde(default = "RecipeSpec::default_unlock_level")]
    pub unlock_level: u32,
    pub difficulty: Difficulty,
}

impl RecipeSpec {
    const fn default_total_turns() -> u32 {
        5
    }

    const fn default_unlock_level() -> u32 {
        1
    }

    #[must_use]
    pub const fn range(&self, attribute: Attribute) -> TargetRange {
        match attribute {
            Attribute::Taste => self.taste,
            Attribute::Stability => self.stability,
            Attribute::Magic => self.magic,
        }
    }

    #[must_use]
    pub const fn xp_reward(&self) -> u32 {
        self.difficulty.xp_reward()
    }

    /// Validate the recipe against the meter ceiling.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` when a range is malformed, lies outside the
    /// meter bounds, or the turn budget is zero.
    pub fn validate(&self, meter_max: f32) -> Result<(), ContentError> {
        for attribute in Attribute::ALL {
            let range = self.range(attribute);
            range.validate(&self.id, attribute)?;
            if range.min < 0.0 || range.max > meter_max {
                return Err(ContentError::TargetOutOfBounds {
                    recipe: self.id.clone(),
                    attribute,
                    meter_max,
                });
            }
        }
        if self.total_turns == 0 {
            return Err(ContentError::ZeroTurns {
                recipe: self.id.clone(),
            });
        }
        if self.unlock_level == 0 {
            return Err(ContentError::ZeroUnlockLevel {
                recipe: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Static ingredient definition with per-attribute effect ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientSpec {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    pub taste: TargetRange,
    pub stability: TargetRange,
    pub magic: TargetRange,
}

impl IngredientSpec {
    #[must_use]
    pub const fn range(&self, attribute: Attribute) -> TargetRange {
        match attribute {
            Attribute::Taste => self.taste,
            Attribute::Stability => self.stability,
            Attribute::Magic => self.magic,
        }
    }

    /// Sample a concrete instance of this ingredient.
    #[must_use]
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> IngredientRoll {
        let taste = self.taste.sample(rng);
        let stability = self.stability.sample(rng);
        let magic = self.magic.sample(rng);
        IngredientRoll {
            spec_id: self.id.clone(),
            name: self.name.clone(),
            rarity: self.rarity,
            deltas: Deltas::new(taste, stability, magic),
        }
    }

    fn validate(&self) -> Result<(), ContentError> {
        for attribute in Attribute::ALL {
            self.range(attribute).validate(&self.id, attribute)?;
        }
        Ok(())
    }
}

/// A rolled ingredient offered in one slot for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRoll {
    pub spec_id: String,
    pub name: String,
    pub rarity: Rarity,
    pub deltas: Deltas,
}

impl IngredientRoll {
    #[must_use]
    pub fn same_spec(&self, other: &Self) -> bool {
        self.spec_id == other.spec_id
    }
}

/// Errors raised when cooking content is malformed.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content contains no recipes")]
    NoRecipes,
    #[error("content contains no ingredients")]
    NoIngredients,
    #[error("{owner}: {attribute} range is not finite")]
    NonFiniteRange { owner: String, attribute: Attribute },
    #[error("{owner}: {attribute} range minimum {min:.2} exceeds maximum {max:.2}")]
    InvertedRange {
        owner: String,
        attribute: Attribute,
        min: f32,
        max: f32,
    },
    #[error("{recipe}: {attribute} target must lie within 0..={meter_max:.1}")]
    TargetOutOfBounds {
        recipe: String,
        attribute: Attribute,
        meter_max: f32,
    },
    #[error("{recipe}: total turns must be at least 1")]
    ZeroTurns { recipe: String },
    #[error("{recipe}: unlock level must be at least 1")]
    ZeroUnlockLevel { recipe: String },
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("unknown recipe '{0}'")]
    UnknownRecipe(String),
    #[error("content JSON invalid: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RecipeFile {
    #[serde(default)]
    recipes: Vec<RecipeSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct IngredientFile {
    #[serde(default)]
    ingredients: Vec<IngredientSpec>,
}

/// Read-only content tables for a kitchen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentData {
    #[serde(default)]
    pub recipes: Vec<RecipeSpec>,
    #[serde(default)]
    pub ingredients: Vec<IngredientSpec>,
}

impl ContentData {
    /// Create empty content (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(recipes: Vec<RecipeSpec>, ingredients: Vec<IngredientSpec>) -> Self {
        Self {
            recipes,
            ingredients,
        }
    }

    /// Load content from separate recipe and ingredient JSON documents.
    ///
    /// # Errors
    ///
    /// Returns an error if either document cannot be parsed.
    pub fn from_json(recipes_json: &str, ingredients_json: &str) -> Result<Self, ContentError> {
        let recipes: RecipeFile = serde_json::from_str(recipes_json)?;
        let ingredients: IngredientFile = serde_json::from_str(ingredients_json)?;
        Ok(Self::new(recipes.recipes, ingredients.ingredients))
    }

    /// Content bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled assets fail to parse.
    pub fn load_bundled() -> Result<Self, ContentError> {
        Self::from_json(DEFAULT_RECIPE_DATA, DEFAULT_INGREDIENT_DATA)
    }

    #[must_use]
    pub fn recipe(&self, id: &str) -> Option<&RecipeSpec> {
        self.recipes.iter().find(|r| r.id == id)
    }

    #[must_use]
    pub fn ingredient(&self, id: &str) -> Option<&IngredientSpec> {
        self.ingredients.iter().find(|i| i.id == id)
    }

    /// Validate every table.
    ///
    /// # Errors
    ///
    /// Returns the first `ContentError` found.
    pub fn validate(&self, meter_max: f32) -> Result<(), ContentError> {
        if self.recipes.is_empty() {
            return Err(ContentError::NoRecipes);
        }
        self.validate_ingredients()?;
        let mut seen = HashSet::new();
        for recipe in &self.recipes {
            if !seen.insert(recipe.id.as_str()) {
                return Err(ContentError::DuplicateId {
                    kind: "recipe",
                    id: recipe.id.clone(),
                });
            }
            recipe.validate(meter_max)?;
        }
        Ok(())
    }

    /// Validate only the ingredient table; sessions need nothing more.
    ///
    /// # Errors
    ///
    /// Returns the first `ContentError` found.
    pub fn validate_ingredients(&self) -> Result<(), ContentError> {
        if self.ingredients.is_empty() {
            return Err(ContentError::NoIngredients);
        }
        let mut seen = HashSet::new();
        for ingredient in &self.ingredients {
            if !seen.insert(ingredient.id.as_str()) {
                return Err(ContentError::DuplicateId {
                    kind: "ingredient",
                    id: ingredient.id.clone(),
                });
            }
            ingredient.validate()?;
        }
        Ok(())
    }
}
