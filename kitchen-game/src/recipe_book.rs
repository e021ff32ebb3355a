//! Level-gated recipe catalogue.
use rand::Rng;
use rand::seq::SliceRandom;

use crate::data::RecipeSpec;

/// Read-only view of the recipes a player can or cannot cook yet.
#[derive(Debug, Clone, Copy)]
pub struct RecipeBook<'a> {
    recipes: &'a [RecipeSpec],
}

impl<'a> RecipeBook<'a> {
    #[must_use]
    pub const fn new(recipes: &'a [RecipeSpec]) -> Self {
        Self { recipes }
    }

    /// Recipes available at `level`, ordered by unlock level then difficulty.
    #[must_use]
    pub fn unlocked(&self, level: u32) -> Vec<&'a RecipeSpec> {
        let mut unlocked: Vec<&'a RecipeSpec> = self
            .recipes
            .iter()
            .filter(|recipe| recipe.unlock_level <= level)
            .collect();
        unlocked.sort_by_key(|recipe| (recipe.unlock_level, recipe.difficulty));
        unlocked
    }

    #[must_use]
    pub fn locked(&self, level: u32) -> Vec<&'a RecipeSpec> {
        let mut locked: Vec<&'a RecipeSpec> = self
            .recipes
            .iter()
            .filter(|recipe| recipe.unlock_level > level)
            .collect();
        locked.sort_by_key(|recipe| recipe.unlock_level);
        locked
    }

    #[must_use]
    pub const fn is_unlocked(recipe: &RecipeSpec, level: u32) -> bool {
        recipe.unlock_level <= level
    }

    #[must_use]
    pub fn next_unlockable(&self, level: u32) -> Option<&'a RecipeSpec> {
        self.recipes
            .iter()
            .filter(|recipe| recipe.unlock_level > level)
            .min_by_key(|recipe| recipe.unlock_level)
    }

    /// Levels still to gain before the next recipe unlocks; `None` once
    /// everything is open.
    #[must_use]
    pub fn levels_until_next_unlock(&self, level: u32) -> Option<u32> {
        self.next_unlockable(level)
            .map(|recipe| recipe.unlock_level - level)
    }

    /// Pick a random unlocked recipe for the next order.
    pub fn random_order<R: Rng + ?Sized>(&self, rng: &mut R, level: u32) -> Option<&'a RecipeSpec> {
        self.unlocked(level).choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ContentData;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn unlocks_follow_level() {
        let content = ContentData::load_bundled().unwrap();
        let book = RecipeBook::new(&content.recipes);

        let starters: Vec<&str> = book.unlocked(1).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(starters, vec!["easy_salad"]);
        assert_eq!(book.locked(1).len(), content.recipes.len() - 1);
        assert_eq!(book.next_unlockable(1).map(|r| r.id.as_str()), Some("medium_soup"));
        assert_eq!(book.levels_until_next_unlock(1), Some(1));

        let everything = book.unlocked(99);
        assert_eq!(everything.len(), content.recipes.len());
        assert!(everything.windows(2).all(|w| w[0].unlock_level <= w[1].unlock_level));
        assert_eq!(book.levels_until_next_unlock(99), None);
    }

    #[test]
    fn random_order_only_offers_unlocked_recipes() {
        let content = ContentData::load_bundled().unwrap();
        let book = RecipeBook::new(&content.recipes);
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        for _ in 0..50 {
            let recipe = book.random_order(&mut rng, 2).unwrap();
            assert!(RecipeBook::is_unlocked(recipe, 2));
        }
        assert!(RecipeBook::new(&[]).random_order(&mut rng, 5).is_none());
    }
}
