//! Kitchen Game Engine
//!
//! Platform-agnostic cooking round engine: ingredient rolls, meters, jackpot,
//! fire boost and shield modifiers, graded rewards and player progression.
//! This crate provides all game mechanics without UI or platform-specific dependencies.

pub mod boosters;
pub mod config;
pub mod constants;
pub mod data;
pub mod events;
pub mod fire_boost;
pub mod jackpot;
pub mod meter;
pub mod numbers;
pub mod progress;
pub mod recipe_book;
pub mod reward;
pub mod rng;
pub mod scheduler;
pub mod seed;
pub mod session;
pub mod shield;
pub mod wallet;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use boosters::{ActiveBoosters, BoosterInventory, BoosterKind};
pub use config::{ConfigError, CookingConfig};
pub use data::{
    Attribute, ContentData, ContentError, Deltas, Difficulty, IngredientRoll, IngredientSpec,
    Rarity, RecipeSpec, TargetRange,
};
pub use events::{Rejection, SessionEvent};
pub use fire_boost::{BoostPhase, BoostTick, FireBoostConfig, FireBoostModule};
pub use jackpot::{JackpotConfig, JackpotEffect, JackpotModule};
pub use meter::{MeterState, Meters};
pub use progress::{PlayerProgress, ProgressConfig, ProgressTracker, ProgressUpdate, Progression};
pub use recipe_book::RecipeBook;
pub use reward::{Grade, RewardConfig, RewardResult, calculate_reward};
pub use rng::KitchenRng;
pub use scheduler::{Scheduler, TaskId};
pub use seed::{
    ShareCode, decode_to_seed, encode_friendly, generate_code_from_entropy, parse_share_code,
};
pub use session::{
    ConfigurationError, CookingSession, FailureCause, SessionError, SessionOutcome, SessionPhase,
};
pub use shield::ShieldModule;
pub use wallet::{CoinSink, Wallet};

/// Session type created by [`KitchenEngine`] for a stored profile.
pub type ProfileSession = CookingSession<Progression, Wallet>;

/// Trait for abstracting content loading operations
/// Platform-specific implementations should provide this
pub trait ContentLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load recipe and ingredient tables from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be loaded.
    fn load_content(&self) -> Result<ContentData, Self::Error>;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Trait for abstracting profile save/load operations
pub trait ProfileStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// # Errors
    ///
    /// Returns an error if the profile cannot be saved.
    fn save_profile(&self, slot: &str, profile: &PlayerProfile) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the profile cannot be loaded.
    fn load_profile(&self, slot: &str) -> Result<Option<PlayerProfile>, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the profile cannot be deleted.
    fn delete_profile(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Everything that outlives a single cooking session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(default)]
    pub progress: PlayerProgress,
    #[serde(default)]
    pub wallet: Wallet,
    #[serde(default)]
    pub boosters: BoosterInventory,
}

impl PlayerProfile {
    /// Copy progress and coins back out of a finished session.
    pub fn absorb(&mut self, session: ProfileSession) {
        let (progression, wallet) = session.into_parts();
        self.progress = progression.into_data();
        self.wallet = wallet;
    }
}

/// Main engine for creating cooking sessions and persisting profiles
pub struct KitchenEngine<L, S>
where
    L: ContentLoader,
    S: ProfileStorage,
{
    content_loader: L,
    storage: S,
}

impl<L, S> KitchenEngine<L, S>
where
    L: ContentLoader,
    S: ProfileStorage,
{
    pub const fn new(content_loader: L, storage: S) -> Self {
        Self {
            content_loader,
            storage,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the cooking config cannot be loaded.
    pub fn cooking_config(&self) -> Result<CookingConfig, L::Error> {
        self.content_loader.load_config("cooking")
    }

    /// # Errors
    ///
    /// Returns an error if the progression config cannot be loaded.
    pub fn progress_config(&self) -> Result<ProgressConfig, L::Error> {
        self.content_loader.load_config("progress")
    }

    /// Build a session for `profile`. The profile is copied in; hand the
    /// finished session to [`PlayerProfile::absorb`] to keep the results.
    ///
    /// # Errors
    ///
    /// Returns an error if content or configuration cannot be loaded.
    pub fn create_session(
        &self,
        seed: u64,
        profile: &PlayerProfile,
    ) -> Result<ProfileSession, L::Error> {
        let content = self.content_loader.load_content()?;
        let config = self.cooking_config()?;
        let progression = Progression::new(self.progress_config()?, profile.progress.clone());
        Ok(CookingSession::new(
            config,
            content,
            seed,
            progression,
            profile.wallet,
        ))
    }

    /// Build a session from a share code.
    ///
    /// # Errors
    ///
    /// Returns an error if content or configuration cannot be loaded.
    /// Unknown codes yield `Ok(None)`.
    pub fn create_session_from_code(
        &self,
        code: &str,
        profile: &PlayerProfile,
    ) -> Result<Option<(Difficulty, ProfileSession)>, L::Error> {
        let Some(share) = parse_share_code(code) else {
            return Ok(None);
        };
        let session = self.create_session(share.seed, profile)?;
        Ok(Some((share.difficulty, session)))
    }

    /// # Errors
    ///
    /// Returns an error if the profile cannot be saved.
    pub fn save_profile(&self, slot: &str, profile: &PlayerProfile) -> Result<(), S::Error> {
        self.storage.save_profile(slot, profile)
    }

    /// Load a profile and check it against the current progression curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile or the progression config cannot be loaded.
    pub fn load_profile(&self, slot: &str) -> Result<Option<PlayerProfile>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let Some(mut profile) = self.storage.load_profile(slot).map_err(Into::into)? else {
            return Ok(None);
        };
        let config = self.progress_config().map_err(Into::into)?;
        profile.progress.level = profile.progress.level.clamp(1, config.max_level.max(1));
        Ok(Some(profile))
    }

    /// # Errors
    ///
    /// Returns an error if the profile cannot be deleted.
    pub fn delete_profile(&self, slot: &str) -> Result<(), S::Error> {
        self.storage.delete_profile(slot)
    }
}
