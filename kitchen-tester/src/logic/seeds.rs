use anyhow::{Context, Result, bail};
use kitchen_game::seed::WORD_LIST;
use kitchen_game::{Difficulty, encode_friendly, parse_share_code};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Anything shaped like `EZ-BASIL42`, valid word or not.
static SHARE_CODE_SHAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?i)[a-z]{2}-[a-z]+\d{2}$").ok());

/// Detailed seed metadata used for logic runs.
#[derive(Debug, Clone)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            code: None,
            difficulty: None,
        }
    }

    #[must_use]
    pub const fn from_share_code(seed: u64, difficulty: Difficulty, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
            difficulty: Some(difficulty),
        }
    }

    /// Share code for this seed, rendered for `difficulty` when it did not
    /// come from one.
    #[must_use]
    pub fn share_code(&self, difficulty: Difficulty) -> String {
        match (&self.code, self.difficulty) {
            (Some(code), Some(source)) if source == difficulty => code.clone(),
            _ => encode_friendly(difficulty, self.seed),
        }
    }
}

#[must_use]
pub fn looks_like_share_code(token: &str) -> bool {
    SHARE_CODE_SHAPE
        .as_ref()
        .is_some_and(|re| re.is_match(token.trim()))
}

/// Resolve a list of CLI seed arguments into canonical seed metadata.
///
/// Supports literal integers, share codes, and the special keywords
/// `all` / `available` which expand to every share-code seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();
    let mut request_all = false;

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("all") || token.eq_ignore_ascii_case("available") {
            request_all = true;
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Some(share) = parse_share_code(token) {
            pending.push(SeedInfo::from_share_code(
                share.seed,
                share.difficulty,
                token.trim().to_uppercase(),
            ));
            continue;
        }

        if looks_like_share_code(token) {
            bail!("Share code {token} uses an unknown difficulty or word");
        }
        bail!("Unrecognized seed token: {token}");
    }

    if request_all {
        pending.extend(generate_all_share_code_seeds()?);
    }

    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<(u64, Option<Difficulty>), usize> = HashMap::new();

    for info in pending {
        let key = (info.seed, info.difficulty);
        if let Some(existing) = index.get(&key).and_then(|i| deduped.get_mut(*i)) {
            if existing.code.is_none() && info.code.is_some() {
                *existing = info;
            }
        } else {
            index.insert(key, deduped.len());
            deduped.push(info);
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(1337));
    }

    Ok(deduped)
}

fn generate_all_share_code_seeds() -> Result<Vec<SeedInfo>> {
    let mut seeds = Vec::with_capacity(WORD_LIST.len() * 100 * Difficulty::ALL.len());

    for difficulty in Difficulty::ALL {
        for word in WORD_LIST {
            for suffix in 0..100 {
                let code = format!("{}-{word}{suffix:02}", difficulty.code());
                let share = parse_share_code(&code)
                    .with_context(|| format!("failed to parse share code: {code}"))?;
                seeds.push(SeedInfo::from_share_code(share.seed, share.difficulty, code));
            }
        }
    }

    Ok(seeds)
}
