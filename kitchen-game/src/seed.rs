//! Replay share codes.
//!
//! A code reads `<DIFF>-<WORD><NN>` (for example `EZ-BASIL42` or
//! `EL-SAFFRON07`). The low 16 bits of the seed carry the word index and
//! number; the high bits come from a hash of the code so every code maps to
//! exactly one seed.
use crate::data::Difficulty;

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

fn normalize(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub const WORD_LIST: [&str; 64] = [
    "BASIL", "TOMATO", "BUTTER", "SALT", "SAFFRON", "PEPPER", "GARLIC", "ONION", "LEEK", "THYME",
    "SAGE", "MINT", "FENNEL", "CLOVE", "GINGER", "LEMON", "LIME", "HONEY", "CREAM", "FLOUR",
    "SUGAR", "YEAST", "OLIVE", "CAPER", "TRUFFLE", "MOREL", "SHALLOT", "CHIVE", "DILL", "PAPRIKA",
    "CUMIN", "NUTMEG", "VANILLA", "COCOA", "ALMOND", "WALNUT", "PECAN", "MAPLE", "SYRUP", "BROTH",
    "STOCK", "SAUCE", "GLAZE", "ROUX", "WHISK", "LADLE", "SKILLET", "WOK", "OVEN", "EMBER",
    "FLAME", "SIMMER", "SEAR", "BRAISE", "ROAST", "POACH", "DRAGON", "COMET", "STAR", "MOON",
    "NEBULA", "ORBIT", "SOUFFLE", "SPOON",
];

const WORD_MASK: u16 = 0x01FF;
const NUMBER_MASK: u16 = 0x7F;

#[inline]
const fn pack(word_index: u16, number: u8) -> u16 {
    (word_index & WORD_MASK) | (((number as u16) & NUMBER_MASK) << 9)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    let number = u8::try_from((packed >> 9) & NUMBER_MASK).unwrap_or(0);
    (packed & WORD_MASK, number)
}

fn compose_seed(difficulty: Difficulty, word_index: u16, number: u8) -> u64 {
    let packed = pack(word_index, number);
    let [low, high] = packed.to_le_bytes();
    let tag = difficulty.code().as_bytes();
    let mut buf = [0u8; 11];
    buf[..6].copy_from_slice(b"KITCH-");
    buf[6] = tag.first().copied().unwrap_or(b'E');
    buf[7] = tag.get(1).copied().unwrap_or(b'Z');
    buf[8] = low;
    buf[9] = high;
    buf[10] = 0x5A;
    (fnv1a64(&buf) & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

/// Render a seed as a share code for `difficulty`.
#[must_use]
pub fn encode_friendly(difficulty: Difficulty, seed: u64) -> String {
    let packed = u16::try_from(seed & 0xFFFF).unwrap_or(0);
    let (word_index, number) = unpack(packed);
    let word = WORD_LIST
        .get(usize::from(word_index) % WORD_LIST.len())
        .copied()
        .unwrap_or(WORD_LIST[0]);
    format!("{}-{word}{:02}", difficulty.code(), number % 100)
}

/// Decode a share code into its difficulty and replay seed.
#[must_use]
pub fn decode_to_seed(code: &str) -> Option<(Difficulty, u64)> {
    let (tag, rest) = code.trim().split_once('-')?;
    let difficulty = Difficulty::from_code(tag)?;
    if rest.len() < 3 || !rest.is_char_boundary(rest.len() - 2) {
        return None;
    }
    let (word_part, number_part) = rest.split_at(rest.len() - 2);
    if !number_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number: u8 = number_part.parse().ok()?;
    let word = normalize(word_part);
    let index = WORD_LIST.iter().position(|w| *w == word)?;
    let word_index = u16::try_from(index).ok()?;
    Some((difficulty, compose_seed(difficulty, word_index, number)))
}

/// Derive a fresh share code from arbitrary entropy (a clock, an OS RNG...).
#[must_use]
pub fn generate_code_from_entropy(difficulty: Difficulty, entropy: u64) -> String {
    let len = u64::try_from(WORD_LIST.len()).unwrap_or(1);
    let word_index = u16::try_from(entropy % len).unwrap_or(0);
    let number = u8::try_from((entropy >> 17) % 100).unwrap_or(0);
    encode_friendly(difficulty, compose_seed(difficulty, word_index, number))
}

/// A parsed share code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareCode {
    pub difficulty: Difficulty,
    pub seed: u64,
}

/// Parse a share code, accepting lowercase and surrounding whitespace.
#[must_use]
pub fn parse_share_code(code: &str) -> Option<ShareCode> {
    decode_to_seed(code).map(|(difficulty, seed)| ShareCode { difficulty, seed })
}
