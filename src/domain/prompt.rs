//! Lines the user is asked to read aloud before a voice score.
//!
//! Prompts are grouped by language code. Unknown codes fall back to English.

use rand::seq::SliceRandom;
use rand::Rng;

/// Language code used when no other table matches.
pub const DEFAULT_LANGUAGE: &str = "en";

const ENGLISH: &[&str] = &[
    "Does my voice sound flirty or nerdy?",
    "Can you fall for a voice like mine?",
    "What does my voice make you feel?",
];

const HINDI: &[&str] = &[
    "क्या मेरी आवाज़ तुम्हारा दिल छू सकती है?",
    "इस आवाज़ में कोई जादू है क्या?",
    "बोलूं या फिर तुम्हें पिघलने दूं?",
];

/// Per-language prompt table.
///
/// ```
/// use attempt_gate::VoicePrompts;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut rng = StdRng::seed_from_u64(3);
/// let prompt = VoicePrompts::pick(&mut rng, "fr");
/// assert!(VoicePrompts::for_language("en").contains(&prompt));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct VoicePrompts;

impl VoicePrompts {
    /// Whether `language` has its own table.
    pub fn is_supported(language: &str) -> bool {
        Self::table(language).is_some()
    }

    /// All prompts for `language`, or the English ones if it has none.
    pub fn for_language(language: &str) -> &'static [&'static str] {
        Self::table(language).unwrap_or(ENGLISH)
    }

    /// Draw one prompt for `language`.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R, language: &str) -> &'static str {
        let prompts = Self::for_language(language);
        prompts.choose(rng).copied().unwrap_or(ENGLISH[0])
    }

    /// Caption shown above the prompt.
    pub fn instruction(language: &str) -> &'static str {
        if language.trim().eq_ignore_ascii_case("hi") {
            "यह लाइन पढ़ें:"
        } else {
            "Read this line:"
        }
    }

    fn table(language: &str) -> Option<&'static [&'static str]> {
        let language = language.trim();
        if language.eq_ignore_ascii_case("en") {
            Some(ENGLISH)
        } else if language.eq_ignore_ascii_case("hi") {
            Some(HINDI)
        } else {
            None
        }
    }
}
