use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Target character-length band for generated stories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthBand {
    /// 600-900 characters, roughly one minute of narration
    Short,
    /// 1200-1500 characters, roughly two minutes of narration
    Long,
}

impl LengthBand {
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            LengthBand::Short => (600, 900),
            LengthBand::Long => (1200, 1500),
        }
    }

    fn narration_minutes(&self) -> u32 {
        match self {
            LengthBand::Short => 1,
            LengthBand::Long => 2,
        }
    }
}

pub const TITLE_SYSTEM_PROMPT: &str = "Generate a short, plain title (2-5 words) for this horror story. \
Avoid melodramatic words such as \"terror\", \"nightmare\", \"horror\", \"dread\" or \"doom\". \
Just the title, nothing else.";

/// System instruction for the story call
pub fn story_system_prompt(theme: &str, band: LengthBand, seed: &str) -> String {
    let (min, max) = band.bounds();
    let minutes = band.narration_minutes();

    format!(
        "You are a master horror storyteller. Generate a terrifying, original horror/thriller story \
told from a first-person narrator's perspective. The story MUST:

1. Be EXACTLY between {min}-{max} characters (this is crucial for {minutes}-minute audio)
2. Start with a gripping hook that immediately draws the reader in
3. Build suspense throughout with vivid, atmospheric descriptions
4. Include an unexpected twist ending that sends chills down the spine
5. Be completely original - never repeat plots, characters, or settings
6. Use the theme \"{theme}\" as inspiration but make it unique
7. Write as \"I\" - the narrator experiencing these events

IMPORTANT:
- Count characters carefully - stay within {min}-{max} characters
- Make every word count - no filler
- The twist must be genuinely surprising
- Create a sense of dread and unease throughout

Unique seed for this story: {seed}"
    )
}

/// User message for the story call
pub fn story_user_prompt(theme: &str, story_number: u64) -> String {
    format!(
        "Generate a unique horror story. Theme: {theme}. Story number: {story_number}. \
Make it original and terrifying."
    )
}

/// Seed embedded in the prompt to discourage verbatim repetition:
/// the timestamp in base 36 followed by a random suffix.
pub fn uniqueness_seed(now: DateTime<Utc>, suffix: u64) -> String {
    format!(
        "{}{}",
        to_base36(now.timestamp_millis().unsigned_abs()),
        to_base36(suffix)
    )
}

/// Strip every double quote and the surrounding whitespace from a title
pub fn clean_title(raw: &str) -> String {
    raw.replace('"', "").trim().to_string()
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
