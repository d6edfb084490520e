/// Themes a story can be generated from
pub const THEMES: &[&str] = &[
    "haunted house",
    "paranormal encounter",
    "psychological horror",
    "supernatural creature",
    "cursed object",
    "abandoned asylum",
    "demonic possession",
    "urban legend",
    "mysterious stranger",
    "nightmare realm",
    "forest horror",
    "mirror dimension",
    "time loop terror",
    "doppelganger",
    "vengeful spirit",
];

/// Default theme catalogue as owned strings
pub fn default_themes() -> Vec<String> {
    THEMES.iter().map(|t| t.to_string()).collect()
}

/// Index of the theme for a corpus of `story_count` stories and a random
/// draw in `[0, theme_count)`.
///
/// A soft variety heuristic: consecutive stories tend to rotate through the
/// list, but repeats are possible.
pub fn theme_index(story_count: u64, draw: usize, theme_count: usize) -> usize {
    debug_assert!(theme_count > 0);
    let count = theme_count as u64;
    ((story_count % count + draw as u64 % count) % count) as usize
}
