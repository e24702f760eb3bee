//! Cover-image prompt construction.
//!
//! The prompt is assembled from three deterministic ingredients:
//!
//! 1. the course title and description, as free text;
//! 2. a topic category, chosen by keyword matching against a fixed,
//!    priority-ordered table — the first matching category wins;
//! 3. a per-course style seed derived from a SHA-256 digest of
//!    id + title + description, which selects a palette and composition so
//!    two courses with similar text still render visually distinct covers.
//!
//! Everything here is pure; identical inputs always produce the identical
//! prompt string.

use crate::hashing::sha256_hex;
use crate::types::DbId;

/// A topic category with the keywords that select it and the style phrase
/// it contributes to the prompt.
struct Category {
    name: &'static str,
    keywords: &'static [&'static str],
    style: &'static str,
}

/// Priority-ordered category table. Earlier entries win over later ones, so
/// a "machine learning for business" course classifies as technology, not
/// business.
const CATEGORIES: &[Category] = &[
    Category {
        name: "technology",
        keywords: &[
            "programming",
            "software",
            "coding",
            "developer",
            "machine learning",
            "data science",
            "computer",
            "web",
            "cloud",
            "security",
        ],
        style: "circuit-inspired geometric patterns, futuristic",
    },
    Category {
        name: "business",
        keywords: &[
            "business",
            "marketing",
            "finance",
            "management",
            "entrepreneur",
            "sales",
            "leadership",
            "startup",
        ],
        style: "clean professional composition, skyline motifs",
    },
    Category {
        name: "design",
        keywords: &[
            "design",
            "art",
            "illustration",
            "photography",
            "drawing",
            "creative",
            "ux",
            "typography",
        ],
        style: "painterly textures, bold artistic strokes",
    },
    Category {
        name: "science",
        keywords: &[
            "science",
            "physics",
            "chemistry",
            "biology",
            "mathematics",
            "math",
            "engineering",
            "astronomy",
        ],
        style: "scientific diagrams, precise line work",
    },
    Category {
        name: "language",
        keywords: &[
            "language",
            "english",
            "spanish",
            "french",
            "writing",
            "grammar",
            "communication",
        ],
        style: "typographic collage, layered letterforms",
    },
    Category {
        name: "health",
        keywords: &[
            "health",
            "fitness",
            "yoga",
            "nutrition",
            "wellness",
            "meditation",
            "mindfulness",
        ],
        style: "organic flowing shapes, calm natural forms",
    },
];

/// Style phrase used when no category keyword matches.
const DEFAULT_STYLE: &str = "abstract educational motifs, balanced composition";

/// Color palettes indexed by the style seed.
const PALETTES: &[&str] = &[
    "deep blue and warm amber",
    "emerald green and soft gold",
    "violet and coral",
    "teal and sunset orange",
    "crimson and slate grey",
    "indigo and mint",
    "ochre and midnight navy",
    "magenta and charcoal",
];

/// Composition hints indexed by the style seed.
const COMPOSITIONS: &[&str] = &[
    "central focal point",
    "diagonal dynamic layout",
    "layered depth with soft gradients",
    "minimalist negative space",
    "radial symmetry",
    "asymmetric grid",
];

/// Find the first category whose keywords appear in the text.
fn category_of(title: &str, description: &str) -> Option<&'static Category> {
    let haystack = format!("{} {}", title.to_lowercase(), description.to_lowercase());
    CATEGORIES
        .iter()
        .find(|c| c.keywords.iter().any(|k| haystack.contains(k)))
}

/// Classify a course into a topic category by keyword matching.
///
/// Matching is case-insensitive over title and description. Returns the
/// category name, or `None` when nothing matches.
pub fn classify_topic(title: &str, description: &str) -> Option<&'static str> {
    category_of(title, description).map(|c| c.name)
}

/// Derive the deterministic style seed for a course.
///
/// The seed is the first 8 hex chars of sha256(id:title:description),
/// interpreted as a u32. Stable across runs, distinct across courses.
pub fn style_seed(course_id: DbId, title: &str, description: &str) -> u32 {
    let digest = sha256_hex(format!("{course_id}:{title}:{description}").as_bytes());
    // The digest is lowercase hex, so this parse cannot fail.
    u32::from_str_radix(&digest[..8], 16).unwrap_or(0)
}

/// Build the full generation prompt for a course cover.
pub fn build_cover_prompt(course_id: DbId, title: &str, description: &str) -> String {
    let seed = style_seed(course_id, title, description);
    let palette = PALETTES[seed as usize % PALETTES.len()];
    let composition = COMPOSITIONS[(seed >> 8) as usize % COMPOSITIONS.len()];

    let style = category_of(title, description)
        .map(|c| c.style)
        .unwrap_or(DEFAULT_STYLE);

    let summary = truncate(description, 200);

    format!(
        "Course cover illustration for \"{title}\". {summary} \
         Style: {style}. Color palette: {palette}. Composition: {composition}. \
         No text, no words, no letters. High quality, professional, 16:9."
    )
}

/// Build the generation prompt for an inline module image.
///
/// Module images sit inside lesson content, so the prompt asks for a
/// supporting illustration rather than a hero cover.
pub fn build_module_prompt(module_id: DbId, course_title: &str, module_title: &str) -> String {
    let seed = style_seed(module_id, module_title, course_title);
    let palette = PALETTES[seed as usize % PALETTES.len()];

    format!(
        "Educational illustration for the lesson \"{module_title}\" in the course \
         \"{course_title}\". Clear, simple, supporting visual. \
         Color palette: {palette}. No text, no words, no letters. 4:3."
    )
}

/// Truncate a string to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_first_match_wins() {
        // Matches both "machine learning" (technology) and "business";
        // technology is earlier in the table and must win.
        let topic = classify_topic("Machine Learning for Business", "");
        assert_eq!(topic, Some("technology"));
    }

    #[test]
    fn classifier_is_case_insensitive() {
        assert_eq!(classify_topic("YOGA Basics", ""), Some("health"));
        assert_eq!(classify_topic("", "Learn French fast"), Some("language"));
    }

    #[test]
    fn classifier_returns_none_without_keywords() {
        assert_eq!(classify_topic("Untitled", "nothing relevant here"), None);
    }

    #[test]
    fn style_seed_is_deterministic() {
        let a = style_seed(1, "Rust", "Systems programming");
        let b = style_seed(1, "Rust", "Systems programming");
        assert_eq!(a, b);
    }

    #[test]
    fn style_seed_differs_across_courses() {
        let a = style_seed(1, "Rust", "Systems programming");
        let b = style_seed(2, "Rust", "Systems programming");
        assert_ne!(a, b);
    }

    #[test]
    fn cover_prompt_is_deterministic_and_contains_title() {
        let p1 = build_cover_prompt(7, "Intro to Photography", "Camera basics");
        let p2 = build_cover_prompt(7, "Intro to Photography", "Camera basics");
        assert_eq!(p1, p2);
        assert!(p1.contains("Intro to Photography"));
        // Photography classifies as design.
        assert!(p1.contains("painterly textures"));
        assert!(p1.contains("No text"));
    }

    #[test]
    fn uncategorized_course_uses_default_style() {
        let p = build_cover_prompt(9, "Miscellany", "Assorted topics");
        assert!(p.contains("abstract educational motifs"));
    }

    #[test]
    fn long_description_is_truncated() {
        let long = "x".repeat(500);
        let p = build_cover_prompt(3, "T", &long);
        assert!(p.len() < 600);
    }

    #[test]
    fn module_prompt_mentions_both_titles() {
        let p = build_module_prompt(5, "Rust Course", "Ownership");
        assert!(p.contains("Ownership"));
        assert!(p.contains("Rust Course"));
    }
}
