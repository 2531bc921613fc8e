//! Alternative sampling and the color vocabulary (§4.1, supplemented by §11).

use super::types::{Question, QuestionId, QuestionKind, QuestionOption};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

/// The enumerated color vocabulary that `color`-kind alternatives are
/// normalized to.
pub const COLOR_VOCABULARY: &[&str] = &[
    "Red", "Green", "Blue", "Yellow", "Purple", "Gold", "Silver", "Pink", "Black", "White",
    "Brown", "Orange", "Gray",
];

/// Colors that are visually confusable and should not co-occur among a
/// single question's displayed alternatives.
const CONFUSABLE_GROUPS: &[&[&str]] = &[&["Yellow", "Gold", "Orange"], &["Silver", "Gray"]];

/// Normalize a free-text color alternative to the canonical vocabulary entry,
/// matching case-insensitively and trimming whitespace. Unrecognized input is
/// returned unchanged so upstream authoring bugs surface rather than silently
/// vanish.
pub fn normalize_color(raw: &str) -> String {
    let trimmed = raw.trim();
    COLOR_VOCABULARY
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
        .map(|candidate| (*candidate).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Colors confusable with `color` (including `color` itself), per
/// [`CONFUSABLE_GROUPS`]. Empty if `color` belongs to no group.
fn confusable_with(color: &str) -> Vec<&'static str> {
    CONFUSABLE_GROUPS
        .iter()
        .find(|group| group.iter().any(|c| c.eq_ignore_ascii_case(color)))
        .map(|group| group.to_vec())
        .unwrap_or_default()
}

/// Build the displayed alternatives for `question`: every correct option (up
/// to `total`), filled out with the question's own distractors, then
/// (if still short) distractors drawn from other questions of the same kind
/// with disjoint text. The result is a Fisher–Yates permutation of that set,
/// deterministic for a given `seed`.
///
/// `options_by_question` and `options_for_kind` together stand in for a
/// catalog lookup: the former gives `question`'s own options, the latter
/// gives every option belonging to a question of the same kind (used only as
/// a distractor pool when `question`'s own options don't fill `total`).
pub fn sample_alternatives(
    question: &Question,
    own_options: &[QuestionOption],
    same_kind_options: &HashMap<QuestionId, Vec<QuestionOption>>,
    total: usize,
    seed: u64,
) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);

    let is_color = question.kind == QuestionKind::Color;
    let render = |text: &str| -> String {
        if is_color {
            normalize_color(text)
        } else {
            text.to_string()
        }
    };

    let mut chosen: Vec<String> = Vec::with_capacity(total);
    let mut seen_lower: Vec<String> = Vec::with_capacity(total);
    let mut excluded: Vec<&'static str> = Vec::new();

    let mut push_unique = |text: String, excluded: &mut Vec<&'static str>| -> bool {
        let lower = text.to_ascii_lowercase();
        if seen_lower.contains(&lower) {
            return false;
        }
        if is_color && excluded.iter().any(|c| c.eq_ignore_ascii_case(&text)) {
            return false;
        }
        if is_color {
            excluded.extend(confusable_with(&text));
        }
        seen_lower.push(lower);
        chosen.push(text);
        true
    };

    for option in own_options.iter().filter(|o| o.is_correct) {
        if chosen.len() >= total {
            break;
        }
        push_unique(render(&option.text), &mut excluded);
    }

    for option in own_options.iter().filter(|o| !o.is_correct) {
        if chosen.len() >= total {
            break;
        }
        push_unique(render(&option.text), &mut excluded);
    }

    if chosen.len() < total {
        let mut pool: Vec<String> = same_kind_options
            .iter()
            .filter(|(qid, _)| **qid != question.id)
            .flat_map(|(_, opts)| opts.iter().map(|o| render(&o.text)))
            .collect();
        pool.shuffle(&mut rng);

        for candidate in pool {
            if chosen.len() >= total {
                break;
            }
            push_unique(candidate, &mut excluded);
        }
    }

    chosen.shuffle(&mut rng);
    chosen
}
