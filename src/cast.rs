//! Character cast, portrait asset naming and the celebration throttle.
//!
//! The quiz page owns the question flow; this module only holds the static
//! data it matches against and the naming rules shared with the sticker
//! compositor (slug, portrait path, export filename).

/// One matchable character.
#[derive(Clone, Copy, Debug)]
pub struct Character {
    pub name: &'static str,
    pub traits: &'static [&'static str],
    pub reference: &'static str,
    pub why_match: &'static str,
}

pub const CAST: &[Character] = &[
    Character {
        name: "Barnabas",
        traits: &["kind", "teacher", "joyful", "faithful"],
        reference: "Acts 4 - Known as the \u{201c}son of encouragement.\u{201d}",
        why_match: "You're an encourager like Barnabas, spreading joy and kindness!",
    },
    Character {
        name: "David",
        traits: &["brave", "creative", "faithful", "joyful"],
        reference: "1 Samuel 17 - Faced Goliath with faith.",
        why_match: "You're brave like David because you stand up for what's right!",
    },
    Character {
        name: "Paul",
        traits: &["adventurous", "teacher", "faithful", "brave", "resilient"],
        reference: "Philippians 4:13 - I can do all things through Christ.",
        why_match: "You're bold like Paul, adventurous and eager to share good news!",
    },
    Character {
        name: "Noah",
        traits: &["faithful", "patient", "protective", "resilient"],
        reference: "Genesis 6 - Built the ark when God asked.",
        why_match: "You're patient like Noah and you finish what you start!",
    },
    Character {
        name: "Esther",
        traits: &["brave", "wise", "protective", "leader"],
        reference: "Esther 4:14 - For such a time as this.",
        why_match: "You're courageous like Esther, speaking up for others!",
    },
    Character {
        name: "Moses",
        traits: &["leader", "patient", "faithful", "protective"],
        reference: "Exodus 14 - Led Israel through the sea.",
        why_match: "You're a leader like Moses, guiding friends with care!",
    },
    Character {
        name: "Ruth",
        traits: &["kind", "faithful", "helpful", "resilient"],
        reference: "Ruth 1:16 - Where you go, I will go.",
        why_match: "You're loyal like Ruth, sticking with the people you love!",
    },
    Character {
        name: "Daniel",
        traits: &["brave", "prayerful", "wise", "faithful"],
        reference: "Daniel 6 - Kept praying, even in the lions' den.",
        why_match: "You're steady like Daniel, faithful when it's hard!",
    },
    Character {
        name: "Deborah",
        traits: &["wise", "leader", "brave", "creative"],
        reference: "Judges 4 - Judged Israel under the palm tree.",
        why_match: "You're wise like Deborah, helping others make good choices!",
    },
    Character {
        name: "Joseph",
        traits: &["resilient", "wise", "kind", "creative"],
        reference: "Genesis 50:20 - God meant it for good.",
        why_match: "You're forgiving like Joseph, turning hard things into good!",
    },
    Character {
        name: "Mary",
        traits: &["faithful", "joyful", "prayerful", "kind"],
        reference: "Luke 1:38 - I am the Lord's servant.",
        why_match: "You're trusting like Mary, saying yes with a joyful heart!",
    },
    Character {
        name: "Peter",
        traits: &["adventurous", "brave", "leader", "joyful"],
        reference: "Matthew 14 - Stepped out of the boat.",
        why_match: "You're bold like Peter, jumping in with both feet!",
    },
    Character {
        name: "Tabitha (Dorcas)",
        traits: &["helpful", "kind", "creative", "generous"],
        reference: "Acts 9:36 - Always doing good and helping the poor.",
        why_match: "You're generous like Tabitha, making things to help others!",
    },
    Character {
        name: "Samuel",
        traits: &["prayerful", "teacher", "faithful", "wise"],
        reference: "1 Samuel 3:10 - Speak, for your servant is listening.",
        why_match: "You're a good listener like Samuel, ready to hear God!",
    },
    Character {
        name: "Miriam",
        traits: &["joyful", "creative", "protective", "leader"],
        reference: "Exodus 15:20 - Led the women in song.",
        why_match: "You're musical like Miriam, celebrating with everyone!",
    },
    Character {
        name: "Jonah",
        traits: &["adventurous", "resilient", "prayerful", "teacher"],
        reference: "Jonah 2 - Prayed from inside the great fish.",
        why_match: "You're a second-chance hero like Jonah, never giving up!",
    },
    Character {
        name: "Lydia",
        traits: &["generous", "helpful", "kind", "adventurous"],
        reference: "Acts 16:14 - Opened her home to Paul.",
        why_match: "You're welcoming like Lydia, making everyone feel at home!",
    },
];

/// Portraits whose file does not follow the slug rule.
const PORTRAIT_OVERRIDES: &[(&str, &str)] = &[
    ("David", "images/david.png"),
    ("Barnabas", "images/barnabas.png"),
    ("Paul", "images/saul-paul.png"),
];

/// URL-safe slug: lowercase, parenthetical text dropped, everything outside
/// `[a-z0-9 -]` removed, whitespace runs collapsed to a single hyphen.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut stripped = String::with_capacity(lower.len());
    let mut rest = lower.as_str();
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                stripped.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    stripped.push_str(rest);

    let kept: String = stripped
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Portrait location for `name`: explicit override first, then `images/<slug>.png`.
pub fn portrait_url(name: &str) -> String {
    PORTRAIT_OVERRIDES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, url)| (*url).to_string())
        .unwrap_or_else(|| format!("images/{}.png", slugify(name)))
}

/// Download name for a sticker of `name`.
pub fn sticker_filename(name: &str) -> String {
    format!("sticker_{}.png", slugify(name))
}

/// Character sharing the most traits with `answers`. Ties keep the earlier
/// cast entry.
pub fn best_match<S: AsRef<str>>(answers: &[S]) -> Option<&'static Character> {
    let mut best: Option<(&'static Character, usize)> = None;
    for c in CAST {
        let score = answers
            .iter()
            .filter(|a| c.traits.contains(&a.as_ref()))
            .count();
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((c, score));
        }
    }
    best.map(|(c, _)| c)
}

/// Minimum spacing between two celebrations.
pub const CELEBRATION_COOLDOWN_MS: f64 = 3000.0;

/// Throttles celebrations so repeated submits do not stack overlays.
#[derive(Debug, Default)]
pub struct CelebrationGate {
    last_at: Option<f64>,
}

impl CelebrationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true (and records `now_ms`) when a celebration may run.
    pub fn try_celebrate(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_at {
            if now_ms - last < CELEBRATION_COOLDOWN_MS {
                return false;
            }
        }
        self.last_at = Some(now_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_strips_parenthetical() {
        assert_eq!(slugify("Tabitha (Dorcas)"), "tabitha");
        assert_eq!(slugify("Noah"), "noah");
    }

    #[test]
    fn slug_collapses_whitespace_and_punctuation() {
        assert_eq!(slugify("  John the   Baptist! "), "john-the-baptist");
        assert_eq!(slugify("Saul / Paul"), "saul-paul");
        assert_eq!(slugify("Mary (mother) of (Jesus) x"), "mary-of-x");
    }

    #[test]
    fn slug_keeps_unclosed_paren_text() {
        assert_eq!(slugify("Eli (priest"), "eli-priest");
    }

    #[test]
    fn override_beats_slug() {
        assert_eq!(portrait_url("Paul"), "images/saul-paul.png");
        assert_eq!(portrait_url("Tabitha (Dorcas)"), "images/tabitha.png");
    }

    #[test]
    fn filename_uses_slug() {
        assert_eq!(sticker_filename("Tabitha (Dorcas)"), "sticker_tabitha.png");
    }

    #[test]
    fn best_match_prefers_first_on_tie() {
        // Barnabas and David both score 2 on these answers.
        let m = best_match(&["joyful", "faithful", "nope"]).unwrap();
        assert_eq!(m.name, "Barnabas");
        let m = best_match(&["brave", "creative", "faithful"]).unwrap();
        assert_eq!(m.name, "David");
    }

    #[test]
    fn gate_throttles_within_cooldown() {
        let mut gate = CelebrationGate::new();
        assert!(gate.try_celebrate(10.0));
        assert!(!gate.try_celebrate(2_000.0));
        assert!(gate.try_celebrate(3_010.0));
        assert!(!gate.try_celebrate(3_011.0));
    }
}
