//! English lexicon for the heuristic parser.
//!
//! Closed-class words map straight to a POS tag. Open-class verbs are listed
//! by base form and matched through regular inflection rules plus a table of
//! irregular forms.

use std::collections::{HashMap, HashSet};

use super::PosTag;

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "no",
    "all", "both", "either", "neither", "another", "its", "their", "his", "her", "our", "my",
    "your", "such", "several", "many", "much", "few", "various",
];

const PREPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "with", "from", "into", "onto", "over", "under",
    "about", "through", "across", "between", "among", "during", "via", "within", "without",
    "after", "before", "near", "along", "around", "above", "below", "beyond", "towards",
    "toward", "upon", "per", "since", "until", "against", "throughout", "like", "including",
];

const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "which", "who",
    "whom", "what", "itself", "themselves",
];

const AUXILIARIES: &[&str] = &[
    "is", "are", "was", "were", "be", "been", "being", "am", "has", "have", "had", "having",
    "do", "does", "did", "will", "would", "can", "could", "shall", "should", "may", "might",
    "must",
];

const BE_FORMS: &[&str] = &["is", "are", "was", "were", "be", "been", "being", "am"];

const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "yet"];

const SUBORDINATORS: &[&str] = &[
    "because", "although", "though", "while", "whereas", "if", "unless", "when", "where",
    "whether", "as",
];

const PARTICLES: &[&str] = &["to", "not", "n't"];

const ADVERBS: &[&str] = &[
    "also", "very", "only", "just", "now", "then", "here", "there", "often", "always",
    "never", "again", "still", "already", "soon", "well", "too", "more", "most", "less",
    "least", "further", "however", "therefore", "thus", "currently", "daily", "hourly",
];

/// Verb base forms. Portal vocabulary first, then common general verbs.
const VERBS: &[&str] = &[
    // Earth observation / data portal
    "launch", "orbit", "observe", "measure", "monitor", "track", "image", "sense", "scan",
    "retrieve", "estimate", "forecast", "predict", "archive", "disseminate", "distribute",
    "process", "calibrate", "validate", "acquire", "collect", "record", "detect", "map",
    "capture", "transmit", "receive", "carry", "host", "operate", "deploy", "release",
    "download", "upload", "register", "subscribe", "visualize", "analyze", "analyse",
    "derive", "generate", "produce", "compute", "calculate", "simulate", "assimilate",
    "cover", "study", "survey", "explore", "land", "reach", "enter", "circle", "revolve",
    // General
    "provide", "offer", "support", "enable", "allow", "help", "use", "utilize", "include",
    "contain", "comprise", "consist", "develop", "design", "build", "create", "make",
    "establish", "manage", "maintain", "serve", "deliver", "give", "show", "display",
    "describe", "explain", "present", "report", "publish", "announce", "access",
    "search", "find", "view", "select", "request", "require", "need", "want", "become",
    "get", "take", "send", "bring", "hold", "lead", "see", "know", "grow", "go", "come",
    "run", "write", "read", "keep", "leave", "mean", "meet", "pay", "put", "set", "spend",
    "stand", "tell", "think", "understand", "win", "fly", "begin", "belong", "depend",
    "relate", "refer", "represent", "indicate", "affect", "cause", "influence", "improve",
    "increase", "decrease", "reduce", "change", "vary", "rise", "fall", "form", "occur",
    "happen", "remain", "continue", "start", "stop", "complete", "achieve", "perform",
    "conduct", "implement", "integrate", "connect", "link", "combine", "compare", "identify",
    "classify", "determine", "evaluate", "assess", "check", "test", "verify", "fund",
    "own", "partner", "collaborate", "coordinate", "control", "plan", "schedule",
    "focus", "aim", "work", "lie", "locate", "situate", "base", "feature",
];

/// Irregular inflected forms → base form.
const IRREGULAR_VERBS: &[(&str, &str)] = &[
    ("made", "make"), ("gave", "give"), ("given", "give"), ("took", "take"),
    ("taken", "take"), ("began", "begin"), ("begun", "begin"), ("built", "build"),
    ("sent", "send"), ("found", "find"), ("brought", "bring"), ("held", "hold"),
    ("led", "lead"), ("saw", "see"), ("seen", "see"), ("shown", "show"), ("knew", "know"),
    ("known", "know"), ("grew", "grow"), ("grown", "grow"), ("got", "get"),
    ("gotten", "get"), ("went", "go"), ("gone", "go"), ("came", "come"),
    ("became", "become"), ("ran", "run"), ("wrote", "write"), ("written", "write"),
    ("kept", "keep"), ("left", "leave"), ("meant", "mean"), ("met", "meet"),
    ("paid", "pay"), ("spent", "spend"), ("stood", "stand"), ("told", "tell"),
    ("thought", "think"), ("understood", "understand"), ("won", "win"), ("flew", "fly"),
    ("flown", "fly"), ("lay", "lie"), ("rose", "rise"), ("risen", "rise"), ("fell", "fall"),
    ("fallen", "fall"),
];

const ABBREVIATIONS: &[&str] = &[
    "e.g", "i.e", "etc", "vs", "dr", "mr", "mrs", "ms", "prof", "fig", "approx", "st", "no",
    "sr", "jr", "dept", "govt",
];

/// The lexicon: maps surface forms to coarse POS tags and verb lemmas.
pub struct Lexicon {
    closed_class: HashMap<&'static str, PosTag>,
    be_forms: HashSet<&'static str>,
    verbs: HashSet<&'static str>,
    irregular: HashMap<&'static str, &'static str>,
    abbreviations: HashSet<&'static str>,
}

impl Lexicon {
    /// Build the default English lexicon.
    pub fn default_english() -> Self {
        let mut closed_class = HashMap::new();
        // Later groups win on overlap ("that" is a determiner, "to" a particle).
        for (words, tag) in [
            (PRONOUNS, PosTag::Pron),
            (PREPOSITIONS, PosTag::Adp),
            (SUBORDINATORS, PosTag::Sconj),
            (ADVERBS, PosTag::Adv),
            (DETERMINERS, PosTag::Det),
            (CONJUNCTIONS, PosTag::Cconj),
            (AUXILIARIES, PosTag::Aux),
            (PARTICLES, PosTag::Part),
        ] {
            for word in words {
                closed_class.insert(*word, tag);
            }
        }

        Self {
            closed_class,
            be_forms: BE_FORMS.iter().copied().collect(),
            verbs: VERBS.iter().copied().collect(),
            irregular: IRREGULAR_VERBS.iter().copied().collect(),
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
        }
    }

    /// Tag for a closed-class word (lowercase input).
    pub fn closed_class(&self, lower: &str) -> Option<PosTag> {
        self.closed_class.get(lower).copied()
    }

    /// Whether the word is a form of "be".
    pub fn is_be_form(&self, lower: &str) -> bool {
        self.be_forms.contains(lower)
    }

    /// Whether the word (without its final period) is a known abbreviation.
    pub fn is_abbreviation(&self, lower: &str) -> bool {
        self.abbreviations.contains(lower)
    }

    /// Base form of a known verb in any regular or irregular inflection.
    pub fn verb_lemma(&self, lower: &str) -> Option<String> {
        if self.verbs.contains(lower) {
            return Some(lower.to_string());
        }
        if let Some(base) = self.irregular.get(lower) {
            return Some((*base).to_string());
        }

        let mut candidates: Vec<String> = Vec::new();
        if let Some(stem) = lower.strip_suffix("ies") {
            candidates.push(format!("{stem}y"));
        }
        if let Some(stem) = lower.strip_suffix("es") {
            candidates.push(stem.to_string());
        }
        if let Some(stem) = lower.strip_suffix('s') {
            candidates.push(stem.to_string());
        }
        if let Some(stem) = lower.strip_suffix("ied") {
            candidates.push(format!("{stem}y"));
        }
        if let Some(stem) = lower.strip_suffix("ed") {
            candidates.push(stem.to_string());
            candidates.push(format!("{stem}e"));
            candidates.extend(undouble(stem));
        }
        if let Some(stem) = lower.strip_suffix("ing") {
            candidates.push(stem.to_string());
            candidates.push(format!("{stem}e"));
            candidates.extend(undouble(stem));
        }

        candidates
            .into_iter()
            .find(|c| self.verbs.contains(c.as_str()))
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::default_english()
    }
}

/// "planned" → "plan": drop a doubled final consonant.
fn undouble(stem: &str) -> Option<String> {
    let mut chars = stem.chars().rev();
    match (chars.next(), chars.next()) {
        (Some(a), Some(b)) if a == b && !"aeiou".contains(a) => {
            Some(stem[..stem.len() - a.len_utf8()].to_string())
        }
        _ => None,
    }
}
