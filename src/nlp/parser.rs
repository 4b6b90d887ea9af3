//! Rule-based dependency parser.
//!
//! Three passes per sentence:
//! 1. **Tokenize**: regex split into words (keeping hyphenated names such as
//!    `INSAT-3D` and dotted hosts whole) and punctuation
//! 2. **Tag**: closed-class lexicon → capitalization → verb lexicon with
//!    context → suffix rules
//! 3. **Label**: pick the root, chunk flat noun phrases, then assign
//!    `nsubj`/`nsubjpass`, `dobj`/`attr`, `pobj`, `conj` and the minor relations
//!
//! This is deliberately shallow: one clause per sentence, flat attachments.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::NlpError;

use super::lexicon::Lexicon;
use super::{DependencyParser, NlpResult, PosTag, Sentence, Token};

/// Parser input limit, in bytes.
pub const DEFAULT_MAX_LENGTH: usize = 1_000_000;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+(?:[-'’./]\w+)*|[^\w\s]").expect("static regex must compile")
});

/// A token after tagging, before labelling.
#[derive(Debug, Clone)]
struct Tagged<'a> {
    text: &'a str,
    lower: String,
    pos: PosTag,
    lemma: String,
}

/// A flat noun phrase: `tokens[start..end]`, governed by `head`.
#[derive(Debug, Clone, Copy)]
struct Chunk {
    start: usize,
    end: usize,
    head: usize,
}

/// Lexicon and rule based [`DependencyParser`].
pub struct HeuristicParser {
    lexicon: Lexicon,
    max_length: usize,
}

impl HeuristicParser {
    pub fn new() -> Self {
        Self {
            lexicon: Lexicon::default_english(),
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Override the input limit.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length.max(1);
        self
    }

    /// Split text into trimmed sentences.
    ///
    /// Boundaries are newlines and `.`/`!`/`?` followed by whitespace or the
    /// end of input. A period after a known abbreviation or a single-letter
    /// initial does not end the sentence.
    pub fn split_sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            let end = match c {
                '\n' => Some(i),
                '.' | '!' | '?' => {
                    let at_gap = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
                    let abbreviated = c == '.' && self.ends_with_abbreviation(&text[start..i]);
                    (at_gap && !abbreviated).then_some(i + c.len_utf8())
                }
                _ => None,
            };
            if let Some(end) = end {
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = i + c.len_utf8();
            }
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail);
        }
        sentences
    }

    fn ends_with_abbreviation(&self, prefix: &str) -> bool {
        let Some(word) = prefix.split_whitespace().last() else {
            return false;
        };
        let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
        let lower = word.to_lowercase();
        let single_initial = lower.chars().count() == 1 && lower.chars().all(char::is_alphabetic);
        single_initial || self.lexicon.is_abbreviation(&lower)
    }

    /// Parse one sentence.
    pub fn parse_sentence(&self, sentence: &str) -> Sentence {
        let words: Vec<&str> = TOKEN_PATTERN
            .find_iter(sentence)
            .map(|m| m.as_str())
            .collect();
        let tagged = self.tag(&words);
        let labels = self.label(&tagged);

        let tokens = tagged
            .into_iter()
            .zip(labels)
            .map(|(t, (dep, head))| Token {
                text: t.text.to_string(),
                lemma: t.lemma,
                pos: t.pos,
                dep: dep.to_string(),
                head,
            })
            .collect();

        Sentence {
            text: sentence.to_string(),
            tokens,
        }
    }

    fn tag<'a>(&self, words: &[&'a str]) -> Vec<Tagged<'a>> {
        let mut tagged: Vec<Tagged<'a>> = Vec::with_capacity(words.len());
        let mut initial = true;

        for word in words {
            let prev = tagged.last().map(|t| t.pos);
            let (pos, lemma) = self.tag_word(word, initial, prev);
            if pos != PosTag::Punct {
                initial = false;
            }
            tagged.push(Tagged {
                text: word,
                lower: word.to_lowercase(),
                pos,
                lemma,
            });
        }

        // A clause with no verb at all: promote a plural-looking noun that sits
        // between two nominals ("Oceansat tracks cyclones").
        if !tagged.iter().any(|t| matches!(t.pos, PosTag::Verb | PosTag::Aux)) {
            let candidate = (1..tagged.len()).find(|&i| {
                let t = &tagged[i];
                t.pos == PosTag::Noun
                    && t.lower.ends_with('s')
                    && !["ss", "us", "is"].iter().any(|s| t.lower.ends_with(s))
                    && tagged[i - 1].pos.is_nominal()
                    && tagged[i + 1..].iter().any(|n| n.pos.is_nominal())
            });
            if let Some(i) = candidate {
                let lemma = tagged[i].lower.trim_end_matches('s').to_string();
                tagged[i].pos = PosTag::Verb;
                tagged[i].lemma = lemma;
            }
        }

        tagged
    }

    fn tag_word(&self, word: &str, initial: bool, prev: Option<PosTag>) -> (PosTag, String) {
        let lower = word.to_lowercase();

        if !word.chars().any(char::is_alphanumeric) {
            return (PosTag::Punct, lower);
        }
        if word.starts_with(|c: char| c.is_ascii_digit())
            && word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        {
            return (PosTag::Num, lower);
        }

        let capitalized = word.starts_with(char::is_uppercase);
        let acronym = word.chars().filter(|c| c.is_alphabetic()).count() > 1
            && !word.chars().any(char::is_lowercase);

        if acronym && !initial {
            return (PosTag::Propn, lower);
        }
        if let Some(tag) = self.lexicon.closed_class(&lower) {
            return (tag, lower);
        }
        if (capitalized && !initial) || acronym {
            return (PosTag::Propn, lower);
        }

        let nominal_context = matches!(
            prev,
            Some(PosTag::Det | PosTag::Adj | PosTag::Adp | PosTag::Num)
        );

        if let Some(lemma) = self.lexicon.verb_lemma(&lower) {
            if !nominal_context || lower.ends_with("ing") {
                return (PosTag::Verb, lemma);
            }
            return (PosTag::Noun, lower);
        }
        if capitalized {
            return (PosTag::Propn, lower);
        }

        const ADJ_SUFFIXES: &[&str] = &[
            "ical", "onal", "ous", "ful", "ive", "able", "ible", "less", "eric", "tific",
        ];
        let long = lower.chars().count() > 4;

        if long && lower.ends_with("ly") {
            (PosTag::Adv, lower)
        } else if long && ADJ_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            (PosTag::Adj, lower)
        } else if long && lower.ends_with("ed") {
            if nominal_context {
                (PosTag::Adj, lower)
            } else {
                let lemma = lower.trim_end_matches("ed").to_string();
                (PosTag::Verb, lemma)
            }
        } else if lower.chars().count() > 5 && lower.ends_with("ing") && prev != Some(PosTag::Det)
        {
            let lemma = lower.trim_end_matches("ing").to_string();
            (PosTag::Verb, lemma)
        } else {
            (PosTag::Noun, lower)
        }
    }

    fn chunks(tagged: &[Tagged<'_>]) -> Vec<Chunk> {
        let chunkable = |pos: PosTag| {
            matches!(
                pos,
                PosTag::Det | PosTag::Adj | PosTag::Num | PosTag::Noun | PosTag::Propn
            )
        };

        let mut chunks = Vec::new();
        let mut i = 0;
        while i < tagged.len() {
            if tagged[i].pos == PosTag::Pron {
                chunks.push(Chunk {
                    start: i,
                    end: i + 1,
                    head: i,
                });
                i += 1;
                continue;
            }
            if !chunkable(tagged[i].pos) {
                i += 1;
                continue;
            }

            let start = i;
            while i < tagged.len() && chunkable(tagged[i].pos) {
                // A determiner after other material opens the next phrase.
                if i > start && tagged[i].pos == PosTag::Det {
                    break;
                }
                i += 1;
            }
            let head = (start..i)
                .rev()
                .find(|&k| tagged[k].pos.is_nominal())
                .unwrap_or(i - 1);
            chunks.push(Chunk {
                start,
                end: i,
                head,
            });
        }
        chunks
    }

    fn choose_root(tagged: &[Tagged<'_>], chunks: &[Chunk]) -> Option<usize> {
        let finite = |i: usize| {
            tagged[i].pos == PosTag::Verb
                && !tagged[i].lower.ends_with("ing")
                && !(i > 0 && tagged[i - 1].lower == "to")
        };
        (0..tagged.len())
            .find(|&i| finite(i))
            .or_else(|| (0..tagged.len()).find(|&i| tagged[i].pos == PosTag::Verb))
            .or_else(|| (0..tagged.len()).find(|&i| tagged[i].pos == PosTag::Aux))
            .or_else(|| chunks.first().map(|c| c.head))
            .or_else(|| (0..tagged.len()).find(|&i| tagged[i].pos != PosTag::Punct))
    }

    fn label(&self, tagged: &[Tagged<'_>]) -> Vec<(&'static str, usize)> {
        let n = tagged.len();
        let chunks = Self::chunks(tagged);
        let Some(root) = Self::choose_root(tagged, &chunks) else {
            return (0..n).map(|i| ("punct", i)).collect();
        };

        let root_tok = &tagged[root];
        let root_is_copula = root_tok.pos == PosTag::Aux;
        let passive = root_tok.pos == PosTag::Verb
            && root_tok.lemma != root_tok.lower
            && !root_tok.lower.ends_with('s')
            && !root_tok.lower.ends_with("ing")
            && tagged[..root]
                .iter()
                .any(|t| t.pos == PosTag::Aux && self.lexicon.is_be_form(&t.lower));

        let mut labels: Vec<(&'static str, usize)> = vec![("dep", root); n];
        labels[root] = ("ROOT", root);
        let mut in_chunk = vec![false; n];

        let mut subject_taken = false;
        let mut object_taken = false;
        let mut last_nominal_head: Option<usize> = None;

        for chunk in &chunks {
            for k in chunk.start..chunk.end {
                in_chunk[k] = true;
                if k != chunk.head {
                    let dep = match tagged[k].pos {
                        PosTag::Det => "det",
                        PosTag::Adj => "amod",
                        PosTag::Num => "nummod",
                        _ => "compound",
                    };
                    labels[k] = (dep, chunk.head);
                }
            }

            let h = chunk.head;
            if h == root {
                last_nominal_head = Some(h);
                continue;
            }

            if !tagged[h].pos.is_nominal() {
                let dep = if root_is_copula && h > root { "acomp" } else { "amod" };
                labels[h] = (dep, root);
                continue;
            }

            let before = chunk.start.checked_sub(1).map(|p| (p, tagged[p].pos));
            labels[h] = match before {
                Some((p, PosTag::Adp)) => ("pobj", p),
                Some((_, PosTag::Cconj)) if last_nominal_head.is_some() => {
                    ("conj", last_nominal_head.unwrap_or(root))
                }
                _ if h < root && !subject_taken => {
                    subject_taken = true;
                    (if passive { "nsubjpass" } else { "nsubj" }, root)
                }
                _ if h > root && !object_taken => {
                    object_taken = true;
                    (if root_is_copula { "attr" } else { "dobj" }, root)
                }
                _ if h < root => ("appos", root),
                _ => ("npadvmod", root),
            };
            last_nominal_head = Some(h);
        }

        for i in 0..n {
            if i == root || in_chunk[i] {
                continue;
            }
            let prev = i.checked_sub(1).map(|p| &tagged[p]);
            labels[i] = match tagged[i].pos {
                PosTag::Adp => {
                    let attach = chunks
                        .iter()
                        .find(|c| c.end == i && tagged[c.head].pos.is_nominal())
                        .map_or(root, |c| c.head);
                    ("prep", attach)
                }
                PosTag::Aux => {
                    let be = self.lexicon.is_be_form(&tagged[i].lower);
                    (if passive && be && i < root { "auxpass" } else { "aux" }, root)
                }
                PosTag::Part if tagged[i].lower == "to" => ("aux", root),
                PosTag::Part => ("neg", root),
                PosTag::Verb => {
                    let dep = match prev {
                        Some(p) if p.lower == "to" => "xcomp",
                        Some(p) if p.pos == PosTag::Cconj => "conj",
                        Some(p) if p.pos.is_nominal() && i > root => "acl",
                        _ => "advcl",
                    };
                    (dep, root)
                }
                PosTag::Adv => ("advmod", root),
                PosTag::Cconj => ("cc", root),
                PosTag::Sconj => ("mark", root),
                PosTag::Punct => ("punct", root),
                _ => ("dep", root),
            };
        }

        labels
    }
}

impl Default for HeuristicParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyParser for HeuristicParser {
    fn max_length(&self) -> usize {
        self.max_length
    }

    fn parse(&self, text: &str) -> NlpResult<Vec<Sentence>> {
        if text.len() > self.max_length {
            return Err(NlpError::InputTooLong {
                len: text.len(),
                max: self.max_length,
            });
        }

        Ok(self
            .split_sentences(text)
            .into_iter()
            .map(|s| self.parse_sentence(s))
            .filter(|s| !s.tokens.is_empty())
            .collect())
    }
}

impl std::fmt::Debug for HeuristicParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeuristicParser")
            .field("max_length", &self.max_length)
            .finish()
    }
}
