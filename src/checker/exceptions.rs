use super::tokenizer::Token;
use aho_corasick::AhoCorasick;
use anyhow::{bail, Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

lazy_static! {
    static ref REGEX_RULE: Regex = Regex::new(r"^/(?P<pattern>.*)/(?P<flags>[a-z]*)$").unwrap();
}

/// Persisted exception store: rule string mapped to `true` (applies
/// everywhere) or a list of path-scope patterns.
pub type ExceptionStore = BTreeMap<String, ScopeSpec>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScopeSpec {
    Everywhere(bool),
    Paths(Vec<String>),
}

/// Read the exception store file. An absent file means no persisted rules;
/// malformed JSON is a fatal configuration error.
pub fn load_store(path: &Path) -> Result<ExceptionStore> {
    if !path.exists() {
        return Ok(ExceptionStore::new());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read exception store {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("malformed exception store {}", path.display()))
}

#[derive(Debug, Clone)]
enum RuleKind {
    /// Matches a single token exactly, case-sensitively. Case-insensitive
    /// suppression is spelled as a `/pattern/i` rule.
    Literal(String),
    /// Matches a single token against a `/pattern/flags` rule.
    Pattern(Regex),
    /// Matches tokens that sit inside a literal occurrence of the phrase.
    Phrase(String),
}

#[derive(Debug, Clone)]
struct Rule {
    kind: RuleKind,
    /// Path patterns restricting where the rule applies; None = everywhere.
    scope: Option<Vec<GlobMatcher>>,
}

impl Rule {
    fn parse(text: &str, scope: Option<&[String]>) -> Result<Rule> {
        let scope = match scope {
            None => None,
            Some(patterns) => {
                let mut matchers = Vec::with_capacity(patterns.len());
                for pattern in patterns {
                    let glob = GlobBuilder::new(pattern)
                        .build()
                        .with_context(|| format!("invalid path scope {:?}", pattern))?;
                    matchers.push(glob.compile_matcher());
                }
                Some(matchers)
            }
        };

        let text = text.trim();
        let kind = if let Some(caps) = REGEX_RULE.captures(text) {
            let mut builder = RegexBuilder::new(&caps["pattern"]);
            for flag in caps["flags"].chars() {
                match flag {
                    'i' => {
                        builder.case_insensitive(true);
                    }
                    'm' => {
                        builder.multi_line(true);
                    }
                    's' => {
                        builder.dot_matches_new_line(true);
                    }
                    'x' => {
                        builder.ignore_whitespace(true);
                    }
                    // JavaScript-style flags with no equivalent here.
                    'g' | 'u' => {}
                    other => bail!("unsupported flag {:?} in exception rule {:?}", other, text),
                }
            }
            let regex = builder
                .build()
                .with_context(|| format!("invalid exception pattern {:?}", text))?;
            RuleKind::Pattern(regex)
        } else if text.split_whitespace().nth(1).is_some() {
            RuleKind::Phrase(text.to_string())
        } else {
            RuleKind::Literal(text.to_string())
        };

        Ok(Rule { kind, scope })
    }

    fn applies_to(&self, file_id: &str) -> bool {
        match &self.scope {
            None => true,
            Some(matchers) => matchers.iter().any(|m| m.is_match(file_id)),
        }
    }
}

/// Location of a phrase-rule occurrence in a document's text.
#[derive(Debug, Clone, Copy)]
pub struct PhraseSpan {
    pub start: usize,
    pub end: usize,
    rule: usize,
}

#[derive(Debug, Clone)]
struct PhraseIndex {
    ac: AhoCorasick,
    rule_of_pattern: Vec<usize>,
}

/// Compiled suppression rules from all sources, evaluated with union
/// semantics: a token is suppressed when any rule from any source matches.
/// Built once per run, read-only during the scan.
#[derive(Debug, Clone)]
pub struct ExceptionEngine {
    rules: Vec<Rule>,
    phrases: Option<PhraseIndex>,
}

impl ExceptionEngine {
    /// Compile rules from the three sources in order: persisted store,
    /// pipeline metadata, static configuration. Order has no semantic effect
    /// beyond determinism; no source overrides another.
    pub fn compile(
        store: &ExceptionStore,
        metadata: &[String],
        config: &[String],
    ) -> Result<Self> {
        let mut rules = Vec::new();
        for (text, scope) in store {
            match scope {
                ScopeSpec::Everywhere(true) => rules.push(Rule::parse(text, None)?),
                // An explicit `false` disables the rule.
                ScopeSpec::Everywhere(false) => {}
                ScopeSpec::Paths(patterns) => rules.push(Rule::parse(text, Some(patterns))?),
            }
        }
        for text in metadata {
            rules.push(Rule::parse(text, None)?);
        }
        for text in config {
            rules.push(Rule::parse(text, None)?);
        }
        Self::from_rules(rules)
    }

    /// A copy of this engine extended with file-level metadata rules. The
    /// extra rules apply only to the file they came from, so callers use the
    /// extended engine for that file alone.
    pub fn extended(&self, extra: &[String]) -> Result<Self> {
        let mut rules = self.rules.clone();
        for text in extra {
            rules.push(Rule::parse(text, None)?);
        }
        Self::from_rules(rules)
    }

    fn from_rules(rules: Vec<Rule>) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut rule_of_pattern = Vec::new();
        for (idx, rule) in rules.iter().enumerate() {
            if let RuleKind::Phrase(text) = &rule.kind {
                patterns.push(text.clone());
                rule_of_pattern.push(idx);
            }
        }
        let phrases = if patterns.is_empty() {
            None
        } else {
            let ac = AhoCorasick::new(&patterns).context("failed to build phrase matcher")?;
            Some(PhraseIndex { ac, rule_of_pattern })
        };
        Ok(Self { rules, phrases })
    }

    /// Locate every phrase-rule occurrence in a document's text. Computed
    /// once per file and consulted for each token.
    pub fn phrase_spans(&self, text: &str) -> Vec<PhraseSpan> {
        let Some(index) = &self.phrases else {
            return Vec::new();
        };
        index
            .ac
            .find_overlapping_iter(text)
            .map(|m| PhraseSpan {
                start: m.start(),
                end: m.end(),
                rule: index.rule_of_pattern[m.pattern().as_usize()],
            })
            .collect()
    }

    /// Decide whether a token in the given file is suppressed. Evaluated
    /// strictly per (token, file) pair: a rule scoped to another file never
    /// suppresses occurrences here.
    pub fn is_suppressed(&self, token: &Token, file_id: &str, phrase_spans: &[PhraseSpan]) -> bool {
        for (idx, rule) in self.rules.iter().enumerate() {
            if !rule.applies_to(file_id) {
                continue;
            }
            let matched = match &rule.kind {
                RuleKind::Literal(text) => *text == token.text,
                RuleKind::Pattern(regex) => regex.is_match(&token.text),
                RuleKind::Phrase(_) => phrase_spans
                    .iter()
                    .any(|s| s.rule == idx && s.start <= token.start && token.end <= s.end),
            };
            if matched {
                return true;
            }
        }
        false
    }

    /// Total number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
