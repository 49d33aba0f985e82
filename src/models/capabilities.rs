//! Name-based model capability heuristics.
//!
//! Capabilities are guessed from substrings of the model name. This is
//! best-effort: a model called `embedding-of-war` is tagged `embedding`.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::LocalGenError;

/// What a model can be used for.
///
/// Declaration order is the evaluation order of the heuristics and the
/// iteration order of a [`CapabilitySet`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CapabilityTag {
    Embedding,
    Vision,
    Tools,
    Thinking,
    Chat,
}

/// Capability tags of one model. Not mutually exclusive.
pub type CapabilitySet = BTreeSet<CapabilityTag>;

impl CapabilityTag {
    pub const ALL: [CapabilityTag; 5] = [
        Self::Embedding,
        Self::Vision,
        Self::Tools,
        Self::Thinking,
        Self::Chat,
    ];

    /// Parse a tag name. Only the exact lowercase names are accepted.
    pub fn parse(raw: &str) -> Result<Self, LocalGenError> {
        Self::from_str(raw).map_err(|_| LocalGenError::InvalidCapability(raw.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Model used when discovery finds nothing for this tag.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Chat => "llama3.2",
            Self::Vision => "llama3.2-vision",
            Self::Embedding => "nomic-embed-text",
            Self::Tools => "llama3.1",
            Self::Thinking => "deepseek-r1",
        }
    }

    /// Model names offered when the installed list cannot be fetched.
    pub fn fallback_models(self) -> &'static [&'static str] {
        match self {
            Self::Chat => &["llama3.2", "mistral:7b"],
            Self::Vision => &["llama3.2-vision", "llava"],
            Self::Embedding => &["nomic-embed-text"],
            Self::Tools => &["llama3.1", "mistral"],
            Self::Thinking => &["deepseek-r1", "llama3.2"],
        }
    }

    /// Indicator table for this tag.
    pub fn indicators(self) -> &'static IndicatorTable {
        &INDICATOR_TABLES[self as usize]
    }
}

/// Fallback list when no tag is requested.
pub const FALLBACK_ANY_MODELS: &[&str] = &["llama3.2", "mistral:7b"];

/// Lowercase substrings that mark a capability.
#[derive(Debug)]
pub struct IndicatorTable {
    pub tag: CapabilityTag,
    /// Generic naming hints.
    pub indicators: &'static [&'static str],
    /// Model families known to have the capability.
    pub known_families: &'static [&'static str],
}

impl IndicatorTable {
    pub fn matches(&self, lowered: &str) -> bool {
        self.indicators
            .iter()
            .chain(self.known_families)
            .any(|needle| lowered.contains(needle))
    }
}

/// One table per tag, in [`CapabilityTag`] order.
pub static INDICATOR_TABLES: [IndicatorTable; 5] = [
    IndicatorTable {
        tag: CapabilityTag::Embedding,
        indicators: &[
            "embed",
            "embedding",
            "nomic-embed",
            "bge",
            "sentence",
            "all-minilm",
            "e5",
            "gte",
            "multilingual-e5",
            "paraphrase",
            "text-embedding",
            "instructor",
            "thenlper",
        ],
        known_families: &[],
    },
    IndicatorTable {
        tag: CapabilityTag::Vision,
        indicators: &[
            "vision",
            "llava",
            "bakllava",
            "moondream",
            "cogvlm",
            "qwen-vl",
            "qwen2-vl",
            "internvl",
            "minicpm-v",
            "yi-vl",
            "deepseek-vl",
            "blip",
            "clip",
            "fuyu",
            "kosmos",
            "flamingo",
            "otter",
            "minigpt",
            "instructblip",
            "lynx",
            "idefics",
        ],
        known_families: &[],
    },
    IndicatorTable {
        tag: CapabilityTag::Tools,
        indicators: &[
            "function",
            "tool",
            "agent",
            "hermes",
            "mixtral",
            "command",
            "gorilla",
            "toolformer",
            "react",
            "planning",
        ],
        known_families: &[
            "llama3", "llama3.1", "llama3.2", "mistral", "mixtral", "qwen", "yi", "deepseek", "phi",
        ],
    },
    IndicatorTable {
        tag: CapabilityTag::Thinking,
        indicators: &[
            "reasoning",
            "thinking",
            "o1",
            "r1",
            "chain",
            "cot",
            "reason",
            "logic",
            "math",
            "solver",
            "step",
            "thought",
        ],
        known_families: &["deepseek-r1", "qwen-reasoning", "o1", "reasoning"],
    },
    IndicatorTable {
        tag: CapabilityTag::Chat,
        indicators: &[
            "llama", "mistral", "codellama", "dolphin", "orca", "vicuna", "alpaca", "wizard",
            "openchat", "neural", "chat", "instruct", "qwen", "yi", "deepseek", "phi", "gemma",
            "solar", "claude", "gpt", "falcon", "mpt", "bloom", "opt", "pythia", "stablelm",
        ],
        known_families: &[],
    },
];

/// Embedding-only markers. Any match removes `chat`, and nothing else.
pub const CHAT_SUPPRESSORS: &[&str] = &["embed", "embedding", "bge", "sentence", "nomic-embed"];

/// Derive capability tags from a model name.
///
/// Case-insensitive. Unknown names yield the empty set.
///
/// ```
/// use localgen::models::capabilities::{classify, CapabilityTag};
///
/// let tags = classify("llama3.2");
/// assert!(tags.contains(&CapabilityTag::Chat));
/// assert!(classify("unknown-model-xyz").is_empty());
/// ```
pub fn classify(name: &str) -> CapabilitySet {
    let lowered = name.to_lowercase();
    let chat_suppressed = CHAT_SUPPRESSORS.iter().any(|s| lowered.contains(s));

    INDICATOR_TABLES
        .iter()
        .filter(|table| !(table.tag == CapabilityTag::Chat && chat_suppressed))
        .filter(|table| table.matches(&lowered))
        .map(|table| table.tag)
        .collect()
}
