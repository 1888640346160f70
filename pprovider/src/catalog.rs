//! Static model capability catalog and preference-based selection.
//!
//! ```rust
//! use pprovider::{Preference, select};
//!
//! let fastest = select(Preference::Speed, false).expect("catalog is non-empty");
//! assert!(fastest.speed_score >= 1);
//! ```

use std::fmt::{Display, Formatter};

use crate::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Qwen,
    DeepSeek,
    Doubao,
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::Qwen => "qwen",
            Self::DeepSeek => "deepseek",
            Self::Doubao => "doubao",
        };

        f.write_str(id)
    }
}

/// Static capability record for one backend model.
///
/// Scores run 1-10, higher is better. `env_key_prefix` names the credential
/// namespace: `<PREFIX>_API_KEY` and `<PREFIX>_BASE_URL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelCapability {
    pub provider: ProviderKind,
    /// Catalog key callers use to pin a model.
    pub name: &'static str,
    /// Canonical model name sent on the wire.
    pub model_name: &'static str,
    pub speed_score: u8,
    pub quality_score: u8,
    pub multimodal: bool,
    pub env_key_prefix: &'static str,
}

/// Defined once at process start, never mutated. Catalog order is the final
/// tie-break for [`select`].
pub const MODEL_CATALOG: &[ModelCapability] = &[
    ModelCapability {
        provider: ProviderKind::Qwen,
        name: "qwen-turbo",
        model_name: "qwen-turbo",
        speed_score: 9,
        quality_score: 6,
        multimodal: false,
        env_key_prefix: "QWEN",
    },
    ModelCapability {
        provider: ProviderKind::Qwen,
        name: "qwen-plus",
        model_name: "qwen-plus",
        speed_score: 7,
        quality_score: 8,
        multimodal: false,
        env_key_prefix: "QWEN",
    },
    ModelCapability {
        provider: ProviderKind::Qwen,
        name: "qwen-max",
        model_name: "qwen-max",
        speed_score: 5,
        quality_score: 9,
        multimodal: false,
        env_key_prefix: "QWEN",
    },
    ModelCapability {
        provider: ProviderKind::Qwen,
        name: "qwen-vl-plus",
        model_name: "qwen-vl-plus",
        speed_score: 7,
        quality_score: 8,
        multimodal: true,
        env_key_prefix: "QWEN",
    },
    ModelCapability {
        provider: ProviderKind::Qwen,
        name: "qwen-vl-max",
        model_name: "qwen-vl-max",
        speed_score: 5,
        quality_score: 9,
        multimodal: true,
        env_key_prefix: "QWEN",
    },
    ModelCapability {
        provider: ProviderKind::DeepSeek,
        name: "deepseek-chat",
        model_name: "deepseek-v3-1-terminus",
        speed_score: 8,
        quality_score: 8,
        multimodal: false,
        env_key_prefix: "DEEPSEEK",
    },
    ModelCapability {
        provider: ProviderKind::Doubao,
        name: "Doubao-lite-4k",
        model_name: "doubao-seed-1.6-flash",
        speed_score: 9,
        quality_score: 6,
        multimodal: false,
        env_key_prefix: "DOUBAO",
    },
    ModelCapability {
        provider: ProviderKind::Doubao,
        name: "Doubao-pro-32k",
        model_name: "doubao-seed-1-6-250615",
        speed_score: 6,
        quality_score: 8,
        multimodal: false,
        env_key_prefix: "DOUBAO",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    Speed,
    Quality,
}

/// Looks up a catalog entry by its catalog key.
pub fn capability(name: &str) -> Result<&'static ModelCapability, LlmError> {
    MODEL_CATALOG
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| {
            LlmError::invalid_request(format!(
                "unknown model: {name}. Available models: {}",
                available_models().join(", ")
            ))
        })
}

pub fn available_models() -> Vec<&'static str> {
    MODEL_CATALOG.iter().map(|entry| entry.name).collect()
}

/// Picks the best catalog entry for the given preference.
///
/// Primary sort key is the preferred score, the other score breaks ties, both
/// descending. When both scores tie, the earliest catalog entry wins, which
/// keeps the result deterministic.
pub fn select(
    preference: Preference,
    require_multimodal: bool,
) -> Result<&'static ModelCapability, LlmError> {
    select_in(MODEL_CATALOG, preference, require_multimodal)
}

/// [`select`] over an explicit candidate slice instead of the built-in
/// catalog.
pub fn select_in<'a>(
    catalog: &'a [ModelCapability],
    preference: Preference,
    require_multimodal: bool,
) -> Result<&'a ModelCapability, LlmError> {
    let mut best: Option<&'a ModelCapability> = None;

    for entry in catalog {
        if require_multimodal && !entry.multimodal {
            continue;
        }

        let better = match best {
            None => true,
            Some(current) => rank(preference, entry) > rank(preference, current),
        };

        if better {
            best = Some(entry);
        }
    }

    best.ok_or_else(|| {
        if require_multimodal {
            LlmError::no_candidate("no model in the catalog supports multimodal input")
        } else {
            LlmError::no_candidate("the model catalog is empty")
        }
    })
}

fn rank(preference: Preference, entry: &ModelCapability) -> (u8, u8) {
    match preference {
        Preference::Speed => (entry.speed_score, entry.quality_score),
        Preference::Quality => (entry.quality_score, entry.speed_score),
    }
}
