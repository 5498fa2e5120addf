// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Attribute catalog
//!
//! The closed set of scoring dimensions the Perspective API understands,
//! grouped the way the service documents them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{PerspectiveError, Result};

/// A scoring dimension the service can evaluate text against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Attribute {
    // Production
    Toxicity,
    SevereToxicity,
    IdentityAttack,
    Insult,
    Profanity,
    Threat,
    // Experimental
    ToxicityExperimental,
    SevereToxicityExperimental,
    IdentityAttackExperimental,
    InsultExperimental,
    ProfanityExperimental,
    ThreatExperimental,
    SexuallyExplicit,
    Flirtation,
    // New York Times
    AttackOnAuthor,
    AttackOnCommenter,
    Incoherent,
    Inflammatory,
    LikelyToReject,
    Obscene,
    Spam,
    Unsubstantial,
}

/// Static metadata for one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttributeInfo {
    pub attribute: Attribute,
    pub name: &'static str,
    /// ISO 639-1 codes the attribute accepts
    pub supported_languages: &'static [&'static str],
    pub is_experimental: bool,
    pub description: &'static str,
}

const TOXICITY_LANGS: &[&str] = &[
    "ar", "zh", "cs", "nl", "en", "fr", "de", "hi", "id", "it", "ja", "ko", "pl", "pt", "ru", "es",
];
const SEVERE_TOXICITY_LANGS: &[&str] = &["de", "en", "es", "fr", "it", "pt", "ru"];
const PRODUCTION_LANGS: &[&str] = &["de", "en", "it", "pt", "ru"];
const ENGLISH_ONLY: &[&str] = &["en"];

macro_rules! entry {
    ($attr:ident, $name:literal, $langs:expr, $exp:literal, $desc:literal) => {
        AttributeInfo {
            attribute: Attribute::$attr,
            name: $name,
            supported_languages: $langs,
            is_experimental: $exp,
            description: $desc,
        }
    };
}

/// Every attribute in catalog order
static CATALOG: [AttributeInfo; 22] = [
    entry!(Toxicity, "TOXICITY", TOXICITY_LANGS, false,
        "A rude, disrespectful, or unreasonable comment that is likely to make people leave a discussion."),
    entry!(SevereToxicity, "SEVERE_TOXICITY", SEVERE_TOXICITY_LANGS, false,
        "A very hateful, aggressive, disrespectful comment or otherwise very likely to make a user leave a discussion or give up on sharing their perspective. This attribute is much less sensitive to more mild forms of toxicity, such as comments that include positive uses of curse words."),
    entry!(IdentityAttack, "IDENTITY_ATTACK", PRODUCTION_LANGS, false,
        "Negative or hateful comments targeting someone because of their identity."),
    entry!(Insult, "INSULT", PRODUCTION_LANGS, false,
        "Insulting, inflammatory, or negative comment towards a person or a group of people."),
    entry!(Profanity, "PROFANITY", PRODUCTION_LANGS, false,
        "Swear words, curse words, or other obscene or profane language."),
    entry!(Threat, "THREAT", PRODUCTION_LANGS, false,
        "Describes an intention to inflict pain, injury, or violence against an individual or group."),
    entry!(ToxicityExperimental, "TOXICITY_EXPERIMENTAL", ENGLISH_ONLY, true,
        "A rude, disrespectful, or unreasonable comment that is likely to make people leave a discussion."),
    entry!(SevereToxicityExperimental, "SEVERE_TOXICITY_EXPERIMENTAL", ENGLISH_ONLY, true,
        "A very hateful, aggressive, disrespectful comment or otherwise very likely to make a user leave a discussion or give up on sharing their perspective. This attribute is much less sensitive to more mild forms of toxicity, such as comments that include positive uses of curse words."),
    entry!(IdentityAttackExperimental, "IDENTITY_ATTACK_EXPERIMENTAL", ENGLISH_ONLY, true,
        "Negative or hateful comments targeting someone because of their identity."),
    entry!(InsultExperimental, "INSULT_EXPERIMENTAL", ENGLISH_ONLY, true,
        "Insulting, inflammatory, or negative comment towards a person or a group of people."),
    entry!(ProfanityExperimental, "PROFANITY_EXPERIMENTAL", ENGLISH_ONLY, true,
        "Swear words, curse words, or other obscene or profane language."),
    entry!(ThreatExperimental, "THREAT_EXPERIMENTAL", ENGLISH_ONLY, true,
        "Describes an intention to inflict pain, injury, or violence against an individual or group."),
    entry!(SexuallyExplicit, "SEXUALLY_EXPLICIT", ENGLISH_ONLY, true,
        "Contains references to sexual acts, body parts, or other lewd content."),
    entry!(Flirtation, "FLIRTATION", ENGLISH_ONLY, true,
        "Pickup lines, complimenting appearance, subtle sexual innuendos, etc."),
    entry!(AttackOnAuthor, "ATTACK_ON_AUTHOR", ENGLISH_ONLY, true,
        "Attack on the author of an article or post."),
    entry!(AttackOnCommenter, "ATTACK_ON_COMMENTER", ENGLISH_ONLY, true,
        "Attack on fellow commenter."),
    entry!(Incoherent, "INCOHERENT", ENGLISH_ONLY, true,
        "Difficult to understand, nonsensical."),
    entry!(Inflammatory, "INFLAMMATORY", ENGLISH_ONLY, true,
        "Intending to provoke or inflame."),
    entry!(LikelyToReject, "LIKELY_TO_REJECT", ENGLISH_ONLY, true,
        "Overall measure of the likelihood for the comment to be rejected according to the NYT's moderation."),
    entry!(Obscene, "OBSCENE", ENGLISH_ONLY, true,
        "Obscene or vulgar language such as cursing."),
    entry!(Spam, "SPAM", ENGLISH_ONLY, true,
        "Irrelevant and unsolicited commercial content."),
    entry!(Unsubstantial, "UNSUBSTANTIAL", ENGLISH_ONLY, true,
        "Trivial or short comments."),
];

static ORDERED: [Attribute; 22] = Attribute::ALL;

/// All attributes with their metadata, in catalog order
pub fn list_all() -> &'static [AttributeInfo] {
    &CATALOG
}

/// Members of a group, in catalog order
pub fn list_group(group: AttributeGroup) -> Vec<Attribute> {
    group.members().to_vec()
}

impl Attribute {
    /// Every attribute in catalog order
    pub const ALL: [Attribute; 22] = [
        Attribute::Toxicity,
        Attribute::SevereToxicity,
        Attribute::IdentityAttack,
        Attribute::Insult,
        Attribute::Profanity,
        Attribute::Threat,
        Attribute::ToxicityExperimental,
        Attribute::SevereToxicityExperimental,
        Attribute::IdentityAttackExperimental,
        Attribute::InsultExperimental,
        Attribute::ProfanityExperimental,
        Attribute::ThreatExperimental,
        Attribute::SexuallyExplicit,
        Attribute::Flirtation,
        Attribute::AttackOnAuthor,
        Attribute::AttackOnCommenter,
        Attribute::Incoherent,
        Attribute::Inflammatory,
        Attribute::LikelyToReject,
        Attribute::Obscene,
        Attribute::Spam,
        Attribute::Unsubstantial,
    ];

    /// Catalog metadata for this attribute
    pub fn info(self) -> &'static AttributeInfo {
        // CATALOG is declared in the same order as the enum
        &CATALOG[self as usize]
    }

    /// Canonical wire name, e.g. `SEVERE_TOXICITY`
    pub fn as_str(self) -> &'static str {
        self.info().name
    }

    /// Human readable name, e.g. `Attack on Author`
    pub fn display_name(self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let lower = word.to_lowercase();
                match lower.as_str() {
                    "on" | "to" => lower,
                    _ => {
                        let mut chars = lower.chars();
                        match chars.next() {
                            Some(first) => first.to_uppercase().chain(chars).collect(),
                            None => String::new(),
                        }
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_experimental(self) -> bool {
        self.info().is_experimental
    }

    /// Whether the attribute accepts text in the given ISO 639-1 language
    pub fn supports(self, language_code: &str) -> bool {
        self.info()
            .supported_languages
            .iter()
            .any(|code| code.eq_ignore_ascii_case(language_code))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = PerspectiveError;

    /// Exact, case-insensitive lookup. Fuzzy matching lives in the resolver.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Attribute::ALL
            .iter()
            .copied()
            .find(|a| a.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PerspectiveError::UnknownAttribute(s.to_string()))
    }
}

/// Named shorthand for a fixed set of attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeGroup {
    All,
    Production,
    Experimental,
    NewYorkTimes,
}

impl AttributeGroup {
    pub const ALL: [AttributeGroup; 4] = [
        AttributeGroup::All,
        AttributeGroup::Production,
        AttributeGroup::Experimental,
        AttributeGroup::NewYorkTimes,
    ];

    /// Members of this group, in catalog order
    pub fn members(self) -> &'static [Attribute] {
        let all = &ORDERED;
        match self {
            AttributeGroup::All => &all[..],
            AttributeGroup::Production => &all[0..6],
            AttributeGroup::Experimental => &all[6..14],
            AttributeGroup::NewYorkTimes => &all[14..22],
        }
    }

    /// Languages every member of the group supports
    pub fn common_languages(self) -> &'static [&'static str] {
        match self {
            AttributeGroup::Production => PRODUCTION_LANGS,
            _ => ENGLISH_ONLY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AttributeGroup::All => "All",
            AttributeGroup::Production => "Production",
            AttributeGroup::Experimental => "Experimental",
            AttributeGroup::NewYorkTimes => "NewYorkTimes",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AttributeGroup::All => {
                "Every attribute the API supports. English is the only language common to all of them."
            }
            AttributeGroup::Production => {
                "Attributes tested across multiple domains and trained on significant amounts of human-annotated comments."
            }
            AttributeGroup::Experimental => {
                "Attributes not tested as thoroughly as production ones. Language availability may change over time."
            }
            AttributeGroup::NewYorkTimes => {
                "Experimental attributes trained on New York Times comments tagged by their moderation team."
            }
        }
    }

    /// Lookup that tolerates case and separators: `new_york_times`, `New York Times`, `nyt`
    pub fn from_alias(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        match key.as_str() {
            "ALL" => Some(AttributeGroup::All),
            "PRODUCTION" | "PROD" => Some(AttributeGroup::Production),
            "EXPERIMENTAL" | "EXP" => Some(AttributeGroup::Experimental),
            "NEWYORKTIMES" | "NYT" => Some(AttributeGroup::NewYorkTimes),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttributeGroup {
    type Err = PerspectiveError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_alias(s).ok_or_else(|| PerspectiveError::UnknownGroup(s.to_string()))
    }
}
