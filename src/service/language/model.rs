use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Output language for generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Arabic,
    Spanish,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Arabic, Language::Spanish];

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Arabic => "ar",
            Language::Spanish => "es",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Arabic => "Arabic",
            Language::Spanish => "Spanish",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    /// Only the short codes are accepted; menu tokens never carry full names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::English),
            "ar" => Ok(Language::Arabic),
            "es" => Ok(Language::Spanish),
            _ => Err(format!("Unknown language code: {}", s)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
