use crate::service::{Action, Language, UserTier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// Transport-neutral button menu; rows of (label, callback token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub rows: Vec<Vec<Button>>,
}

pub const ACTION_TOKEN_PREFIX: &str = "option_";
pub const LANGUAGE_TOKEN_PREFIX: &str = "lang_";
pub const TIER_TOKEN_PREFIX: &str = "tier_";

impl Menu {
    pub fn actions() -> Self {
        let rows = [Action::Summarize, Action::Takeaways, Action::Ask]
            .into_iter()
            .map(|action| {
                vec![Button::new(
                    t!(format!("buttons.action.{}", action.token())),
                    format!("{}{}", ACTION_TOKEN_PREFIX, action.token()),
                )]
            })
            .collect();

        Self { rows }
    }

    pub fn languages() -> Self {
        let row = Language::ALL
            .into_iter()
            .map(|language| {
                Button::new(
                    t!(format!("buttons.language.{}", language.code())),
                    format!("{}{}", LANGUAGE_TOKEN_PREFIX, language.code()),
                )
            })
            .collect();

        Self { rows: vec![row] }
    }

    pub fn tiers() -> Self {
        let row = UserTier::ALL
            .into_iter()
            .map(|tier| Button::new(tier.display_name(), format!("{}{}", TIER_TOKEN_PREFIX, tier.as_str())))
            .collect();

        Self { rows: vec![row] }
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.rows.iter().flatten().map(|button| button.token.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub menu: Option<Menu>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: None,
        }
    }

    pub fn with_menu(text: impl Into<String>, menu: Menu) -> Self {
        Self {
            text: text.into(),
            menu: Some(menu),
        }
    }
}
