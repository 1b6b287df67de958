use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::service::Menu;

pub fn menu_keyboard(menu: &Menu) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(menu.rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.token.clone()))
            .collect::<Vec<_>>()
    }))
}
