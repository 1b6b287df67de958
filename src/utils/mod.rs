pub mod http;

use teloxide::types::User;

use crate::service::UserProfile;

/// Telegram measures message length in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Splits text into chunks of at most `max_units` UTF-16 code units, preferring line breaks.
pub fn split_message(text: &str, max_units: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_units = 0;

    for line in text.split_inclusive('\n') {
        let line_units = line.encode_utf16().count();

        if current_units + line_units > max_units && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_units = 0;
        }

        if line_units <= max_units {
            current.push_str(line);
            current_units += line_units;
            continue;
        }

        for ch in line.chars() {
            let ch_units = ch.len_utf16();
            if current_units + ch_units > max_units {
                chunks.push(std::mem::take(&mut current));
                current_units = 0;
            }
            current.push(ch);
            current_units += ch_units;
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }

    chunks
}

pub fn profile_from_user(user: &User) -> UserProfile {
    UserProfile {
        user_id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
    }
}
