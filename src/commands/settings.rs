use super::AppState;
use crate::session::TOKEN_KEY;
use std::collections::BTreeMap;

pub const SETTING_KEYS: &[&str] = &[
    "chat_base_url",
    "image_base_url",
    "request_timeout_secs",
    TOKEN_KEY,
];

fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        value.to_string()
    }
}

pub fn get_settings(state: &AppState) -> Result<BTreeMap<String, String>, String> {
    let mut map = BTreeMap::new();
    for key in SETTING_KEYS {
        if let Some(value) = state.db.get_setting(key).map_err(|e| e.to_string())? {
            // Never print the session token in full
            if *key == TOKEN_KEY {
                map.insert(key.to_string(), mask(&value));
            } else {
                map.insert(key.to_string(), value);
            }
        }
    }
    Ok(map)
}

pub fn set_setting(state: &AppState, key: &str, value: &str) -> Result<(), String> {
    if !SETTING_KEYS.contains(&key) {
        return Err(format!("Unknown setting key: {}", key));
    }
    state.db.set_setting(key, value).map_err(|e| e.to_string())
}

pub fn delete_setting(state: &AppState, key: &str) -> Result<(), String> {
    if !SETTING_KEYS.contains(&key) {
        return Err(format!("Unknown setting key: {}", key));
    }
    state.db.delete_setting(key).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::commands::test_support::state_with;

    #[test]
    fn test_token_is_masked() {
        let (state, _) = state_with(FakeBackend::default());
        set_setting(&state, TOKEN_KEY, "eyJhbGciOiJIUzI1NiJ9.payload.sig").unwrap();
        set_setting(&state, "chat_base_url", "http://localhost:5000").unwrap();

        let settings = get_settings(&state).unwrap();
        assert_eq!(settings[TOKEN_KEY], "eyJh....sig");
        assert_eq!(settings["chat_base_url"], "http://localhost:5000");
        assert!(!settings.contains_key("image_base_url"));
    }

    #[test]
    fn test_short_values_are_not_masked() {
        assert_eq!(mask("abcd1234"), "abcd1234");
        assert_eq!(mask("abcd12345"), "abcd...2345");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let (state, _) = state_with(FakeBackend::default());
        assert_eq!(
            set_setting(&state, "theme", "dark").unwrap_err(),
            "Unknown setting key: theme"
        );
        assert!(delete_setting(&state, "theme").is_err());
        set_setting(&state, "image_base_url", "http://img").unwrap();
        delete_setting(&state, "image_base_url").unwrap();
        assert!(get_settings(&state).unwrap().is_empty());
    }
}
