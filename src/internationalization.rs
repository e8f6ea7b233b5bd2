use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::infrastructure::error::WidgetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn to_code(&self) -> &'static str {
        match self {
            Language::Russian => "ru",
            Language::English => "en",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Russian
    }
}

impl FromStr for Language {
    type Err = WidgetError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code.trim().to_lowercase().as_str() {
            "ru" | "ru-ru" | "rus" => Ok(Language::Russian),
            "en" | "en-us" | "en-gb" | "eng" => Ok(Language::English),
            other => Err(WidgetError::config(format!("unsupported language: {}", other))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_code())
    }
}

/// Message lookup used by the widgets.
///
/// Implementations should be pure: the same arguments always give the same
/// text.
pub trait Translate {
    fn translate(&self, lang: Language, key: &str, args: &[String]) -> String;
}

impl<T: Translate + ?Sized> Translate for &T {
    fn translate(&self, lang: Language, key: &str, args: &[String]) -> String {
        (**self).translate(lang, key, args)
    }
}

/// In-memory catalog with positional `{0}`, `{1}` interpolation.
///
/// Unknown keys translate to the key itself.
pub struct I18n {
    strings: HashMap<String, HashMap<Language, String>>,
}

static DEFAULT_CATALOG: Lazy<I18n> = Lazy::new(I18n::new);

/// Shared catalog with the built-in strings.
pub fn default_catalog() -> &'static I18n {
    &DEFAULT_CATALOG
}

impl I18n {
    pub fn new() -> Self {
        let mut i18n = I18n {
            strings: HashMap::new(),
        };

        i18n.load_default_strings();
        i18n
    }

    pub fn insert(&mut self, key: &str, lang: Language, text: &str) {
        self.strings
            .entry(key.to_string())
            .or_default()
            .insert(lang, text.to_string());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.strings.contains_key(key)
    }

    pub fn get(&self, lang: Language, key: &str) -> String {
        self.strings
            .get(key)
            .and_then(|langs| langs.get(&lang))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn load_default_strings(&mut self) {
        let defaults: &[(&str, &str, &str)] = &[
            ("LOGIN", "Логин", "Login"),
            ("PASSWORD", "Пароль", "Password"),
            ("TO_LOGIN", "Войти", "Sign in"),
            ("LANG_RU", "Рус", "Рус"),
            ("LANG_EN", "Eng", "Eng"),
            ("ERR_FIELD_REQUIRED", "Обязательное поле", "Required field"),
            ("ERR_MIN_LENGTH", "Минимальная длина: {0}", "Minimum length: {0}"),
            ("ERR_INVALID_CREDENTIALS", "Неверный логин или пароль", "Invalid login or password"),
            ("ERR_USER_NOT_FOUND", "Пользователь не найден", "User not found"),
            ("ERR_TRY_AGAIN", "Не удалось выполнить запрос, попробуйте ещё раз", "Request failed, please try again"),
        ];

        for (key, ru, en) in defaults {
            self.insert(key, Language::Russian, ru);
            self.insert(key, Language::English, en);
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

impl Translate for I18n {
    fn translate(&self, lang: Language, key: &str, args: &[String]) -> String {
        let mut text = self.get(lang, key);
        for (index, arg) in args.iter().enumerate() {
            text = text.replace(&format!("{{{}}}", index), arg);
        }
        text
    }
}
