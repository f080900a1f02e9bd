//! Theme and language preferences.
//!
//! A small observable store: values are read from storage once at startup,
//! every change is written back fire-and-forget, and subscribers hear about
//! changes that actually alter a value.

use std::collections::HashMap;
use std::str::FromStr;

use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::{debug, warn};

use crate::error::PreferenceError;

pub const THEME_KEY: &str = "theme";
pub const LANGUAGE_KEY: &str = "language";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::Es => Language::En,
            Language::En => Language::Es,
        }
    }
}

/// String key-value persistence that survives reloads
pub trait PreferenceStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryStorage {
    values: HashMap<String, String>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStorage for InMemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreferenceSnapshot {
    pub theme: Theme,
    pub language: Language,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreferenceChange {
    Theme(Theme),
    Language(Language),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(PreferenceChange) + Send>;

pub struct Preferences<S: PreferenceStorage> {
    storage: S,
    current: PreferenceSnapshot,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl<S: PreferenceStorage> Preferences<S> {
    /// Read stored values, falling back to defaults for missing or unknown ones
    pub fn load(storage: S) -> Self {
        let current = PreferenceSnapshot {
            theme: read_or_default(&storage, THEME_KEY),
            language: read_or_default(&storage, LANGUAGE_KEY),
        };
        debug!("loaded preferences: theme={} language={}", current.theme, current.language);

        Self {
            storage,
            current,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn theme(&self) -> Theme {
        self.current.theme
    }

    pub fn language(&self) -> Language {
        self.current.language
    }

    pub fn snapshot(&self) -> PreferenceSnapshot {
        self.current
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn subscribe(&mut self, listener: impl FnMut(PreferenceChange) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Returns whether the theme changed
    pub fn set_theme(&mut self, theme: Theme) -> bool {
        if self.current.theme == theme {
            return false;
        }
        self.current.theme = theme;
        self.persist(THEME_KEY, theme.as_ref());
        self.notify(PreferenceChange::Theme(theme));
        true
    }

    pub fn set_language(&mut self, language: Language) -> bool {
        if self.current.language == language {
            return false;
        }
        self.current.language = language;
        self.persist(LANGUAGE_KEY, language.as_ref());
        self.notify(PreferenceChange::Language(language));
        true
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.current.theme.toggled();
        self.set_theme(theme);
        theme
    }

    fn persist(&mut self, key: &str, value: &str) {
        if let Err(err) = self.storage.set(key, value) {
            warn!("failed to persist {key}={value}: {err}");
        }
    }

    fn notify(&mut self, change: PreferenceChange) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(change);
        }
    }
}

fn read_or_default<T: FromStr + Default>(storage: &impl PreferenceStorage, key: &'static str) -> T {
    let Some(value) = storage.get(key) else {
        return T::default();
    };

    T::from_str(&value).unwrap_or_else(|_| {
        let err = PreferenceError::InvalidValue { key, value };
        warn!("{err}; using default");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct FailingStorage;

    impl PreferenceStorage for FailingStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), PreferenceError> {
            Err(PreferenceError::Storage("quota exceeded".into()))
        }
    }

    #[test]
    fn test_defaults() {
        let prefs = Preferences::load(InMemoryStorage::new());
        assert_eq!(prefs.theme(), Theme::Light);
        assert_eq!(prefs.language(), Language::Es);
    }

    #[test]
    fn test_loads_stored_values_and_ignores_garbage() {
        let storage = InMemoryStorage::new()
            .with_value(THEME_KEY, "dark")
            .with_value(LANGUAGE_KEY, "klingon");
        let prefs = Preferences::load(storage);

        assert_eq!(prefs.theme(), Theme::Dark);
        assert_eq!(prefs.language(), Language::Es);
    }

    #[test]
    fn test_set_persists_and_notifies_on_change_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut prefs = Preferences::load(InMemoryStorage::new());
        let sink = seen.clone();
        prefs.subscribe(move |change| sink.lock().unwrap().push(change));

        assert!(prefs.set_language(Language::En));
        assert!(!prefs.set_language(Language::En));
        assert_eq!(prefs.toggle_theme(), Theme::Dark);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![PreferenceChange::Language(Language::En), PreferenceChange::Theme(Theme::Dark)]
        );
        assert_eq!(prefs.storage().get(LANGUAGE_KEY).as_deref(), Some("en"));
        assert_eq!(prefs.storage().get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn test_unsubscribe() {
        let count = Arc::new(Mutex::new(0));
        let mut prefs = Preferences::load(InMemoryStorage::new());
        let sink = count.clone();
        let id = prefs.subscribe(move |_| *sink.lock().unwrap() += 1);

        prefs.set_theme(Theme::Dark);
        assert!(prefs.unsubscribe(id));
        assert!(!prefs.unsubscribe(id));
        prefs.set_theme(Theme::Light);

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_storage_failure_still_updates() {
        let mut prefs = Preferences::load(FailingStorage);
        assert!(prefs.set_theme(Theme::Dark));
        assert_eq!(prefs.theme(), Theme::Dark);
    }
}
