pub const THEME_STORAGE_KEY: &str = "theme";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn body_class(self) -> &'static str {
        match self {
            Theme::Dark => "theme-dark",
            Theme::Light => "theme-light",
        }
    }

    /// Icon shown on the toggle: the theme it switches to.
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Dark => "sun",
            Theme::Light => "moon",
        }
    }

    /// A stored preference wins over the OS setting; unknown stored values are ignored.
    pub fn resolve(stored: Option<&str>, prefers_dark: bool) -> Self {
        match stored.and_then(Theme::parse) {
            Some(theme) => theme,
            None if prefers_dark => Theme::Dark,
            None => Theme::Light,
        }
    }
}

/// String key-value persistence (browser local storage).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Resolves, applies and persists the colour theme.
pub struct ThemeController<S> {
    store: S,
    current: Theme,
}

impl<S: KeyValueStore> ThemeController<S> {
    pub fn init(store: S, prefers_dark: bool) -> Self {
        let stored = store.get(THEME_STORAGE_KEY);
        let current = Theme::resolve(stored.as_deref(), prefers_dark);
        let mut controller = Self { store, current };
        controller.apply(current);
        controller
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn toggle(&mut self) -> Theme {
        self.apply(self.current.toggled());
        self.current
    }

    pub fn apply(&mut self, theme: Theme) {
        self.current = theme;
        self.store.set(THEME_STORAGE_KEY, theme.as_str());
    }
}
