use serde::{Deserialize, Serialize};

use crate::kernel::language::DocumentLanguage;

pub const MIN_FONT_SIZE: u16 = 10;
pub const MAX_FONT_SIZE: u16 = 28;
pub const DEFAULT_FONT_SIZE: u16 = 14;

/// Language of the user interface, not of the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiLanguage {
    #[default]
    De,
    En,
}

impl UiLanguage {
    pub fn label(self, de: &'static str, en: &'static str) -> &'static str {
        match self {
            Self::De => de,
            Self::En => en,
        }
    }
}

/// Format actions that can be pinned to the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Json,
    Xml,
    Yaml,
}

impl FormatKind {
    pub const ALL: [FormatKind; 3] = [FormatKind::Json, FormatKind::Xml, FormatKind::Yaml];

    pub fn language(self) -> DocumentLanguage {
        match self {
            Self::Json => DocumentLanguage::Json,
            Self::Xml => DocumentLanguage::Xml,
            Self::Yaml => DocumentLanguage::Yaml,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Favorites {
    pub json: bool,
    pub xml: bool,
    pub yaml: bool,
}

impl Default for Favorites {
    fn default() -> Self {
        Self {
            json: true,
            xml: true,
            yaml: false,
        }
    }
}

impl Favorites {
    pub fn contains(&self, kind: FormatKind) -> bool {
        match kind {
            FormatKind::Json => self.json,
            FormatKind::Xml => self.xml,
            FormatKind::Yaml => self.yaml,
        }
    }

    pub fn toggle(&mut self, kind: FormatKind) {
        let slot = match kind {
            FormatKind::Json => &mut self.json,
            FormatKind::Xml => &mut self.xml,
            FormatKind::Yaml => &mut self.yaml,
        };
        *slot = !*slot;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub ui_language: UiLanguage,
    pub favorites: Favorites,
    pub auto_save: bool,
    pub font_size: u16,
    /// Run YAML conversions inside the editor surface instead of natively.
    pub yaml_on_surface: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ui_language: UiLanguage::default(),
            favorites: Favorites::default(),
            auto_save: false,
            font_size: DEFAULT_FONT_SIZE,
            yaml_on_surface: false,
        }
    }
}

impl Settings {
    pub fn clamp_font_size(size: u16) -> u16 {
        size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
    }

    /// Returns whether the stored value changed.
    pub fn set_font_size(&mut self, size: u16) -> bool {
        let size = Self::clamp_font_size(size);
        let changed = self.font_size != size;
        self.font_size = size;
        changed
    }

    pub fn toggle_auto_save(&mut self) -> bool {
        self.auto_save = !self.auto_save;
        self.auto_save
    }

    pub fn toggle_favorite(&mut self, kind: FormatKind) {
        self.favorites.toggle(kind);
    }

    pub fn is_favorite(&self, kind: FormatKind) -> bool {
        self.favorites.contains(kind)
    }

    /// Favorite formats in toolbar order.
    pub fn favorite_formats(&self) -> Vec<FormatKind> {
        FormatKind::ALL
            .into_iter()
            .filter(|kind| self.is_favorite(*kind))
            .collect()
    }

    /// Returns whether the stored value changed.
    pub fn set_ui_language(&mut self, language: UiLanguage) -> bool {
        let changed = self.ui_language != language;
        self.ui_language = language;
        changed
    }

    /// Repairs values that were edited out of range on disk.
    pub fn normalized(mut self) -> Self {
        self.font_size = Self::clamp_font_size(self.font_size);
        self
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/settings.rs"]
mod tests;
