use momentz_shared::constants::KEY_THEME;

use crate::database::Database;
use crate::error::Result;
use crate::models::Theme;

impl Database {
    /// Saved theme, falling back to dark when unset or unrecognised.
    pub fn theme(&self) -> Result<Theme> {
        let stored = self.get_value(KEY_THEME)?;
        let theme = match stored.as_deref().map(Theme::parse) {
            Some(Some(theme)) => theme,
            Some(None) => {
                tracing::warn!(value = ?stored, "unknown theme value, using default");
                Theme::default()
            }
            None => Theme::default(),
        };
        Ok(theme)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.set_value(KEY_THEME, theme.as_str())
    }

    /// Flip between dark and light and persist the result.
    pub fn toggle_theme(&self) -> Result<Theme> {
        let next = self.theme()?.toggled();
        self.set_theme(next)?;
        tracing::info!(theme = %next, "theme toggled");
        Ok(next)
    }
}
