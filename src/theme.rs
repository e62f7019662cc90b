//! Palette support for generated frames
//!
//! Drivers color nodes, badges and overlays by semantic role (visited,
//! frontier, path, ...) instead of hard-coding hex strings. A palette maps
//! each role to a `#rrggbb` color the playback client understands.
//!
//! # Examples
//!
//! ```
//! use algoviz::theme::PaletteManager;
//!
//! let manager = PaletteManager::new();
//! let mocha = manager.get_palette("Mocha").unwrap();
//! assert_eq!(mocha.colors.visited, "#a6e3a1");
//! ```

use std::collections::HashMap;

/// Hex colors for every role a driver may paint
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteColors {
    /// Entities already processed
    pub visited: String,
    /// Entities waiting in a queue or stack
    pub frontier: String,
    /// Entities on the answer path
    pub path: String,
    /// Entities finished for good
    pub done: String,
    /// Entities in a temporary cool-down state
    pub cooling: String,
    /// Entities not touched yet
    pub idle: String,
    pub error: String,
    pub accent: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub name: String,
    pub description: String,
    pub colors: PaletteColors,
}

impl Palette {
    /// Returns every color of the palette with its role name
    pub fn roles(&self) -> [(&'static str, &str); 8] {
        let c = &self.colors;
        [
            ("visited", &c.visited),
            ("frontier", &c.frontier),
            ("path", &c.path),
            ("done", &c.done),
            ("cooling", &c.cooling),
            ("idle", &c.idle),
            ("error", &c.error),
            ("accent", &c.accent),
        ]
    }
}

/// Lookup table of the built-in palettes plus the selected one
pub struct PaletteManager {
    palettes: HashMap<String, Palette>,
    current_palette_name: String,
}

impl PaletteManager {
    pub fn new() -> Self {
        let mut palettes = HashMap::new();

        palettes.insert("Mocha".to_string(), mocha_palette());
        palettes.insert("Latte".to_string(), latte_palette());
        palettes.insert("Dracula".to_string(), dracula_palette());

        Self {
            palettes,
            current_palette_name: "Mocha".to_string(),
        }
    }

    pub fn get_palette(&self, name: &str) -> Option<&Palette> {
        self.palettes.get(name)
    }

    /// Returns all palette names, sorted
    pub fn list_palettes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.palettes.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    pub fn current_palette(&self) -> &Palette {
        match self.palettes.get(&self.current_palette_name) {
            Some(palette) => palette,
            None => &DEFAULT_PALETTE,
        }
    }

    pub fn set_current_palette(&mut self, name: &str) -> anyhow::Result<()> {
        if self.palettes.contains_key(name) {
            self.current_palette_name = name.to_string();
            Ok(())
        } else {
            anyhow::bail!(
                "Palette '{}' not found (available: {})",
                name,
                self.list_palettes().join(", ")
            )
        }
    }
}

impl Default for PaletteManager {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_PALETTE: once_cell::sync::Lazy<Palette> = once_cell::sync::Lazy::new(mocha_palette);

fn palette(name: &str, description: &str, hex: [&str; 8]) -> Palette {
    let [visited, frontier, path, done, cooling, idle, error, accent] = hex.map(str::to_string);
    Palette {
        name: name.to_string(),
        description: description.to_string(),
        colors: PaletteColors {
            visited,
            frontier,
            path,
            done,
            cooling,
            idle,
            error,
            accent,
        },
    }
}

/// Catppuccin Mocha, the palette the playback client is styled with
fn mocha_palette() -> Palette {
    palette(
        "Mocha",
        "Catppuccin Mocha for dark backgrounds",
        [
            "#a6e3a1", // Green
            "#f9e2af", // Yellow
            "#89b4fa", // Blue
            "#94e2d5", // Teal
            "#fab387", // Peach
            "#585b70", // Surface 2
            "#f38ba8", // Red
            "#cba6f7", // Mauve
        ],
    )
}

fn latte_palette() -> Palette {
    palette(
        "Latte",
        "Catppuccin Latte for light backgrounds",
        [
            "#40a02b", "#df8e1d", "#1e66f5", "#179299", "#fe640b", "#acb0be", "#d20f39", "#8839ef",
        ],
    )
}

fn dracula_palette() -> Palette {
    palette(
        "Dracula",
        "Dracula dark palette",
        [
            "#50fa7b", "#f1fa8c", "#bd93f9", "#8be9fd", "#ffb86c", "#6272a4", "#ff5555", "#ff79c6",
        ],
    )
}

/// Parses a `#rrggbb` color into its channels
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

pub fn is_valid_hex(hex: &str) -> bool {
    parse_hex(hex).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_palettes_listed_sorted() {
        let manager = PaletteManager::new();
        assert_eq!(manager.list_palettes(), vec!["Dracula", "Latte", "Mocha"]);
        assert_eq!(manager.current_palette().name, "Mocha");
    }

    #[test]
    fn test_every_builtin_color_is_valid_hex() {
        let manager = PaletteManager::new();
        for name in manager.list_palettes() {
            let palette = manager.get_palette(name).unwrap();
            assert_eq!(palette.name, name);
            for (role, hex) in palette.roles() {
                assert!(is_valid_hex(hex), "{} {} = {}", name, role, hex);
            }
        }
    }

    #[test]
    fn test_set_current_palette() {
        let mut manager = PaletteManager::new();
        manager.set_current_palette("Dracula").unwrap();
        assert_eq!(manager.current_palette().colors.error, "#ff5555");
        assert!(manager.set_current_palette("Solarized").is_err());
        assert_eq!(manager.current_palette().name, "Dracula");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#a6e3a1"), Some((0xa6, 0xe3, 0xa1)));
        assert_eq!(parse_hex("#FFFFFF"), Some((255, 255, 255)));
        assert_eq!(parse_hex("a6e3a1"), None);
        assert_eq!(parse_hex("#a6e3a"), None);
        assert_eq!(parse_hex("#gggggg"), None);
        assert_eq!(parse_hex("#+1+1+1"), None);
    }
}
