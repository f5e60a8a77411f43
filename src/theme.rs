use catppuccin::PALETTE;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

/// Convert a catppuccin color to a ratatui color.
const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Engine theme with the color tokens both engines draw with.
///
/// Holds resolved color values directly, independent of any specific
/// palette. Use the factory functions like [`Theme::catppuccin_mocha`] to
/// create pre-configured themes, or build custom themes by setting colors
/// directly.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: Color,
    pub surface: Color,
    pub surface_alt: Color,
    pub overlay: Color,
    pub text: Color,
    pub subtext: Color,
    pub accent: Color,
    pub highlight: Color,
    pub header: Color,
    pub border: Color,
    pub border_focus: Color,
    pub error: Color,
    pub success: Color,
    pub warning: Color,
    pub border_type: BorderType,
}

impl Theme {
    /// Create a theme from a Catppuccin flavor.
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: catppuccin_to_color(&c.base),
            surface: catppuccin_to_color(&c.surface0),
            surface_alt: catppuccin_to_color(&c.surface1),
            overlay: catppuccin_to_color(&c.overlay0),
            text: catppuccin_to_color(&c.text),
            subtext: catppuccin_to_color(&c.subtext0),
            accent: catppuccin_to_color(&c.mauve),
            highlight: catppuccin_to_color(&c.lavender),
            header: catppuccin_to_color(&c.sapphire),
            border: catppuccin_to_color(&c.surface2),
            border_focus: catppuccin_to_color(&c.lavender),
            error: catppuccin_to_color(&c.red),
            success: catppuccin_to_color(&c.green),
            warning: catppuccin_to_color(&c.yellow),
            border_type: BorderType::Rounded,
        }
    }

    /// Catppuccin Mocha theme (dark).
    #[must_use]
    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    /// Catppuccin Latte theme (light).
    #[must_use]
    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    /// Catppuccin Frappé theme (dark).
    #[must_use]
    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    /// Catppuccin Macchiato theme (dark).
    #[must_use]
    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    /// Selection background, derived from the surface tone.
    #[must_use]
    pub const fn selection_bg(&self) -> Color {
        self.surface_alt
    }

    /// Color for placeholder/empty cell text.
    #[must_use]
    pub const fn placeholder(&self) -> Color {
        self.overlay
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

/// Resolve a theme by its display name, falling back to Mocha.
#[must_use]
pub fn theme_from_name(name: &str) -> Theme {
    match name.to_lowercase().as_str() {
        "catppuccin latte" | "latte" => Theme::catppuccin_latte(),
        "catppuccin frappe" | "frappe" => Theme::catppuccin_frappe(),
        "catppuccin macchiato" | "macchiato" => Theme::catppuccin_macchiato(),
        _ => Theme::catppuccin_mocha(),
    }
}

/// Names accepted by [`theme_from_name`], for pickers and config docs.
#[must_use]
pub fn available_themes() -> &'static [&'static str] {
    &[
        "Catppuccin Mocha",
        "Catppuccin Latte",
        "Catppuccin Frappe",
        "Catppuccin Macchiato",
    ]
}
