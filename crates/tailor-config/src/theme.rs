//! Theme description for the site's stylesheet.
//!
//! [`ThemeConfig::site`] returns the palette aliases, animation, font stack and
//! plugin list. It serializes to the JSON shape utility-CSS generators expect
//! and can also be rendered directly to a CSS layer.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Errors that can occur when rendering a theme.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error("Failed to serialize theme: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to process theme CSS: {0}")]
    Css(String),
}

/// Complete theme description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeConfig {
    pub purge: Purge,
    pub theme: Theme,
    pub variants: BTreeMap<String, Vec<String>>,
    pub plugins: Vec<String>,
}

/// Content globs scanned for class names when dropping unused styles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Purge {
    pub content: Vec<String>,
    pub options: PurgeOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurgeOptions {
    pub safelist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub extend: ThemeExtend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeExtend {
    /// Animation name -> `animation` shorthand value.
    pub animation: BTreeMap<String, String>,
    pub keyframes: BTreeMap<String, Keyframes>,
    pub typography: BTreeMap<String, TypographyStyle>,
    pub font_family: BTreeMap<String, Vec<String>>,
    pub colors: BTreeMap<String, Palette>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypographyStyle {
    pub css: BTreeMap<String, String>,
}

/// One keyframe step: an offset percentage and its `transform` value.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub offset: u8,
    pub transform: String,
}

/// An ordered keyframe sequence, serialized as `{"0%": {"transform": ...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes(pub Vec<Keyframe>);

impl Serialize for Keyframes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for frame in &self.0 {
            let mut props = BTreeMap::new();
            props.insert("transform", frame.transform.as_str());
            map.serialize_entry(&format!("{}%", frame.offset), &props)?;
        }
        map.end()
    }
}

/// A color scale keyed by shade (50, 100, ... 900).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Palette {
    pub shades: BTreeMap<u16, String>,
}

impl Palette {
    fn from_hex(hex: &[&str; 10]) -> Self {
        Self {
            shades: SHADES
                .iter()
                .zip(hex.iter())
                .map(|(shade, hex)| (*shade, hex.to_string()))
                .collect(),
        }
    }

    /// Look up one of the named base palettes.
    pub fn named(name: &str) -> Option<Self> {
        let hex = match name {
            "cyan" => &CYAN,
            "emerald" => &EMERALD,
            "blueGray" => &BLUE_GRAY,
            "orange" => &ORANGE,
            "rose" => &ROSE,
            "fuchsia" => &FUCHSIA,
            "teal" => &TEAL,
            _ => return None,
        };
        Some(Self::from_hex(hex))
    }
}

impl ThemeConfig {
    /// The site theme.
    pub fn site() -> Self {
        let colors = COLOR_ALIASES
            .iter()
            .filter_map(|(alias, base)| Palette::named(base).map(|p| (alias.to_string(), p)))
            .collect();

        let mut sans = vec!["strawford".to_string()];
        sans.extend(DEFAULT_SANS.iter().map(|f| f.to_string()));

        let blob = Keyframes(
            BLOB_KEYFRAMES
                .iter()
                .map(|(offset, transform)| Keyframe {
                    offset: *offset,
                    transform: transform.to_string(),
                })
                .collect(),
        );

        Self {
            purge: Purge {
                content: vec!["_site/**/*.html".to_string()],
                options: PurgeOptions { safelist: vec![] },
            },
            theme: Theme {
                extend: ThemeExtend {
                    animation: BTreeMap::from([(
                        "blob".to_string(),
                        "blob 7s infinite".to_string(),
                    )]),
                    keyframes: BTreeMap::from([("blob".to_string(), blob)]),
                    typography: BTreeMap::from([(
                        "DEFAULT".to_string(),
                        TypographyStyle {
                            css: BTreeMap::new(),
                        },
                    )]),
                    font_family: BTreeMap::from([("sans".to_string(), sans)]),
                    colors,
                },
            },
            variants: BTreeMap::new(),
            plugins: vec!["@tailwindcss/typography".to_string()],
        }
    }

    /// Pretty-printed JSON description.
    pub fn to_json(&self) -> Result<String, ThemeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render custom properties, keyframes and animation utilities.
    pub fn to_css(&self) -> String {
        let extend = &self.theme.extend;
        let mut css = String::from(":root {\n");

        for (alias, palette) in &extend.colors {
            for (shade, hex) in &palette.shades {
                let _ = writeln!(css, "  --color-{alias}-{shade}: {hex};");
            }
        }
        for (name, stack) in &extend.font_family {
            let _ = writeln!(css, "  --font-{name}: {};", font_stack(stack));
        }
        css.push_str("}\n");

        for (name, frames) in &extend.keyframes {
            let _ = writeln!(css, "\n@keyframes {name} {{");
            for frame in &frames.0 {
                let _ = writeln!(
                    css,
                    "  {}% {{\n    transform: {};\n  }}",
                    frame.offset, frame.transform
                );
            }
            css.push_str("}\n");
        }

        for (name, value) in &extend.animation {
            let _ = writeln!(css, "\n.animate-{name} {{\n  animation: {value};\n}}");
        }
        for name in extend.font_family.keys() {
            let _ = writeln!(
                css,
                "\n.font-{name} {{\n  font-family: var(--font-{name});\n}}"
            );
        }

        css
    }

    /// [`ThemeConfig::to_css`], minified with lightningcss.
    pub fn to_css_minified(&self) -> Result<String, ThemeError> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let css = self.to_css();
        let stylesheet = StyleSheet::parse(&css, ParserOptions::default())
            .map_err(|e| ThemeError::Css(e.to_string()))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| ThemeError::Css(e.to_string()))?;

        Ok(minified.code)
    }
}

fn font_stack(stack: &[String]) -> String {
    stack
        .iter()
        .map(|family| {
            if family.contains(' ') {
                format!("\"{family}\"")
            } else {
                family.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

const SHADES: [u16; 10] = [50, 100, 200, 300, 400, 500, 600, 700, 800, 900];

const COLOR_ALIASES: [(&str, &str); 8] = [
    ("primary", "cyan"),
    ("emerald", "emerald"),
    ("brand", "emerald"),
    ("gray", "blueGray"),
    ("orange", "orange"),
    ("rose", "rose"),
    ("fuchsia", "fuchsia"),
    ("teal", "teal"),
];

const BLOB_KEYFRAMES: [(u8, &str); 4] = [
    (0, "translate(0px, 0px) scale(1)"),
    (33, "translate(30px, -50px) scale(1.1)"),
    (66, "translate(-20px, 20px) scale(0.9)"),
    (100, "translate(0px, 0px) scale(1)"),
];

const DEFAULT_SANS: [&str; 14] = [
    "ui-sans-serif",
    "system-ui",
    "-apple-system",
    "BlinkMacSystemFont",
    "Segoe UI",
    "Roboto",
    "Helvetica Neue",
    "Arial",
    "Noto Sans",
    "sans-serif",
    "Apple Color Emoji",
    "Segoe UI Emoji",
    "Segoe UI Symbol",
    "Noto Color Emoji",
];

const CYAN: [&str; 10] = [
    "#ecfeff", "#cffafe", "#a5f3fc", "#67e8f9", "#22d3ee", "#06b6d4", "#0891b2", "#0e7490",
    "#155e75", "#164e63",
];
const EMERALD: [&str; 10] = [
    "#ecfdf5", "#d1fae5", "#a7f3d0", "#6ee7b7", "#34d399", "#10b981", "#059669", "#047857",
    "#065f46", "#064e3b",
];
const BLUE_GRAY: [&str; 10] = [
    "#f8fafc", "#f1f5f9", "#e2e8f0", "#cbd5e1", "#94a3b8", "#64748b", "#475569", "#334155",
    "#1e293b", "#0f172a",
];
const ORANGE: [&str; 10] = [
    "#fff7ed", "#ffedd5", "#fed7aa", "#fdba74", "#fb923c", "#f97316", "#ea580c", "#c2410c",
    "#9a3412", "#7c2d12",
];
const ROSE: [&str; 10] = [
    "#fff1f2", "#ffe4e6", "#fecdd3", "#fda4af", "#fb7185", "#f43f5e", "#e11d48", "#be123c",
    "#9f1239", "#881337",
];
const FUCHSIA: [&str; 10] = [
    "#fdf4ff", "#fae8ff", "#f5d0fe", "#f0abfc", "#e879f9", "#d946ef", "#c026d3", "#a21caf",
    "#86198f", "#701a75",
];
const TEAL: [&str; 10] = [
    "#f0fdfa", "#ccfbf1", "#99f6e4", "#5eead4", "#2dd4bf", "#14b8a6", "#0d9488", "#0f766e",
    "#115e59", "#134e4a",
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    #[test]
    fn blob_keyframes_are_fixed() {
        let theme = ThemeConfig::site();
        let blob = &theme.theme.extend.keyframes["blob"];

        let offsets: Vec<u8> = blob.0.iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![0, 33, 66, 100]);
        assert_eq!(blob.0[1].transform, "translate(30px, -50px) scale(1.1)");
        assert_eq!(blob.0[0].transform, blob.0[3].transform);
    }

    #[test]
    fn aliases_resolve_to_palettes() {
        let theme = ThemeConfig::site();
        let colors = &theme.theme.extend.colors;

        assert_eq!(colors.len(), 8);
        assert_eq!(colors["primary"], Palette::named("cyan").unwrap());
        assert_eq!(colors["brand"], colors["emerald"]);
        assert_eq!(colors["gray"].shades[&500], "#64748b");
    }

    #[test]
    fn font_stack_starts_with_site_font() {
        let theme = ThemeConfig::site();
        let sans = &theme.theme.extend.font_family["sans"];

        assert_eq!(sans[0], "strawford");
        assert!(sans.contains(&"sans-serif".to_string()));
        assert_eq!(sans.last().map(String::as_str), Some("Noto Color Emoji"));
        assert_eq!(sans.len(), 15);
    }

    #[test]
    fn serializes_to_generator_shape() {
        let json: Value = serde_json::from_str(&ThemeConfig::site().to_json().unwrap()).unwrap();

        assert_eq!(json["purge"]["content"], json!(["_site/**/*.html"]));
        assert_eq!(json["purge"]["options"]["safelist"], json!([]));
        assert_eq!(json["theme"]["extend"]["animation"]["blob"], "blob 7s infinite");
        assert_eq!(
            json["theme"]["extend"]["keyframes"]["blob"]["66%"]["transform"],
            "translate(-20px, 20px) scale(0.9)"
        );
        assert_eq!(json["theme"]["extend"]["colors"]["primary"]["50"], "#ecfeff");
        assert_eq!(json["theme"]["extend"]["typography"]["DEFAULT"]["css"], json!({}));
        assert_eq!(json["theme"]["extend"]["fontFamily"]["sans"][0], "strawford");
        assert_eq!(json["plugins"], json!(["@tailwindcss/typography"]));
    }

    #[test]
    fn renders_css_layer() {
        let css = ThemeConfig::site().to_css();

        assert!(css.contains("--color-primary-500: #06b6d4;"));
        assert!(css.contains("@keyframes blob {"));
        assert!(css.contains("33% {\n    transform: translate(30px, -50px) scale(1.1);"));
        assert!(css.contains(".animate-blob {\n  animation: blob 7s infinite;"));
        assert!(css.contains("--font-sans: strawford, ui-sans-serif,"));
        assert!(css.contains("\"Segoe UI\""));
    }

    #[test]
    fn minifies_css_layer() {
        let theme = ThemeConfig::site();

        let minified = theme.to_css_minified().unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains("@keyframes blob"));
        assert!(minified.len() < theme.to_css().len());
    }
}
