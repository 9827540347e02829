use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::Face;

/// Font used to measure and draw token text.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    /// Line box height as a multiple of `size`.
    pub line_height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    pub width: f32,
    pub height: f32,
}

/// Text box measurement, the headless stand-in for a browser's `getBBox`.
///
/// Returning `None` means the measurement is unavailable; layout logs it and
/// carries on with what it has.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> Option<TextExtent>;
}

/// Measures with glyph advances from an installed font, falling back to
/// [`HeuristicMeasurer`] when no face resolves.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFontMeasurer;

impl TextMeasurer for SystemFontMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> Option<TextExtent> {
        let width = measure_text_width(text, font.size, &font.family)
            .unwrap_or_else(|| heuristic_text_width(text, font.size));
        Some(TextExtent {
            width,
            height: line_box_height(font),
        })
    }
}

/// Per-character width table; no font files are touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasurer;

impl TextMeasurer for HeuristicMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> Option<TextExtent> {
        Some(TextExtent {
            width: heuristic_text_width(text, font.size),
            height: line_box_height(font),
        })
    }
}

/// Monospaced measurer with fixed cell sizes. Deterministic, for tests and
/// environments without fonts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMeasurer {
    pub char_width: f32,
    pub line_height: f32,
}

impl FixedMeasurer {
    pub fn new(char_width: f32, line_height: f32) -> Self {
        Self {
            char_width,
            line_height,
        }
    }
}

impl TextMeasurer for FixedMeasurer {
    fn measure(&self, text: &str, _font: &FontSpec) -> Option<TextExtent> {
        Some(TextExtent {
            width: text.chars().count() as f32 * self.char_width,
            height: self.line_height,
        })
    }
}

fn line_box_height(font: &FontSpec) -> f32 {
    font.size * font.line_height
}

pub fn heuristic_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

pub(crate) fn char_width_factor(ch: char) -> f32 {
    // Advance widths relative to a 1px em for a common sans-serif stack.
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        '"' | '\'' => 0.355,
        '-' | '_' => 0.390,
        '>' | '<' | '=' | '+' => 0.584,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}

static FONT_CACHE: Lazy<Mutex<FontCache>> = Lazy::new(|| Mutex::new(FontCache::new()));

/// Width of `text` in the first installed face matching `font_family`.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = FONT_CACHE.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

struct FontCache {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl FontCache {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let family_key = normalize_family_key(font_family);
        if !self.faces.contains_key(&family_key) {
            let face = self.load_face(font_family, &family_key);
            if face.is_none() {
                tracing::debug!(family = %family_key, "no installed face matches font family");
            }
            self.faces.insert(family_key.clone(), face);
        }
        let face = self.faces.get_mut(&family_key)?.as_mut()?;
        let normalized = text.replace('\t', "    ");
        face.measure_width(&normalized, font_size)
    }

    fn load_face(&mut self, font_family: &str, family_key: &str) -> Option<FontFace> {
        if let Some(face) = load_cached_face(family_key) {
            return Some(face);
        }

        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|raw| !raw.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|&raw| match raw.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(raw),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| {
                let bytes = data.to_vec();
                let face = FontFace::new(bytes, index)?;
                store_cached_face(family_key, &face.data, index);
                Some(face)
            })
            .flatten()
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;

        if text.is_ascii() {
            let width: f32 = text
                .bytes()
                .filter(|byte| *byte != b'\n')
                .map(|byte| match self.ascii_advances[byte as usize] {
                    0 => fallback,
                    advance => advance as f32 * scale,
                })
                .sum();
            return Some(width.max(0.0));
        }

        let face = Face::parse(&self.data, self.index).ok()?;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = *self.advance_cache.entry(ch).or_insert_with(|| {
                face.glyph_index(ch)
                    .and_then(|glyph_id| face.glyph_hor_advance(glyph_id))
            });
            width += match advance {
                Some(value) => value as f32 * scale,
                None => fallback,
            };
        }
        Some(width.max(0.0))
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

fn cache_paths(family_key: &str) -> Option<(PathBuf, PathBuf)> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    family_key.hash(&mut hasher);
    let hash = hasher.finish();
    let dir = base.join("dep2svg").join("font-cache");
    Some((
        dir.join(format!("{hash:x}.font")),
        dir.join(format!("{hash:x}.meta")),
    ))
}

fn load_cached_face(family_key: &str) -> Option<FontFace> {
    let (font_path, meta_path) = cache_paths(family_key)?;
    if !font_path.exists() || !meta_path.exists() {
        return None;
    }
    let bytes = fs::read(font_path).ok()?;
    let index: u32 = fs::read_to_string(meta_path).ok()?.trim().parse().ok()?;
    FontFace::new(bytes, index)
}

// Best effort: a cache that cannot be written only costs a font lookup next run.
fn store_cached_face(family_key: &str, bytes: &[u8], index: u32) {
    let Some((font_path, meta_path)) = cache_paths(family_key) else {
        return;
    };
    if font_path.exists() {
        return;
    }
    if let Some(parent) = font_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let _ = fs::write(&font_path, bytes);
    let _ = fs::write(&meta_path, index.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font() -> FontSpec {
        FontSpec {
            family: "sans-serif".to_string(),
            size: 16.0,
            line_height: 1.25,
        }
    }

    #[test]
    fn fixed_measurer_counts_chars() {
        let extent = FixedMeasurer::new(10.0, 20.0).measure("NOM", &font()).unwrap();
        assert_eq!(extent.width, 30.0);
        assert_eq!(extent.height, 20.0);
    }

    #[test]
    fn fixed_measurer_counts_chars_not_bytes() {
        let extent = FixedMeasurer::new(10.0, 20.0).measure("ääk", &font()).unwrap();
        assert_eq!(extent.width, 30.0);
    }

    #[test]
    fn char_width_factor_returns_positive_values() {
        for ch in ['a', 'Z', ' ', '0', '@', '"', '\u{4e2d}'] {
            assert!(char_width_factor(ch) > 0.0, "char {:?} has zero width", ch);
        }
    }

    #[test]
    fn heuristic_width_scales_with_font_size() {
        let w16 = heuristic_text_width("Hello", 16.0);
        let w32 = heuristic_text_width("Hello", 32.0);
        assert!((w32 - w16 * 2.0).abs() < 0.01, "width should double with font size");
    }

    #[test]
    fn heuristic_height_follows_line_height() {
        let extent = HeuristicMeasurer.measure("x", &font()).unwrap();
        assert!((extent.height - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn system_measurer_always_measures() {
        let extent = SystemFontMeasurer.measure("meow", &font()).unwrap();
        assert!(extent.width > 0.0);
        assert!(extent.height > 0.0);
    }

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(measure_text_width("", 16.0, "sans-serif"), Some(0.0));
    }
}
