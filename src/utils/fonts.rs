// Font registry for welcome image text
// Fonts are registered ahead of time; nothing is looked up from the system at render time.
// DejaVu Sans ships inside the binary so text always has a face with Arabic coverage.

use ab_glyph::{FontArc, InvalidFont};
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

// Embed font at compile time, last-resort face for every lookup
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Registered fonts keyed by lowercase family name
#[derive(Clone)]
pub struct FontRegistry {
    fonts: BTreeMap<String, FontArc>,
    default_family: String,
    bundled: Option<FontArc>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new("")
    }
}

impl std::fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRegistry")
            .field("families", &self.fonts.keys().collect::<Vec<_>>())
            .field("default_family", &self.default_family)
            .field("bundled", &self.bundled.is_some())
            .finish()
    }
}

/// Family name for a font file: "Cairo-Regular.ttf" -> "cairo"
fn family_from_stem(stem: &str) -> String {
    stem.split('-').next().unwrap_or(stem).trim().to_lowercase()
}

impl FontRegistry {
    pub fn new(default_family: &str) -> Self {
        let bundled = match FontArc::try_from_slice(BUNDLED_FONT) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!("Bundled font failed to parse: {}", e);
                None
            }
        };

        Self {
            fonts: BTreeMap::new(),
            default_family: default_family.trim().to_lowercase(),
            bundled,
        }
    }

    /// Register every .ttf/.otf file in `dir`.
    /// When a family has several files the "Regular" face wins.
    pub fn load_dir(dir: &Path, default_family: &str) -> Result<Self> {
        let mut registry = Self::new(default_family);

        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let family = family_from_stem(stem);
            let is_regular = stem.to_lowercase().ends_with("regular");
            if registry.fonts.contains_key(&family) && !is_regular {
                continue;
            }

            match std::fs::read(&path) {
                Ok(bytes) => match registry.register(&family, bytes) {
                    Ok(()) => debug!("Registered font {} from {}", family, path.display()),
                    Err(e) => warn!("Skipping invalid font {}: {}", path.display(), e),
                },
                Err(e) => warn!("Failed to read font {}: {:?}", path.display(), e),
            }
        }

        info!(
            "Loaded {} font famil{} from {}",
            registry.fonts.len(),
            if registry.fonts.len() == 1 { "y" } else { "ies" },
            dir.display()
        );
        Ok(registry)
    }

    /// Register a font under a family name (replaces an existing entry)
    pub fn register(&mut self, family: &str, data: Vec<u8>) -> Result<(), InvalidFont> {
        let font = FontArc::try_from_vec(data)?;
        self.fonts.insert(family.trim().to_lowercase(), font);
        Ok(())
    }

    /// True when no font besides the bundled one is registered
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Look up a family, falling back to the default family, then the first
    /// registered font, then the bundled font.
    pub fn resolve(&self, family: &str) -> Option<&FontArc> {
        let key = family.trim().to_lowercase();
        if let Some(font) = self.fonts.get(&key) {
            return Some(font);
        }

        let fallback = self
            .fonts
            .get(&self.default_family)
            .or_else(|| self.fonts.values().next())
            .or(self.bundled.as_ref());
        if fallback.is_some() {
            debug!("Font '{}' unavailable, using fallback", family);
        }
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_glyph::Font;

    #[test]
    fn test_family_from_stem() {
        assert_eq!(family_from_stem("Cairo-Regular"), "cairo");
        assert_eq!(family_from_stem("Amiri"), "amiri");
        assert_eq!(family_from_stem("NotoSansArabic-Bold"), "notosansarabic");
    }

    #[test]
    fn test_register_rejects_garbage() {
        let mut registry = FontRegistry::new("cairo");
        assert!(registry.register("broken", vec![0, 1, 2, 3]).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_bundled_font_always_resolves() {
        let registry = FontRegistry::new("cairo");
        assert!(registry.is_empty());

        let font = registry.resolve("Cairo").expect("bundled font");
        // Arabic letters and their presentation forms are both covered
        assert_ne!(font.glyph_id('\u{0644}').0, 0);
        assert_ne!(font.glyph_id('\u{FEFB}').0, 0);
    }

    #[test]
    fn test_resolve_prefers_registered_fonts() {
        let mut registry = FontRegistry::new("sans");
        registry.register("Sans", BUNDLED_FONT.to_vec()).unwrap();
        assert!(!registry.is_empty());

        let registered = registry.resolve("sans").unwrap() as *const FontArc;
        assert!(std::ptr::eq(registry.resolve("SANS").unwrap(), registered));
        // Unknown family falls back to the default family, not the bundled copy
        assert!(std::ptr::eq(registry.resolve("NoSuchFamily").unwrap(), registered));
    }

    #[test]
    fn test_load_dir_skips_non_fonts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.txt"), "not a font").unwrap();
        std::fs::write(dir.path().join("Broken-Regular.ttf"), [0u8; 16]).unwrap();

        let registry = FontRegistry::load_dir(dir.path(), "cairo").unwrap();
        assert!(registry.is_empty());
        assert!(registry.resolve("cairo").is_some());
    }

    #[test]
    fn test_load_dir_registers_shipped_font() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
        let registry = FontRegistry::load_dir(&dir, "DejaVuSans").unwrap();
        assert!(!registry.is_empty());
        assert!(registry.resolve("dejavusans").is_some());
    }
}
