use std::path::{Path, PathBuf};

use plotters::style::{register_font, FontStyle};

use crate::error::RenderError;

/// Family name every chart uses for its text.
pub const FONT_FAMILY: &str = "sans-serif";

/// Common locations of a plain sans-serif TrueType font.
const SYSTEM_FONTS: [&str; 10] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Pick the explicit font if given, else the first existing candidate.
pub fn find_font(explicit: Option<&Path>, candidates: &[&str]) -> Result<PathBuf, RenderError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(RenderError::FontNotFound { searched: 1 });
    }
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .ok_or(RenderError::FontNotFound {
            searched: candidates.len(),
        })
}

/// Register a TrueType font as [`FONT_FAMILY`] for all chart text.
///
/// Returns the path that was registered.
pub fn register(explicit: Option<&Path>) -> Result<PathBuf, RenderError> {
    let path = find_font(explicit, &SYSTEM_FONTS)?;
    let bytes = std::fs::read(&path).map_err(|e| RenderError::InvalidFont {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    // plotters keeps a 'static reference for the rest of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(FONT_FAMILY, FontStyle::Normal, bytes).map_err(|_| {
        RenderError::InvalidFont {
            path: path.clone(),
            reason: "not a TrueType/OpenType font".to_string(),
        }
    })?;
    log::debug!("Registered chart font {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_font_wins() {
        let dir = TempDir::new().unwrap();
        let font = dir.path().join("custom.ttf");
        std::fs::write(&font, b"fake").unwrap();

        let found = find_font(Some(&font), &SYSTEM_FONTS).unwrap();
        assert_eq!(found, font);
    }

    #[test]
    fn test_register_rejects_non_font_file() {
        let dir = TempDir::new().unwrap();
        let font = dir.path().join("broken.ttf");
        std::fs::write(&font, b"not a font").unwrap();

        let err = register(Some(&font)).unwrap_err();
        assert!(matches!(err, RenderError::InvalidFont { ref path, .. } if *path == font));
    }

    #[test]
    fn test_missing_explicit_font() {
        let err = find_font(Some(Path::new("/nonexistent/font.ttf")), &SYSTEM_FONTS).unwrap_err();
        assert!(matches!(err, RenderError::FontNotFound { searched: 1 }));
    }

    #[test]
    fn test_first_existing_candidate() {
        let dir = TempDir::new().unwrap();
        let second = dir.path().join("b.ttf");
        std::fs::write(&second, b"fake").unwrap();
        let missing = dir.path().join("a.ttf");

        let candidates = [missing.to_str().unwrap(), second.to_str().unwrap()];
        assert_eq!(find_font(None, &candidates).unwrap(), second);
        assert!(matches!(
            find_font(None, &[missing.to_str().unwrap()]),
            Err(RenderError::FontNotFound { searched: 1 })
        ));
    }
}
