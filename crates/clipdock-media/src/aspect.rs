use std::fmt;

const RATIO_TOLERANCE: f64 = 0.02;
const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;

/// Aspect-ratio class of a video, derived from its pixel dimensions.
/// Drives the storage key prefix so players can pick a layout from the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectClass {
    Landscape,
    Portrait,
    Other,
}

impl AspectClass {
    /// Classifies `width`/`height` against 16:9 and 9:16 with a small
    /// tolerance. Anything outside both bands, including degenerate
    /// dimensions, is `Other`.
    pub fn classify(width: u32, height: u32) -> Self {
        let ratio = width as f64 / height as f64;
        if (ratio - LANDSCAPE_RATIO).abs() < RATIO_TOLERANCE {
            AspectClass::Landscape
        } else if (ratio - PORTRAIT_RATIO).abs() < RATIO_TOLERANCE {
            AspectClass::Portrait
        } else {
            AspectClass::Other
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

impl fmt::Display for AspectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_landscape_resolutions() {
        assert_eq!(AspectClass::classify(1920, 1080), AspectClass::Landscape);
        assert_eq!(AspectClass::classify(1280, 720), AspectClass::Landscape);
        assert_eq!(AspectClass::classify(3840, 2160), AspectClass::Landscape);
        // Encoder padding to a macroblock multiple still reads as 16:9.
        assert_eq!(AspectClass::classify(1920, 1088), AspectClass::Landscape);
    }

    #[test]
    fn common_portrait_resolutions() {
        assert_eq!(AspectClass::classify(1080, 1920), AspectClass::Portrait);
        assert_eq!(AspectClass::classify(720, 1280), AspectClass::Portrait);
    }

    #[test]
    fn off_ratio_resolutions_are_other() {
        assert_eq!(AspectClass::classify(640, 480), AspectClass::Other);
        assert_eq!(AspectClass::classify(1000, 1000), AspectClass::Other);
        assert_eq!(AspectClass::classify(2560, 1080), AspectClass::Other);
    }

    #[test]
    fn tolerance_band_is_strict() {
        // 16:9 is ~1.77778; 1.797 sits inside the band, 1.798 outside.
        assert_eq!(AspectClass::classify(1797, 1000), AspectClass::Landscape);
        assert_eq!(AspectClass::classify(1798, 1000), AspectClass::Other);
        // 9:16 is 0.5625; 0.582 sits inside the band, 0.583 outside.
        assert_eq!(AspectClass::classify(582, 1000), AspectClass::Portrait);
        assert_eq!(AspectClass::classify(583, 1000), AspectClass::Other);
    }

    #[test]
    fn degenerate_dimensions_are_other() {
        assert_eq!(AspectClass::classify(0, 0), AspectClass::Other);
        assert_eq!(AspectClass::classify(1920, 0), AspectClass::Other);
        assert_eq!(AspectClass::classify(0, 1080), AspectClass::Other);
    }

    #[test]
    fn prefix_matches_class() {
        assert_eq!(AspectClass::Landscape.prefix(), "landscape");
        assert_eq!(AspectClass::Portrait.prefix(), "portrait");
        assert_eq!(AspectClass::Other.prefix(), "other");
    }
}
