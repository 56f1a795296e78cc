//! Frame dimension strings from retailer catalog data.
//!
//! Catalog entries describe a frame as a dash-separated list of millimeter
//! values. Three layouts occur in practice:
//!
//! | parts | layout                                   |
//! |-------|------------------------------------------|
//! | 3     | `width-bridge-temple`                    |
//! | 4     | `lens-bridge-frame-temple`               |
//! | 5     | `lens-height-bridge-frame-temple`        |
//!
//! Anything else is malformed. Rendering code calls [`parse_dimensions`],
//! which never fails and substitutes [`FrameDimensions::FALLBACK`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Physical frame measurements, all in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameDimensions {
    /// Overall frame width, the value used for on-face scaling.
    pub width: f32,
    pub bridge: f32,
    pub temple: f32,
    /// Single lens width, only present in 4- and 5-part strings.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lens_width: Option<f32>,
    /// Lens height, only present in 5-part strings.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lens_height: Option<f32>,
}

impl FrameDimensions {
    /// Substituted whenever a dimension string is missing or malformed.
    pub const FALLBACK: FrameDimensions = FrameDimensions {
        width: 140.0,
        bridge: 18.0,
        temple: 145.0,
        lens_width: None,
        lens_height: None,
    };

    pub const fn new(width: f32, bridge: f32, temple: f32) -> Self {
        Self {
            width,
            bridge,
            temple,
            lens_width: None,
            lens_height: None,
        }
    }
}

impl Default for FrameDimensions {
    fn default() -> Self {
        Self::FALLBACK
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, '-' | '–' | '—' | ',' | '/') || c.is_whitespace()
}

fn parse_part(token: &str) -> Option<f32> {
    let number = token
        .strip_suffix("mm")
        .or_else(|| token.strip_suffix("MM"))
        .unwrap_or(token);
    match number.parse::<f32>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => None,
    }
}

impl FromStr for FrameDimensions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::MalformedDimensions(s.to_string());

        let mut parts = Vec::with_capacity(5);
        for token in s.split(is_separator).filter(|t| !t.is_empty()) {
            if token.eq_ignore_ascii_case("mm") {
                continue;
            }
            parts.push(parse_part(token).ok_or_else(malformed)?);
        }

        match parts[..] {
            [width, bridge, temple] => Ok(FrameDimensions::new(width, bridge, temple)),
            [lens, bridge, width, temple] => Ok(FrameDimensions {
                width,
                bridge,
                temple,
                lens_width: Some(lens),
                lens_height: None,
            }),
            [lens, height, bridge, width, temple] => Ok(FrameDimensions {
                width,
                bridge,
                temple,
                lens_width: Some(lens),
                lens_height: Some(height),
            }),
            _ => Err(malformed()),
        }
    }
}

/// Parse a catalog dimension string, substituting [`FrameDimensions::FALLBACK`]
/// for missing or malformed input.
pub fn parse_dimensions(dimensions: Option<&str>) -> FrameDimensions {
    let Some(raw) = dimensions else {
        return FrameDimensions::FALLBACK;
    };
    match raw.parse() {
        Ok(dims) => dims,
        Err(err) => {
            tracing::debug!(%err, "using fallback frame dimensions");
            FrameDimensions::FALLBACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn three_part_string() {
        let dims = parse_dimensions(Some("52-18-145"));
        assert_eq!(dims, FrameDimensions::new(52.0, 18.0, 145.0));
    }

    #[test]
    fn decimals_whitespace_and_alternate_separators() {
        assert_eq!(
            parse_dimensions(Some("  52.5 - 18 - 145 ")),
            FrameDimensions::new(52.5, 18.0, 145.0)
        );
        assert_eq!(
            parse_dimensions(Some("52,18,145")),
            FrameDimensions::new(52.0, 18.0, 145.0)
        );
        assert_eq!(
            parse_dimensions(Some("52–18–145 mm")),
            FrameDimensions::new(52.0, 18.0, 145.0)
        );
        assert_eq!(
            parse_dimensions(Some("52mm/18mm/145mm")),
            FrameDimensions::new(52.0, 18.0, 145.0)
        );
    }

    #[test]
    fn four_and_five_part_strings() {
        let four = parse_dimensions(Some("51-18-142-140"));
        assert_eq!(four.width, 142.0);
        assert_eq!(four.bridge, 18.0);
        assert_eq!(four.temple, 140.0);
        assert_eq!(four.lens_width, Some(51.0));
        assert_eq!(four.lens_height, None);

        let five = parse_dimensions(Some("51-38-18-142-140"));
        assert_eq!(five.width, 142.0);
        assert_eq!(five.lens_height, Some(38.0));
        assert_eq!(five.bridge, 18.0);
    }

    #[test]
    fn fallback_for_missing_or_malformed() {
        for input in [None, Some(""), Some("garbage"), Some("52-18"), Some("1-2-3-4-5-6")] {
            assert_eq!(parse_dimensions(input), FrameDimensions::FALLBACK, "{input:?}");
        }
        assert_eq!(
            FrameDimensions::FALLBACK,
            FrameDimensions::new(140.0, 18.0, 145.0)
        );
    }

    #[test]
    fn rejects_non_positive_and_junk_tokens() {
        assert!("52-0-145".parse::<FrameDimensions>().is_err());
        assert!("52-18-abc".parse::<FrameDimensions>().is_err());
        assert!("52-18-145-NaN".parse::<FrameDimensions>().is_err());
        assert!("inf-18-145".parse::<FrameDimensions>().is_err());
    }

    #[test]
    fn width_bridge_temple_grid() {
        for width in ["40", "52", "52.5", "138.25", "150"] {
            for bridge in ["14", "18", "19.5", "22"] {
                for temple in ["135", "140", "145.5", "150"] {
                    let raw = format!("{width}-{bridge}-{temple}");
                    let expected = FrameDimensions::new(
                        width.parse().unwrap(),
                        bridge.parse().unwrap(),
                        temple.parse().unwrap(),
                    );
                    assert_eq!(parse_dimensions(Some(&raw)), expected, "{raw}");
                }
            }
        }
    }

    fn millimeters() -> impl Strategy<Value = String> {
        prop_oneof![
            (1u32..400).prop_map(|whole| whole.to_string()),
            (0u32..400, 1u32..100).prop_map(|(whole, frac)| format!("{whole}.{frac:02}")),
        ]
    }

    proptest! {
        #[test]
        fn any_width_bridge_temple_parses_exactly(
            width in millimeters(),
            bridge in millimeters(),
            temple in millimeters(),
        ) {
            let raw = format!("{width}-{bridge}-{temple}");
            let dims = parse_dimensions(Some(&raw));
            prop_assert_eq!(dims.width, width.parse::<f32>().unwrap());
            prop_assert_eq!(dims.bridge, bridge.parse::<f32>().unwrap());
            prop_assert_eq!(dims.temple, temple.parse::<f32>().unwrap());
            prop_assert_eq!(dims.lens_width, None);
        }
    }
}
