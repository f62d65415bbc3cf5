//! Static mapping from the service's expression vocabulary to display
//! attributes: localized label, overlay color, and list glyph.

/// Display attributes for one recognized expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionDisplay {
    /// Localized (zh-CN) label shown to the user.
    pub label: String,
    /// RGB color used for overlay strokes and label text.
    pub color: [u8; 3],
    /// Emoji glyph for list views.
    pub glyph: &'static str,
}

/// Neutral gray, also the fallback color for unmapped expressions.
pub const NEUTRAL_COLOR: [u8; 3] = [0x90, 0x93, 0x99];

/// (service label, localized label, color, glyph)
const MAPPINGS: &[(&str, &str, [u8; 3], &str)] = &[
    ("Neutral", "中性", NEUTRAL_COLOR, "😐"),
    ("Happy", "开心", [0x67, 0xC2, 0x3A], "😊"),
    ("Sad", "悲伤", NEUTRAL_COLOR, "😢"),
    ("Surprised", "惊讶", [0xE6, 0xA2, 0x3C], "😲"),
    ("Angry", "生气", [0xF5, 0x6C, 0x6C], "😠"),
    ("Fearful", "害怕", NEUTRAL_COLOR, "😨"),
    ("Disgusted", "厌恶", NEUTRAL_COLOR, "🤢"),
];

/// Look up display attributes for a service expression string.
///
/// Unmapped expressions keep the raw label with neutral styling, so new
/// server-side vocabulary degrades gracefully instead of failing.
pub fn display_for(expression: &str) -> EmotionDisplay {
    for &(name, label, color, glyph) in MAPPINGS {
        if name == expression {
            return EmotionDisplay {
                label: label.to_string(),
                color,
                glyph,
            };
        }
    }

    tracing::debug!(expression, "expression has no display mapping, using fallback");
    EmotionDisplay {
        label: expression.to_string(),
        color: NEUTRAL_COLOR,
        glyph: "😐",
    }
}
