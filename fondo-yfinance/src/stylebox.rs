use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Filename pattern of the style-box sprite; the digit selects the grid cell.
static STYLE_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"3_0stylelargeeq([1-9])\.gif").expect("valid style-box pattern"));

/// Morningstar size × style grid cell.
///
/// Cells are ordered row-major, `LargeValue` through `SmallGrowth`; the
/// sprite digit in the page markup is a 1-based index into this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleBox {
    /// Large size, value style.
    LargeValue,
    /// Large size, blend style.
    LargeBlend,
    /// Large size, growth style.
    LargeGrowth,
    /// Medium size, value style.
    MedValue,
    /// Medium size, blend style.
    MedBlend,
    /// Medium size, growth style.
    MedGrowth,
    /// Small size, value style.
    SmallValue,
    /// Small size, blend style.
    SmallBlend,
    /// Small size, growth style.
    SmallGrowth,
}

impl StyleBox {
    /// All cells in grid order.
    pub const ALL: [Self; 9] = [
        Self::LargeValue,
        Self::LargeBlend,
        Self::LargeGrowth,
        Self::MedValue,
        Self::MedBlend,
        Self::MedGrowth,
        Self::SmallValue,
        Self::SmallBlend,
        Self::SmallGrowth,
    ];

    /// Decode an image reference (full URL or bare filename).
    ///
    /// Returns `None` when the reference is not a style-box sprite.
    #[must_use]
    pub fn from_image_url(reference: &str) -> Option<Self> {
        let caps = STYLE_IMAGE.captures(reference)?;
        let digit: usize = caps[1].parse().ok()?;
        Some(Self::ALL[digit - 1])
    }

    /// Canonical `Size-Style` label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LargeValue => "Large-Value",
            Self::LargeBlend => "Large-Blend",
            Self::LargeGrowth => "Large-Growth",
            Self::MedValue => "Med-Value",
            Self::MedBlend => "Med-Blend",
            Self::MedGrowth => "Med-Growth",
            Self::SmallValue => "Small-Value",
            Self::SmallBlend => "Small-Blend",
            Self::SmallGrowth => "Small-Growth",
        }
    }
}

impl fmt::Display for StyleBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
