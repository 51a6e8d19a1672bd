//! Cell formatting
//!
//! Styles are carried from the input to the annotated copy. The renderer
//! changes only the fill of flagged cells; everything else here passes
//! through as read.

mod alignment;
mod border;
mod color;
mod fill;
mod font;
mod number_format;
mod pool;

pub use alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
pub use border::{BorderEdge, BorderLineStyle, BorderStyle};
pub use color::Color;
pub use fill::{FillStyle, PatternType};
pub use font::{FontStyle, Underline};
pub use number_format::NumberFormat;
pub use pool::StylePool;

/// Everything that decides how one cell looks, interned per sheet in a
/// [`StylePool`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub font: FontStyle,
    pub fill: FillStyle,
    pub border: BorderStyle,
    pub alignment: Alignment,
    pub number_format: NumberFormat,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// This style with its fill replaced, the rest untouched
    pub fn with_fill(&self, fill: FillStyle) -> Self {
        Self {
            fill,
            ..self.clone()
        }
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    pub fn font_color(mut self, color: Color) -> Self {
        self.font.color = color;
        self
    }

    /// Solid background
    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill = FillStyle::solid(color);
        self
    }

    pub fn number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    pub fn wrap_text(mut self, wrap: bool) -> Self {
        self.alignment.wrap_text = wrap;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_fill_keeps_font_and_format() {
        let base = Style::new()
            .bold(true)
            .number_format(NumberFormat::date_short());
        let pink = base.with_fill(FillStyle::solid(Color::rgb(0xFF, 0xCC, 0xCC)));

        assert!(pink.font.bold);
        assert_eq!(pink.number_format, NumberFormat::date_short());
        assert_eq!(pink.fill.solid_color(), Some(Color::rgb(0xFF, 0xCC, 0xCC)));
        assert_eq!(base.fill, FillStyle::None);
    }
}
