//! Cell borders, read and written back untouched

use super::Color;

/// Edges of a cell; `None` means that side is not drawn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BorderStyle {
    pub left: Option<BorderEdge>,
    pub right: Option<BorderEdge>,
    pub top: Option<BorderEdge>,
    pub bottom: Option<BorderEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderEdge {
    pub style: BorderLineStyle,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderLineStyle {
    #[default]
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

const LINE_NAMES: [(BorderLineStyle, &str); 13] = [
    (BorderLineStyle::Thin, "thin"),
    (BorderLineStyle::Medium, "medium"),
    (BorderLineStyle::Thick, "thick"),
    (BorderLineStyle::Dashed, "dashed"),
    (BorderLineStyle::Dotted, "dotted"),
    (BorderLineStyle::Double, "double"),
    (BorderLineStyle::Hair, "hair"),
    (BorderLineStyle::MediumDashed, "mediumDashed"),
    (BorderLineStyle::DashDot, "dashDot"),
    (BorderLineStyle::MediumDashDot, "mediumDashDot"),
    (BorderLineStyle::DashDotDot, "dashDotDot"),
    (BorderLineStyle::MediumDashDotDot, "mediumDashDotDot"),
    (BorderLineStyle::SlantDashDot, "slantDashDot"),
];

impl BorderLineStyle {
    /// The `style` attribute of a SpreadsheetML border edge
    pub fn ooxml_name(self) -> &'static str {
        LINE_NAMES
            .iter()
            .find(|(line, _)| *line == self)
            .map_or("thin", |(_, name)| name)
    }

    /// `None` for "none" and unknown names: no edge is drawn
    pub fn from_ooxml_name(name: &str) -> Option<Self> {
        LINE_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(line, _)| *line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_names() {
        assert_eq!(BorderLineStyle::MediumDashDot.ooxml_name(), "mediumDashDot");
        assert_eq!(BorderLineStyle::from_ooxml_name("hair"), Some(BorderLineStyle::Hair));
        assert_eq!(BorderLineStyle::from_ooxml_name("none"), None);
    }
}
