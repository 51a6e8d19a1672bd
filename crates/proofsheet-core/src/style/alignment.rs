//! Cell text alignment, carried through unchanged

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    /// Long text breaks onto several lines within the cell
    pub wrap_text: bool,
    /// Long text is drawn smaller to fit the column instead
    pub shrink_to_fit: bool,
    /// Indent steps from the aligned edge
    pub indent: u8,
    /// Degrees counter-clockwise; 255 means stacked vertical text
    pub rotation: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    /// Text to the left, numbers to the right
    #[default]
    General,
    Left,
    Center,
    Right,
    /// Repeat the content across the cell width
    Fill,
    Justify,
    /// Center across a run of empty neighbouring cells
    CenterContinuous,
    Distributed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    Top,
    Center,
    #[default]
    Bottom,
    Justify,
    Distributed,
}

const HORIZONTAL_NAMES: [(HorizontalAlignment, &str); 8] = [
    (HorizontalAlignment::General, "general"),
    (HorizontalAlignment::Left, "left"),
    (HorizontalAlignment::Center, "center"),
    (HorizontalAlignment::Right, "right"),
    (HorizontalAlignment::Fill, "fill"),
    (HorizontalAlignment::Justify, "justify"),
    (HorizontalAlignment::CenterContinuous, "centerContinuous"),
    (HorizontalAlignment::Distributed, "distributed"),
];

const VERTICAL_NAMES: [(VerticalAlignment, &str); 5] = [
    (VerticalAlignment::Top, "top"),
    (VerticalAlignment::Center, "center"),
    (VerticalAlignment::Bottom, "bottom"),
    (VerticalAlignment::Justify, "justify"),
    (VerticalAlignment::Distributed, "distributed"),
];

impl HorizontalAlignment {
    /// The `horizontal` attribute value in SpreadsheetML
    pub fn ooxml_name(self) -> &'static str {
        HORIZONTAL_NAMES
            .iter()
            .find(|(h, _)| *h == self)
            .map_or("general", |(_, name)| name)
    }

    pub fn from_ooxml_name(name: &str) -> Option<Self> {
        HORIZONTAL_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(h, _)| *h)
    }
}

impl VerticalAlignment {
    /// The `vertical` attribute value in SpreadsheetML
    pub fn ooxml_name(self) -> &'static str {
        VERTICAL_NAMES
            .iter()
            .find(|(v, _)| *v == self)
            .map_or("bottom", |(_, name)| name)
    }

    pub fn from_ooxml_name(name: &str) -> Option<Self> {
        VERTICAL_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(v, _)| *v)
    }
}
