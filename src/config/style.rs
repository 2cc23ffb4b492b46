//! Display styles and the token vocabulary used to describe them
//!
//! A style is written in the config file as a list of short tokens such as
//! `["red", "on_black", "bold"]`. This module resolves those tokens into the
//! packed attribute values the rendering layer consumes.

use crossterm::style::{Attribute as TermAttribute, Color, ContentStyle};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Packed display attribute: a base colour in the low bits plus emphasis flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attribute(u16);

impl Attribute {
    pub const DEFAULT: Attribute = Attribute(0);
    pub const BLACK: Attribute = Attribute(1);
    pub const RED: Attribute = Attribute(2);
    pub const GREEN: Attribute = Attribute(3);
    pub const YELLOW: Attribute = Attribute(4);
    pub const BLUE: Attribute = Attribute(5);
    pub const MAGENTA: Attribute = Attribute(6);
    pub const CYAN: Attribute = Attribute(7);
    pub const WHITE: Attribute = Attribute(8);

    pub const BOLD: Attribute = Attribute(1 << 9);
    pub const UNDERLINE: Attribute = Attribute(1 << 10);
    pub const REVERSE: Attribute = Attribute(1 << 11);

    const COLOR_MASK: u16 = (1 << 9) - 1;

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// The base colour with all emphasis flags stripped
    pub const fn color(self) -> Attribute {
        Attribute(self.0 & Self::COLOR_MASK)
    }

    /// Whether every emphasis flag of `flag` is set on this attribute
    pub const fn contains(self, flag: Attribute) -> bool {
        flag.0 & !Self::COLOR_MASK != 0 && self.0 & flag.0 == flag.0
    }

    /// Terminal colour for the base colour, `None` meaning "terminal default"
    pub fn term_color(self) -> Option<Color> {
        match self.color() {
            Attribute::BLACK => Some(Color::Black),
            Attribute::RED => Some(Color::DarkRed),
            Attribute::GREEN => Some(Color::DarkGreen),
            Attribute::YELLOW => Some(Color::DarkYellow),
            Attribute::BLUE => Some(Color::DarkBlue),
            Attribute::MAGENTA => Some(Color::DarkMagenta),
            Attribute::CYAN => Some(Color::DarkCyan),
            Attribute::WHITE => Some(Color::Grey),
            _ => None,
        }
    }
}

impl BitOr for Attribute {
    type Output = Attribute;

    fn bitor(self, rhs: Attribute) -> Attribute {
        Attribute(self.0 | rhs.0)
    }
}

impl BitOrAssign for Attribute {
    fn bitor_assign(&mut self, rhs: Attribute) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.bits())
    }
}

/// Foreground colour names
pub static FG_COLORS: &[(&str, Attribute)] = &[
    ("default", Attribute::DEFAULT),
    ("black", Attribute::BLACK),
    ("red", Attribute::RED),
    ("green", Attribute::GREEN),
    ("yellow", Attribute::YELLOW),
    ("blue", Attribute::BLUE),
    ("magenta", Attribute::MAGENTA),
    ("cyan", Attribute::CYAN),
    ("white", Attribute::WHITE),
];

/// Background colour names
pub static BG_COLORS: &[(&str, Attribute)] = &[
    ("on_default", Attribute::DEFAULT),
    ("on_black", Attribute::BLACK),
    ("on_red", Attribute::RED),
    ("on_green", Attribute::GREEN),
    ("on_yellow", Attribute::YELLOW),
    ("on_blue", Attribute::BLUE),
    ("on_magenta", Attribute::MAGENTA),
    ("on_cyan", Attribute::CYAN),
    ("on_white", Attribute::WHITE),
];

/// Foreground emphasis names. "blink" is rendered as reverse video.
pub static FG_EMPHASIS: &[(&str, Attribute)] = &[
    ("bold", Attribute::BOLD),
    ("underline", Attribute::UNDERLINE),
    ("blink", Attribute::REVERSE),
];

/// Background emphasis names. The terminal renders bold-on-background as blink.
pub static BG_EMPHASIS: &[(&str, Attribute)] = &[("blink", Attribute::BOLD)];

fn lookup(table: &[(&str, Attribute)], token: &str) -> Option<Attribute> {
    table
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, attr)| *attr)
}

fn name_of(table: &'static [(&'static str, Attribute)], attr: Attribute) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, a)| *a == attr)
        .map(|(name, _)| *name)
}

/// A foreground/background attribute pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Attribute,
    pub bg: Attribute,
}

impl Style {
    pub const fn new(fg: Attribute, bg: Attribute) -> Self {
        Self { fg, bg }
    }

    /// Resolve an ordered list of style tokens.
    ///
    /// Base colours are applied first, with the last matching token of each
    /// channel winning. Emphasis tokens are then OR-ed on top, so they never
    /// clear a base colour regardless of where they appear. Tokens that match
    /// nothing are ignored so that files written for newer or older
    /// vocabularies still load.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut style = Style::default();

        for token in tokens.iter().map(AsRef::as_ref) {
            if let Some(fg) = lookup(FG_COLORS, token) {
                style.fg = fg;
            }
            if let Some(bg) = lookup(BG_COLORS, token) {
                style.bg = bg;
            }
        }

        for token in tokens.iter().map(AsRef::as_ref) {
            if let Some(attr) = lookup(FG_EMPHASIS, token) {
                style.fg |= attr;
            }
            if let Some(attr) = lookup(BG_EMPHASIS, token) {
                style.bg |= attr;
            }
        }

        style
    }

    /// Best-effort token list describing this style.
    ///
    /// "blink" appears in both emphasis tables, so a style carrying only one
    /// half of it does not survive a trip through `from_tokens` unchanged.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();

        if let Some(name) = name_of(FG_COLORS, self.fg.color()) {
            tokens.push(name.to_string());
        }
        if let Some(name) = name_of(BG_COLORS, self.bg.color()) {
            tokens.push(name.to_string());
        }

        for (name, attr) in FG_EMPHASIS {
            if self.fg.contains(*attr) {
                tokens.push(name.to_string());
            }
        }
        for (name, attr) in BG_EMPHASIS {
            if self.bg.contains(*attr) && !tokens.iter().any(|t| t == name) {
                tokens.push(name.to_string());
            }
        }

        tokens
    }

    /// Convert to a crossterm style for rendering
    pub fn to_content_style(&self) -> ContentStyle {
        let mut style = ContentStyle::new();
        style.foreground_color = self.fg.term_color();
        style.background_color = self.bg.term_color();

        if self.fg.contains(Attribute::BOLD) {
            style.attributes.set(TermAttribute::Bold);
        }
        if self.fg.contains(Attribute::UNDERLINE) {
            style.attributes.set(TermAttribute::Underlined);
        }
        if self.fg.contains(Attribute::REVERSE) {
            style.attributes.set(TermAttribute::Reverse);
        }
        if self.bg.contains(Attribute::BOLD) {
            style.attributes.set(TermAttribute::SlowBlink);
        }

        style
    }
}

impl<'de> Deserialize<'de> for Style {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tokens = Vec::<String>::deserialize(deserializer)?;
        Ok(Style::from_tokens(&tokens))
    }
}

impl Serialize for Style {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.tokens().serialize(serializer)
    }
}

/// Styles for each section of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StyleSet {
    pub basic: Style,
    pub saved_selection: Style,
    pub selected: Style,
    pub query: Style,
    pub matched: Style,
}

impl Default for StyleSet {
    fn default() -> Self {
        Self {
            basic: Style::new(Attribute::DEFAULT, Attribute::DEFAULT),
            saved_selection: Style::new(Attribute::BLACK | Attribute::BOLD, Attribute::CYAN),
            selected: Style::new(
                Attribute::DEFAULT | Attribute::UNDERLINE,
                Attribute::MAGENTA,
            ),
            query: Style::new(Attribute::DEFAULT, Attribute::DEFAULT),
            matched: Style::new(Attribute::CYAN, Attribute::DEFAULT),
        }
    }
}

impl StyleSet {
    /// Config-file names of the slots, in file order
    pub const SLOT_NAMES: [&'static str; 5] =
        ["Basic", "SavedSelection", "Selected", "Query", "Matched"];

    /// Slots paired with their config-file names, in file order
    pub fn slots(&self) -> [(&'static str, &Style); 5] {
        let [basic, saved_selection, selected, query, matched] = Self::SLOT_NAMES;
        [
            (basic, &self.basic),
            (saved_selection, &self.saved_selection),
            (selected, &self.selected),
            (query, &self.query),
            (matched, &self.matched),
        ]
    }
}

/// A slot given as `null` resets to the plain default style
fn null_as_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Style>, D::Error> {
    Ok(Some(Option::<Style>::deserialize(deserializer)?.unwrap_or_default()))
}

/// Style section as it appears in a document; absent slots stay `None`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StyleSetPatch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub basic: Option<Style>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub saved_selection: Option<Style>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected: Option<Style>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub query: Option<Style>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub matched: Option<Style>,
}

impl StyleSetPatch {
    pub fn apply_to(self, set: &mut StyleSet) {
        if let Some(style) = self.basic {
            set.basic = style;
        }
        if let Some(style) = self.saved_selection {
            set.saved_selection = style;
        }
        if let Some(style) = self.selected {
            set.selected = style;
        }
        if let Some(style) = self.query {
            set.query = style;
        }
        if let Some(style) = self.matched {
            set.matched = style;
        }
    }
}
