use self::color::*;
use std::borrow::Cow;
use termion::{
    color::Fg,
    style::{Bold, Faint, Italic, Reset},
};

/// Parts of a usage line a [`Style`] may decorate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Item {
    Names,
    Type,
    Usage,
    Default,
}

/// Decorations written around each [`Item`] of a usage line.
///
/// Decorations take no columns; alignment is computed on the undecorated text.
pub trait Style {
    fn begin(&self, item: Item) -> Cow<'static, str>;
    fn end(&self, item: Item) -> Cow<'static, str>;
}

/// Undecorated text.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plain;

/// Terminal colors through escape sequences.
#[derive(Clone, Copy, Debug, Default)]
pub struct Color;

impl Style for Plain {
    #[inline]
    fn begin(&self, _: Item) -> Cow<'static, str> {
        Cow::Borrowed("")
    }

    #[inline]
    fn end(&self, _: Item) -> Cow<'static, str> {
        Cow::Borrowed("")
    }
}

impl Style for Color {
    fn begin(&self, item: Item) -> Cow<'static, str> {
        Cow::Owned(match item {
            Item::Names => format!("{Bold}{}", Fg(TURQUOISE)),
            Item::Type => format!("{Faint}{}", Fg(TURQUOISE)),
            Item::Usage => format!("{}", Fg(PEACH)),
            Item::Default => format!("{Italic}{}", Fg(SILVER_GRAY)),
        })
    }

    fn end(&self, _: Item) -> Cow<'static, str> {
        Cow::Owned(format!("{Reset}"))
    }
}

pub mod color {
    use termion::color::Rgb;

    pub const TURQUOISE: Rgb = Rgb(64, 224, 208);
    pub const PEACH: Rgb = Rgb(255, 218, 185);
    pub const SILVER_GRAY: Rgb = Rgb(169, 169, 169);
}
