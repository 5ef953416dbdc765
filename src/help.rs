use crate::{
    codec::{Kind, Scalar},
    style::{Item, Style},
};
use std::fmt::{self, Write};

const INDENT: &str = "  ";
/// Column at which usage text starts, not counting the indent.
pub const WIDTH: usize = 25;

/// What usage rendering needs to know about a declared flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub alias: Option<char>,
    pub usage: String,
    pub default: Scalar,
}

impl Entry {
    pub fn kind(&self) -> Kind {
        self.default.kind()
    }
}

struct Helper<'a> {
    buffer: &'a mut String,
    style: &'a dyn Style,
}

impl Helper<'_> {
    fn styled(&mut self, item: Item, text: &str) -> Result<(), fmt::Error> {
        if text.is_empty() {
            return Ok(());
        }
        write!(
            self.buffer,
            "{}{text}{}",
            self.style.begin(item),
            self.style.end(item)
        )
    }

    fn space(&mut self, width: usize) -> Result<(), fmt::Error> {
        write!(self.buffer, "{:width$}", "")
    }

    fn entry(&mut self, entry: &Entry) -> Result<(), fmt::Error> {
        let names = match entry.alias {
            Some(alias) => format!("-{alias}, --{}", entry.name),
            None => format!("    --{}", entry.name),
        };
        let kind = match entry.kind() {
            Kind::Bool => String::new(),
            kind => format!(" {kind}"),
        };
        let width = names.chars().count() + kind.chars().count();

        self.buffer.push_str(INDENT);
        self.styled(Item::Names, &names)?;
        self.styled(Item::Type, &kind)?;
        if width >= WIDTH {
            writeln!(self.buffer)?;
            self.buffer.push_str(INDENT);
            self.space(WIDTH)?;
        } else {
            self.space(WIDTH - width)?;
        }
        self.styled(Item::Usage, &entry.usage)?;
        self.styled(Item::Default, &default(&entry.default))
    }
}

/// The ` (default ...)` suffix, empty for zero values.
fn default(value: &Scalar) -> String {
    match value {
        _ if value.is_zero() => String::new(),
        Scalar::Text(text) => format!(" (default {text:?})"),
        value => format!(" (default {value})"),
    }
}

/// Renders one flag as an aligned usage block, without a trailing line break.
pub(crate) fn line(entry: &Entry, style: &dyn Style) -> String {
    let mut buffer = String::new();
    let mut helper = Helper {
        buffer: &mut buffer,
        style,
    };
    match helper.entry(entry) {
        Ok(()) => buffer,
        Err(_) => unreachable!("formatting into a string does not fail"),
    }
}

/// Renders every entry in order, each terminated by a line break.
pub(crate) fn usage<'a>(entries: impl IntoIterator<Item = &'a Entry>, style: &dyn Style) -> String {
    let mut buffer = String::new();
    for entry in entries {
        buffer.push_str(&line(entry, style));
        buffer.push('\n');
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{color, Color, Plain};
    use termion::{color::Fg, style::Reset};

    fn entry(name: &str, alias: Option<char>, usage: &str, default: Scalar) -> Entry {
        Entry {
            name: name.into(),
            alias,
            usage: usage.into(),
            default,
        }
    }

    #[test]
    fn aligned_with_alias() {
        let entry = entry(
            "name",
            Some('n'),
            "Command name for error messages",
            Scalar::Text("foo".into()),
        );
        assert_eq!(
            line(&entry, &Plain),
            "  -n, --name string        Command name for error messages (default \"foo\")"
        );
    }

    #[test]
    fn missing_alias_keeps_column() {
        let entry = entry("quiet", None, "Say less", Scalar::Bool(false));
        assert_eq!(line(&entry, &Plain), format!("      --quiet{:14}Say less", ""));
    }

    #[test]
    fn boolean_default_only_when_true() {
        let on = entry("x", Some('x'), "on", Scalar::Bool(true));
        assert!(line(&on, &Plain).ends_with("on (default true)"));
        let ratio = entry("r", None, "ratio", Scalar::Float64(0.5));
        assert!(line(&ratio, &Plain).ends_with("ratio (default 0.5)"));
        let empty = entry("s", None, "text", Scalar::Text(String::new()));
        assert!(line(&empty, &Plain).ends_with("text"));
    }

    #[test]
    fn extreme_float_defaults_use_exponent() {
        let large = entry("big", None, "big", Scalar::Float64(1e21));
        assert!(line(&large, &Plain).ends_with("big (default 1e+21)"));
        let small = entry("tiny", None, "tiny", Scalar::Float64(1e-7));
        assert!(line(&small, &Plain).ends_with("tiny (default 1e-07)"));
    }

    #[test]
    fn exactly_at_width_wraps() {
        // "    --" + 19 letters is 25 columns.
        let entry = entry("abcdefghijklmnopqrs", None, "wrapped", Scalar::Bool(false));
        assert_eq!(
            line(&entry, &Plain),
            format!("      --abcdefghijklmnopqrs\n{:27}wrapped", "")
        );
    }

    #[test]
    fn colors_do_not_shift_columns() {
        let entry = entry("num", Some('n'), "number", Scalar::Int(3));
        let colored = line(&entry, &Color);
        assert!(colored.contains("-n, --num"));
        assert!(colored.contains(&format!("{Reset}{:12}{}", "", Fg(color::PEACH))));
        assert!(colored.contains("number"));
    }
}
