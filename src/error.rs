use crate::codec::Kind;
use std::io;
use thiserror::Error;

/// Everything that can go wrong while declaring, binding or parsing flags.
///
/// Two categories live side by side. Errors for which [`Error::is_fatal`]
/// holds are caller bugs (duplicate declarations, forgotten binding calls,
/// malformed names); the builder panics with them and embedding code must
/// not catch and continue. Every other variant comes from user input and is
/// returned as an ordinary `Result`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid {kind} value {value:?}: {reason}")]
    MalformedValue {
        value: String,
        kind: Kind,
        reason: String,
    },
    #[error("unsupported flag type: expected {expected}, found {found}")]
    UnsupportedType { expected: Kind, found: Kind },
    #[error("flag redefined: {0}")]
    FlagRedefined(String),
    #[error("previous flag '{0}' not built (call build, build_var or build_slice)")]
    UnbuiltFlag(String),
    #[error("invalid flag name {0:?}: must be non-empty, not start with '-' and not contain '='")]
    InvalidName(String),
    #[error("bad flag syntax: {0}")]
    BadSyntax(String),
    #[error("flag provided but not defined: -{name}{}", suggest(.suggestions))]
    UnknownFlag {
        name: String,
        suggestions: Vec<String>,
    },
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),
    #[error("invalid value for flag -{flag}: {source}")]
    InvalidValue {
        flag: String,
        #[source]
        source: Box<Error>,
    },
    #[error("help requested")]
    Help,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Caller bugs that leave a flag-set half configured.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::FlagRedefined(_) | Error::UnbuiltFlag(_) | Error::InvalidName(_)
        )
    }

    pub(crate) fn malformed(value: &str, kind: Kind, reason: impl ToString) -> Self {
        Error::MalformedValue {
            value: value.to_owned(),
            kind,
            reason: reason.to_string(),
        }
    }
}

fn suggest(suggestions: &[String]) -> String {
    let mut buffer = String::new();
    for (index, suggestion) in suggestions.iter().enumerate() {
        buffer.push_str(if index == 0 { ". Similar flags: " } else { ", " });
        buffer.push('-');
        buffer.push_str(suggestion);
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_flag_lists_suggestions() {
        let error = Error::UnknownFlag {
            name: "verbos".into(),
            suggestions: vec!["verbose".into(), "version".into()],
        };
        assert_eq!(
            error.to_string(),
            "flag provided but not defined: -verbos. Similar flags: -verbose, -version"
        );
    }

    #[test]
    fn unknown_flag_without_suggestions() {
        let error = Error::UnknownFlag {
            name: "x".into(),
            suggestions: Vec::new(),
        };
        assert_eq!(error.to_string(), "flag provided but not defined: -x");
    }

    #[test]
    fn fatal_category() {
        assert!(Error::FlagRedefined("num".into()).is_fatal());
        assert!(Error::UnbuiltFlag("num".into()).is_fatal());
        assert!(!Error::MissingValue("num".into()).is_fatal());
        assert!(!Error::Help.is_fatal());
    }
}
