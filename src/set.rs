//! The flag registry and argument parser that bound flags plug into.

use crate::{
    codec::{self, FlagType, Kind},
    error::Error,
    spell::Spell,
    var::Var,
};
use std::{
    cell::RefCell,
    collections::{btree_map::Entry, BTreeMap, BTreeSet, VecDeque},
    env,
    io::{self, Write},
    process,
    rc::Rc,
};
use tracing::{debug, trace, warn};

/// A settable flag value. Every registered flag owns one.
pub trait Value {
    /// Applies one occurrence of the flag.
    fn set(&mut self, raw: &str) -> Result<(), Error>;
    /// Current contents, in human-readable form.
    fn render(&self) -> String;
    /// Boolean values toggle on bare presence and never consume the next argument.
    fn is_bool(&self) -> bool {
        false
    }
}

/// What [`FlagSet::parse`] does when parsing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorHandling {
    #[default]
    Continue,
    /// Exit with status 2 after reporting, or 0 for help.
    Exit,
    Panic,
}

/// One registered flag.
pub struct Flag {
    name: String,
    usage: String,
    default: String,
    value: Box<dyn Value>,
}

/// Writes the usage of a flag-set when parsing fails or help is requested.
pub type Usage = Rc<dyn Fn(&FlagSet, &mut dyn Write) -> io::Result<()>>;

pub struct FlagSet {
    name: String,
    handling: ErrorHandling,
    flags: BTreeMap<String, Flag>,
    actual: BTreeSet<String>,
    arguments: Vec<String>,
    parsed: bool,
    output: Option<Box<dyn Write>>,
    usage: Option<Usage>,
}

/// The scalar binding: every occurrence overwrites the target.
pub(crate) struct Slot<T> {
    target: Var<T>,
}

thread_local! {
    static COMMAND_LINE: Rc<RefCell<FlagSet>> = Rc::new(RefCell::new(FlagSet::new(
        program_name(),
        ErrorHandling::Exit,
    )));
}

/// The default flag-set of the running program, named after `argv[0]`.
///
/// Each thread sees its own instance.
pub fn command_line() -> Rc<RefCell<FlagSet>> {
    COMMAND_LINE.with(Rc::clone)
}

/// Parses the process arguments into [`command_line`].
pub fn parse() -> Result<(), Error> {
    command_line().borrow_mut().parse(env::args().skip(1))
}

fn program_name() -> String {
    env::args().next().unwrap_or_default()
}

impl Flag {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// The value as rendered when the flag was registered.
    pub fn default(&self) -> &str {
        &self.default
    }

    pub fn value(&self) -> String {
        self.value.render()
    }

    pub fn is_bool(&self) -> bool {
        self.value.is_bool()
    }
}

impl<T: FlagType> Slot<T> {
    pub fn new(target: Var<T>, default: T) -> Self {
        target.set(default);
        Self { target }
    }
}

impl<T: FlagType> Value for Slot<T> {
    fn set(&mut self, raw: &str) -> Result<(), Error> {
        self.target.set(codec::parse(raw)?);
        Ok(())
    }

    fn render(&self) -> String {
        codec::render(&*self.target.borrow())
    }

    fn is_bool(&self) -> bool {
        T::KIND == Kind::Bool
    }
}

macro_rules! typed {
    ($($method: ident: $type: ty),* $(,)?) => {
        $(
            pub fn $method(
                &mut self,
                target: &Var<$type>,
                name: &str,
                default: $type,
                usage: &str,
            ) -> Result<(), Error> {
                self.bind(target, name, default, usage)
            }
        )*
    };
}

impl FlagSet {
    pub fn new(name: impl Into<String>, handling: ErrorHandling) -> Self {
        Self {
            name: name.into(),
            handling,
            flags: BTreeMap::new(),
            actual: BTreeSet::new(),
            arguments: Vec::new(),
            parsed: false,
            output: None,
            usage: None,
        }
    }

    pub fn shared(name: impl Into<String>, handling: ErrorHandling) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(name, handling)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error_handling(&self) -> ErrorHandling {
        self.handling
    }

    /// Where parse errors and usage are reported. Defaults to standard error.
    pub fn set_output(&mut self, output: impl Write + 'static) {
        self.output = Some(Box::new(output));
    }

    /// Replaces the usage printed on parse failure and on `-h`/`--help`.
    pub fn set_usage(
        &mut self,
        usage: impl Fn(&FlagSet, &mut dyn Write) -> io::Result<()> + 'static,
    ) {
        self.usage = Some(Rc::new(usage));
    }

    /// Writes the usage to `output` with the installed hook, or lists every flag.
    pub fn write_usage(&self, output: &mut dyn Write) -> io::Result<()> {
        match &self.usage {
            Some(usage) => usage(self, output),
            None => self.write_defaults(output),
        }
    }

    /// Writes the usage to the set's output.
    pub fn print_usage(&mut self) -> io::Result<()> {
        let mut output = self.output.take();
        let result = match &mut output {
            Some(output) => self.write_usage(output.as_mut()),
            None => self.write_usage(&mut io::stderr()),
        };
        self.output = output;
        result
    }

    fn write_defaults(&self, output: &mut dyn Write) -> io::Result<()> {
        match self.name.as_str() {
            "" => writeln!(output, "Usage:")?,
            name => writeln!(output, "Usage of {name}:")?,
        }
        for flag in self.flags.values() {
            write!(output, "  -{}\n    \t{}", flag.name, flag.usage)?;
            if !matches!(flag.default.as_str(), "" | "0" | "false" | "[]") {
                write!(output, " (default {})", flag.default)?;
            }
            writeln!(output)?;
        }
        Ok(())
    }

    /// Registers a custom value under `name`.
    pub fn var(
        &mut self,
        value: impl Value + 'static,
        name: &str,
        usage: &str,
    ) -> Result<(), Error> {
        self.check(name)?;
        match self.flags.entry(name.to_owned()) {
            Entry::Occupied(entry) => Err(Error::FlagRedefined(entry.key().clone())),
            Entry::Vacant(entry) => {
                let default = value.render();
                debug!(flag = name, set = %self.name, default = %default, "registered flag");
                entry.insert(Flag {
                    name: name.to_owned(),
                    usage: usage.to_owned(),
                    default,
                    value: Box::new(value),
                });
                Ok(())
            }
        }
    }

    fn check(&self, name: &str) -> Result<(), Error> {
        if name.is_empty() || name.starts_with('-') || name.contains('=') {
            Err(Error::InvalidName(name.to_owned()))
        } else if self.flags.contains_key(name) {
            Err(Error::FlagRedefined(name.to_owned()))
        } else {
            Ok(())
        }
    }

    /// Registers a scalar flag that writes into `target`, which is set to `default` now.
    pub fn bind<T: FlagType>(
        &mut self,
        target: &Var<T>,
        name: &str,
        default: T,
        usage: &str,
    ) -> Result<(), Error> {
        self.check(name)?;
        self.var(Slot::new(target.clone(), default), name, usage)
    }

    typed!(
        bool_var: bool,
        string_var: String,
        int_var: i32,
        int64_var: i64,
        float64_var: f64,
        uint_var: usize,
        uint64_var: u64,
    );

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.get(name)
    }

    /// Sets a flag as if it had been given on the command line.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), Error> {
        let Some(flag) = self.flags.get_mut(name) else {
            return Err(self.unknown(name));
        };
        flag.value.set(raw)?;
        self.actual.insert(name.to_owned());
        Ok(())
    }

    /// Every registered flag, sorted by name.
    pub fn visit_all(&self, mut visit: impl FnMut(&Flag)) {
        self.flags.values().for_each(&mut visit);
    }

    /// Flags that have been set, sorted by name.
    pub fn visit(&self, mut visit: impl FnMut(&Flag)) {
        for name in &self.actual {
            if let Some(flag) = self.flags.get(name) {
                visit(flag);
            }
        }
    }

    pub fn nflag(&self) -> usize {
        self.actual.len()
    }

    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// Arguments left over after the flags.
    pub fn args(&self) -> &[String] {
        &self.arguments
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.arguments.get(index).map(String::as_str)
    }

    pub fn narg(&self) -> usize {
        self.arguments.len()
    }

    /// Parses flags from `arguments`, which must not include the program name.
    pub fn parse<A: Into<String>>(
        &mut self,
        arguments: impl IntoIterator<Item = A>,
    ) -> Result<(), Error> {
        self.parsed = true;
        let mut arguments: VecDeque<String> = arguments.into_iter().map(Into::into).collect();
        let result = loop {
            match self.parse_one(&mut arguments) {
                Ok(true) => {}
                Ok(false) => break Ok(()),
                Err(error) => break Err(error),
            }
        };
        self.arguments = arguments.into();
        match result {
            Ok(()) => {
                debug!(set = %self.name, flags = self.actual.len(), remaining = self.arguments.len(), "parsed flags");
                Ok(())
            }
            Err(error) => self.fail(error),
        }
    }

    fn parse_one(&mut self, arguments: &mut VecDeque<String>) -> Result<bool, Error> {
        let Some(argument) = arguments.front() else {
            return Ok(false);
        };
        if argument.len() < 2 || !argument.starts_with('-') {
            return Ok(false);
        }
        let name = match argument.strip_prefix("--") {
            Some("") => {
                arguments.pop_front();
                return Ok(false);
            }
            Some(name) => name,
            None => &argument[1..],
        };
        if name.starts_with('-') || name.starts_with('=') {
            return Err(Error::BadSyntax(argument.clone()));
        }
        let (name, inline) = match name.split_once('=') {
            Some((name, value)) => (name.to_owned(), Some(value.to_owned())),
            None => (name.to_owned(), None),
        };
        arguments.pop_front();

        let Some(flag) = self.flags.get_mut(&name) else {
            if name == "help" || name == "h" {
                return Err(Error::Help);
            }
            return Err(self.unknown(&name));
        };
        let raw = match (inline, flag.value.is_bool()) {
            (Some(raw), _) => raw,
            (None, true) => "true".to_owned(),
            (None, false) => arguments
                .pop_front()
                .ok_or_else(|| Error::MissingValue(name.clone()))?,
        };
        trace!(flag = %name, value = %raw, "setting flag");
        flag.value.set(&raw).map_err(|error| Error::InvalidValue {
            flag: name.clone(),
            source: Box::new(error),
        })?;
        self.actual.insert(name);
        Ok(true)
    }

    fn unknown(&self, name: &str) -> Error {
        let suggestions = Spell::new().suggest(
            name,
            self.flags.keys().map(String::as_str),
            (name.chars().count() / 3 + 2).min(4),
        );
        Error::UnknownFlag {
            name: name.to_owned(),
            suggestions,
        }
    }

    /// Reports `error` and the usage on the set's output.
    fn report(&mut self, error: &Error) -> io::Result<()> {
        if !matches!(error, Error::Help) {
            let message = format!("{}: {error}", self.name);
            match &mut self.output {
                Some(output) => writeln!(output, "{message}")?,
                None => writeln!(io::stderr(), "{message}")?,
            }
        }
        self.print_usage()
    }

    fn fail(&mut self, error: Error) -> Result<(), Error> {
        if let Err(cause) = self.report(&error) {
            warn!(set = %self.name, %cause, "failed to report parse error");
        }
        match self.handling {
            ErrorHandling::Continue => {
                warn!(set = %self.name, %error, "failed to parse flags");
                Err(error)
            }
            ErrorHandling::Exit => process::exit(if matches!(error, Error::Help) { 0 } else { 2 }),
            ErrorHandling::Panic => panic!("{error}"),
        }
    }
}
