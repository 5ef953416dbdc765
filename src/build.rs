use crate::{
    accumulate::Accumulate,
    codec::FlagType,
    error::Error,
    help::{self, Entry},
    set::{command_line, FlagSet},
    style::{Plain, Style},
    var::Var,
};
use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
};
use tracing::debug;

/// Declares flags on a [`FlagSet`] one at a time and renders their usage.
///
/// Every factory call returns a [`Descriptor`] that must be finished with
/// one of its binding calls before the next flag is declared:
///
/// ```
/// use flagchain::{Builder, ErrorHandling, FlagSet};
///
/// let set = FlagSet::shared("greet", ErrorHandling::Continue);
/// let mut builder = Builder::with_set(set);
/// let name = builder.string_flag("name", "Who to greet").alias('n').default("world".into()).build_var();
/// let loud = builder.bool_flag("loud", "Shout").build_var();
/// builder.parse(["-n", "boba", "--loud"]).unwrap();
/// assert_eq!(name.get(), "boba");
/// assert!(loud.get());
/// ```
pub struct Builder {
    set: Rc<RefCell<FlagSet>>,
    built: Rc<RefCell<Vec<Entry>>>,
    pending: Option<String>,
    output: Option<Box<dyn Write>>,
    style: Rc<dyn Style>,
}

/// Configuration of one flag, awaiting a binding call.
#[must_use = "a flag is only registered by `build`, `build_var` or `build_slice`"]
pub struct Descriptor<'a, T> {
    builder: &'a mut Builder,
    name: String,
    usage: String,
    alias: Option<char>,
    default: T,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! factory {
    ($($method: ident: $type: ty),* $(,)?) => {
        $(
            #[track_caller]
            pub fn $method(&mut self, name: &str, usage: &str) -> Descriptor<'_, $type> {
                self.flag(name, usage)
            }
        )*
    };
}

impl Builder {
    /// A builder on the program's default flag-set.
    pub fn new() -> Self {
        Self::with_set(command_line())
    }

    /// A builder on `set`, whose parse failures then print this builder's usage.
    pub fn with_set(set: Rc<RefCell<FlagSet>>) -> Self {
        let builder = Self {
            set,
            built: Rc::default(),
            pending: None,
            output: None,
            style: Rc::new(Plain),
        };
        builder.install_usage();
        builder
    }

    pub fn flag_set(&self) -> &Rc<RefCell<FlagSet>> {
        &self.set
    }

    /// Parses `arguments` with the underlying flag-set.
    pub fn parse<A: Into<String>>(
        &self,
        arguments: impl IntoIterator<Item = A>,
    ) -> Result<(), Error> {
        self.set.borrow_mut().parse(arguments)
    }

    /// Whether a declared flag still waits for its binding call.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Where [`Builder::print_usage`] writes. Defaults to standard error.
    pub fn set_output(&mut self, output: impl Write + 'static) {
        self.output = Some(Box::new(output));
    }

    pub fn set_style(&mut self, style: impl Style + 'static) {
        self.style = Rc::new(style);
        self.install_usage();
    }

    fn install_usage(&self) {
        let (built, style) = (self.built.clone(), self.style.clone());
        self.set.borrow_mut().set_usage(move |_, output| {
            output.write_all(help::usage(built.borrow().iter(), &*style).as_bytes())
        });
    }

    /// Starts declaring a flag of type `T`.
    ///
    /// # Panics
    ///
    /// With [`Error::UnbuiltFlag`] if the previous descriptor was dropped
    /// without a binding call.
    #[track_caller]
    pub fn flag<T: FlagType>(&mut self, name: &str, usage: &str) -> Descriptor<'_, T> {
        if let Some(previous) = &self.pending {
            fatal(Error::UnbuiltFlag(previous.clone()));
        }
        self.pending = Some(name.to_owned());
        Descriptor {
            builder: self,
            name: name.to_owned(),
            usage: usage.to_owned(),
            alias: None,
            default: T::default(),
        }
    }

    factory!(
        bool_flag: bool,
        string_flag: String,
        int_flag: i32,
        int64_flag: i64,
        float64_flag: f64,
        uint_flag: usize,
        uint64_flag: u64,
    );

    /// Usage of every bound flag, in binding order.
    pub fn usage(&self) -> String {
        help::usage(self.built.borrow().iter(), &*self.style)
    }

    pub fn write_usage(&self, mut output: impl Write) -> io::Result<()> {
        output.write_all(self.usage().as_bytes())
    }

    pub fn print_usage(&mut self) -> io::Result<()> {
        let usage = self.usage();
        match &mut self.output {
            Some(output) => output.write_all(usage.as_bytes()),
            None => io::stderr().write_all(usage.as_bytes()),
        }
    }

    #[track_caller]
    fn register(
        &mut self,
        entry: Entry,
        register: impl Fn(&mut FlagSet, &str, &str) -> Result<(), Error>,
    ) {
        {
            let mut set = self.set.borrow_mut();
            if let Err(error) = register(&mut *set, &entry.name, &entry.usage) {
                drop(set);
                fatal(error);
            }
            if let Some(alias) = entry.alias {
                if let Err(error) = register(&mut *set, alias.encode_utf8(&mut [0; 4]), "") {
                    drop(set);
                    fatal(error);
                }
            }
        }
        debug!(flag = %entry.name, alias = ?entry.alias, kind = %entry.kind(), "built flag");
        self.pending = None;
        self.built.borrow_mut().push(entry);
    }
}

impl<T: FlagType> Descriptor<'_, T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn alias_char(&self) -> Option<char> {
        self.alias
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Adds a single-character short form. `'\0'` means no short form.
    pub fn alias(mut self, alias: char) -> Self {
        self.alias = (alias != '\0').then_some(alias);
        self
    }

    /// Value the target holds when the flag is absent. Ignored by [`Descriptor::build_slice`].
    pub fn default(mut self, default: T) -> Self {
        self.default = default;
        self
    }

    /// The usage block this flag contributes to [`Builder::usage`].
    pub fn usage_line(&self) -> String {
        help::line(&self.entry(), &*self.builder.style)
    }

    /// Registers the flag, and its alias, writing into `target`.
    ///
    /// # Panics
    ///
    /// With [`Error::FlagRedefined`] if the name or alias is already registered.
    #[track_caller]
    pub fn build(self, target: &Var<T>) {
        let entry = self.entry();
        let default = self.default;
        self.builder.register(entry, |set, name, usage| {
            set.bind(target, name, default.clone(), usage)
        });
    }

    /// Like [`Descriptor::build`], into fresh storage.
    #[track_caller]
    pub fn build_var(self) -> Var<T> {
        let target = Var::default();
        self.build(&target);
        target
    }

    /// Registers the flag so every occurrence is appended to the returned list.
    ///
    /// The list starts empty whatever default was configured.
    #[track_caller]
    pub fn build_slice(self) -> Var<Vec<T>> {
        let target = Var::new(Vec::new());
        let entry = self.entry();
        self.builder.register(entry, |set, name, usage| {
            set.var(Accumulate::<T>::new(target.clone()), name, usage)
        });
        target
    }

    fn entry(&self) -> Entry {
        Entry {
            name: self.name.clone(),
            alias: self.alias,
            usage: self.usage.clone(),
            default: self.default.clone().into_scalar(),
        }
    }
}

#[track_caller]
fn fatal(error: Error) -> ! {
    panic!("{error}")
}
