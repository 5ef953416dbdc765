mod accumulate;
mod build;
pub mod codec;
mod error;
mod help;
mod set;
mod spell;
pub mod style;
mod var;

pub use crate::{
    accumulate::Accumulate,
    build::{Builder, Descriptor},
    codec::{FlagType, Kind, Scalar},
    error::Error,
    help::WIDTH,
    set::{command_line, parse, ErrorHandling, Flag, FlagSet, Usage, Value},
    var::Var,
};
