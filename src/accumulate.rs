use crate::{
    codec::{self, FlagType},
    error::Error,
    set::Value,
    var::Var,
};

/// A flag value that appends every occurrence instead of overwriting.
///
/// Order follows the order the parser applies occurrences in; nothing is
/// deduplicated and the list is never cleared between parses.
pub struct Accumulate<T> {
    target: Option<Var<Vec<T>>>,
}

impl<T> Accumulate<T> {
    pub fn new(target: Var<Vec<T>>) -> Self {
        Self {
            target: Some(target),
        }
    }

    /// A sink with no list attached; it renders as `[]`.
    pub const fn unbound() -> Self {
        Self { target: None }
    }
}

impl<T: FlagType> Value for Accumulate<T> {
    fn set(&mut self, raw: &str) -> Result<(), Error> {
        let value = codec::parse::<T>(raw)?;
        let target = self.target.get_or_insert_with(Var::default);
        target.borrow_mut().push(value);
        Ok(())
    }

    fn render(&self) -> String {
        let Some(target) = &self.target else {
            return "[]".to_owned();
        };
        let mut buffer = String::from("[");
        for (index, item) in target.borrow().iter().enumerate() {
            if index > 0 {
                buffer.push(' ');
            }
            buffer.push_str(&codec::render(item));
        }
        buffer.push(']');
        buffer
    }
}
