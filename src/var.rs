use core::{
    cell::{Ref, RefCell, RefMut},
    fmt,
};
use std::rc::Rc;

/// Storage a flag writes into when the flag-set parses.
///
/// Clones share the same slot, so the long and short forms of a flag and the
/// caller all observe one value. Single-threaded by construction.
pub struct Var<T>(Rc<RefCell<T>>);

impl<T> Var<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }

    pub fn with<R>(&self, with: impl FnOnce(&mut T) -> R) -> R {
        with(&mut self.0.borrow_mut())
    }
}

impl<T: Clone> Var<T> {
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T: Default> Var<T> {
    pub fn take(&self) -> T {
        self.0.take()
    }
}

impl<T> Clone for Var<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for Var<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Var<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Var").field(&*self.0.borrow()).finish()
    }
}

impl<T: PartialEq> PartialEq<T> for Var<T> {
    fn eq(&self, other: &T) -> bool {
        *self.0.borrow() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_storage() {
        let left = Var::new(1);
        let right = left.clone();
        right.set(2);
        assert_eq!(left.get(), 2);
        assert_eq!(left.replace(3), 2);
        assert!(right == 3);
    }
}
