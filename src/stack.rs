//! Scoped stack for variable-arity grammar productions
//!
//! Productions such as block-item lists or parameter lists have right-hand
//! sides of unknown length. The grammar opens a scope before the list and
//! the reducing action closes it, receiving every item pushed since, in
//! push order.
//!
//! ```text
//! open_scope  push a  push b  open_scope  push c  close_scope → [c]
//!                                                  close_scope → [a, b]
//! ```
//!
//! Items live in one flat vector; a scope is a start mark into it.

use std::fmt;

pub struct ScopedStack<T> {
    items: Vec<T>,
    marks: Vec<usize>,
}

impl<T> ScopedStack<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            marks: Vec::new(),
        }
    }

    /// Appends to the current scope.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Removes the most recently pushed item of the current scope.
    ///
    /// Returns `None` when the current scope is empty; never reaches into
    /// an enclosing scope.
    pub fn pop(&mut self) -> Option<T> {
        if self.items.len() > self.current_mark() {
            self.items.pop()
        } else {
            None
        }
    }

    pub fn peek(&self) -> Option<&T> {
        if self.items.len() > self.current_mark() {
            self.items.last()
        } else {
            None
        }
    }

    pub fn open_scope(&mut self) {
        self.marks.push(self.items.len());
    }

    /// Ends the current scope and returns its items in push order.
    ///
    /// # Panics
    ///
    /// Panics when no scope is open.
    pub fn close_scope(&mut self) -> Vec<T> {
        let mark = self
            .marks
            .pop()
            .unwrap_or_else(|| panic!("close_scope without a matching open_scope"));
        self.items.split_off(mark)
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty() && self.items.is_empty()
    }

    /// Number of items in the current scope.
    pub fn len(&self) -> usize {
        self.items.len() - self.current_mark()
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.marks.len()
    }

    fn current_mark(&self) -> usize {
        self.marks.last().copied().unwrap_or(0)
    }
}

impl<T> Default for ScopedStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ScopedStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bounds = vec![0];
        bounds.extend(self.marks.iter().copied());
        bounds.push(self.items.len());

        let mut list = f.debug_list();
        for window in bounds.windows(2) {
            list.entry(&&self.items[window[0]..window[1]]);
        }
        list.finish()
    }
}
