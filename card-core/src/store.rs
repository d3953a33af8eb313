//! Z-ordered element stack with a single selection.
//!
//! Index order is z-order: index 0 is drawn first, the last element is
//! topmost. Every mutation keeps the selection either `None` or a valid
//! index and then notifies subscribed listeners.

use crate::element::Element;

/// A structural or selection change to an [`ElementStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    /// An element was appended at this index.
    Added(usize),
    /// The element at this index was removed.
    Removed(usize),
    /// An element moved between two indices.
    Moved {
        /// Index before the move.
        from: usize,
        /// Index after the move.
        to: usize,
    },
    /// The element at this index was modified in place.
    Updated(usize),
    /// The selection changed.
    Selected(Option<usize>),
    /// The whole stack was replaced or cleared.
    Reset,
}

/// Handle returned by [`ElementStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&StoreChange) + Send>;

/// The ordered elements of one document plus the selection index.
#[derive(Default)]
pub struct ElementStore {
    elements: Vec<Element>,
    selection: Option<usize>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl std::fmt::Debug for ElementStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementStore")
            .field("elements", &self.elements)
            .field("selection", &self.selection)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `elements`, bottom to top, with no selection.
    #[must_use]
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            elements,
            ..Self::default()
        }
    }

    /// Append an element as the new topmost one and return its index.
    pub fn add(&mut self, element: Element) -> usize {
        self.elements.push(element);
        let index = self.elements.len() - 1;
        self.notify(StoreChange::Added(index));
        index
    }

    /// Remove the element at `index`.
    ///
    /// Returns `false` when `index` is out of range. A selection on the
    /// removed element is cleared; a selection above it shifts down by one.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.elements.len() {
            return false;
        }

        self.elements.remove(index);
        match self.selection {
            Some(selected) if selected == index => self.selection = None,
            Some(selected) if selected > index => self.selection = Some(selected - 1),
            _ => {}
        }
        self.notify(StoreChange::Removed(index));
        true
    }

    /// Move the element at `from` so it ends up at `to`.
    ///
    /// Returns `false` when either index is out of range. A selection on
    /// `from` follows to `to`; a selection on `to` is swapped to `from`.
    pub fn move_element(&mut self, from: usize, to: usize) -> bool {
        let len = self.elements.len();
        if from >= len || to >= len {
            return false;
        }

        let element = self.elements.remove(from);
        self.elements.insert(to, element);
        if self.selection == Some(from) {
            self.selection = Some(to);
        } else if self.selection == Some(to) {
            self.selection = Some(from);
        }
        self.notify(StoreChange::Moved { from, to });
        true
    }

    /// Move the element at `index` to the top of the stack.
    ///
    /// The selection keeps pointing at the same element it did before.
    pub fn bring_to_front(&mut self, index: usize) -> bool {
        let len = self.elements.len();
        if index >= len {
            return false;
        }

        let top = len - 1;
        let element = self.elements.remove(index);
        self.elements.push(element);
        match self.selection {
            Some(selected) if selected == index => self.selection = Some(top),
            Some(selected) if selected > index => self.selection = Some(selected - 1),
            _ => {}
        }
        self.notify(StoreChange::Moved { from: index, to: top });
        true
    }

    /// Select an element, or clear the selection with `None`.
    ///
    /// Returns `false` (and leaves the selection alone) for an
    /// out-of-range index.
    pub fn select(&mut self, index: Option<usize>) -> bool {
        if let Some(i) = index {
            if i >= self.elements.len() {
                return false;
            }
        }

        self.selection = index;
        self.notify(StoreChange::Selected(index));
        true
    }

    /// Index of the selected element.
    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// The selected element.
    #[must_use]
    pub fn selected(&self) -> Option<&Element> {
        self.selection.and_then(|i| self.elements.get(i))
    }

    /// Element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Modify the element at `index` in place.
    ///
    /// Returns `false` when `index` is out of range.
    pub fn update<F>(&mut self, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut Element),
    {
        let Some(element) = self.elements.get_mut(index) else {
            return false;
        };
        f(element);
        self.notify(StoreChange::Updated(index));
        true
    }

    /// Modify every element in place without notifying per element.
    pub(crate) fn update_all<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Element),
    {
        self.elements.iter_mut().for_each(&mut f);
    }

    /// Elements bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Elements bottom to top as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Element] {
        &self.elements
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Replace every element and clear the selection.
    pub fn replace_all(&mut self, elements: Vec<Element>) {
        self.elements = elements;
        self.selection = None;
        self.notify(StoreChange::Reset);
    }

    /// Remove every element and clear the selection.
    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    /// Register a listener called after every change.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&StoreChange) + Send + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, change: StoreChange) {
        tracing::trace!(?change, "element store changed");
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }
}
