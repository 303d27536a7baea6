//! Ordered list of selectable buttons.
//!
//! Every scene keeps its buttons in a `ButtonList`. The list only tracks
//! which entry is current; highlight is derived (`index == current`), and
//! activation hands the action tag back to the caller for dispatch.
//!
//! Navigation clamps at both ends. A locked list ignores movement, hover
//! and activation (used to freeze the top-level menu behind a modal).

/// One button: display label + opaque action tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionItem<A> {
    pub label: String,
    pub action: A,
}

impl<A> ActionItem<A> {
    pub fn new(label: impl Into<String>, action: A) -> Self {
        ActionItem { label: label.into(), action }
    }
}

#[derive(Clone, Debug)]
pub struct ButtonList<A> {
    items: Vec<ActionItem<A>>,
    current: usize,
    locked: bool,
}

impl<A: Copy> ButtonList<A> {
    pub fn new(items: Vec<ActionItem<A>>) -> Self {
        ButtonList { items, current: 0, locked: false }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ActionItem<A>] {
        &self.items
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_highlighted(&self, index: usize) -> bool {
        index == self.current
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Move towards index 0. Returns true if the selection changed.
    pub fn move_up(&mut self) -> bool {
        if self.locked || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Move towards the last item. Returns true if the selection changed.
    pub fn move_down(&mut self) -> bool {
        if self.locked || self.current + 1 >= self.items.len() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Point the selection at `index` (pointer hover).
    /// Returns true if the selection changed.
    pub fn hover_to(&mut self, index: usize) -> bool {
        if self.locked || index >= self.items.len() || index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    /// Action tag under the selection, or None while locked.
    pub fn activate_current(&self) -> Option<A> {
        if self.locked {
            return None;
        }
        self.items.get(self.current).map(|item| item.action)
    }

    /// Back to the first item. Does not touch the lock.
    pub fn reset(&mut self) {
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(n: usize) -> ButtonList<usize> {
        ButtonList::new((0..n).map(|i| ActionItem::new(format!("ITEM {i}"), i)).collect())
    }

    #[test]
    fn move_down_clamps_at_last_item() {
        for n in 1..6 {
            let mut l = list(n);
            for _ in 0..n - 1 {
                assert!(l.move_down());
            }
            assert_eq!(l.current_index(), n - 1);
            assert!(!l.move_down());
            assert!(!l.move_down());
            assert_eq!(l.current_index(), n - 1);
        }
    }

    #[test]
    fn move_up_clamps_at_zero() {
        let mut l = list(3);
        assert!(!l.move_up());
        assert_eq!(l.current_index(), 0);

        l.move_down();
        l.move_down();
        assert!(l.move_up());
        assert!(l.move_up());
        assert!(!l.move_up());
        assert_eq!(l.current_index(), 0);
    }

    #[test]
    fn hover_ignores_out_of_range() {
        let mut l = list(3);
        assert!(l.hover_to(2));
        assert!(!l.hover_to(3));
        assert!(!l.hover_to(usize::MAX));
        assert_eq!(l.current_index(), 2);
        // Same index is not a change
        assert!(!l.hover_to(2));
    }

    #[test]
    fn highlight_follows_current() {
        let mut l = list(3);
        l.hover_to(1);
        let lit: Vec<bool> = (0..3).map(|i| l.is_highlighted(i)).collect();
        assert_eq!(lit, vec![false, true, false]);
    }

    #[test]
    fn activate_returns_tag_without_side_effects() {
        let mut l = list(3);
        l.move_down();
        assert_eq!(l.activate_current(), Some(1));
        assert_eq!(l.activate_current(), Some(1));
        assert_eq!(l.current_index(), 1);
    }

    #[test]
    fn locked_list_is_inert() {
        let mut l = list(3);
        l.set_locked(true);
        assert!(!l.move_down());
        assert!(!l.hover_to(2));
        assert_eq!(l.activate_current(), None);
        assert_eq!(l.current_index(), 0);

        l.set_locked(false);
        assert!(l.move_down());
        assert_eq!(l.activate_current(), Some(1));
    }

    #[test]
    fn empty_list_never_selects() {
        let mut l: ButtonList<usize> = ButtonList::new(vec![]);
        assert!(l.is_empty());
        assert!(!l.move_down());
        assert!(!l.hover_to(0));
        assert_eq!(l.activate_current(), None);
    }
}
