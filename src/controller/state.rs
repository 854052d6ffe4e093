//! Observable controller state

use crate::resource::{ItemId, Resource};

/// The `items` / `loading` / `error` triple behind one view
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState<R> {
    /// Items in display order (server order after a load, newest adds first)
    pub items: Vec<R>,
    pub loading: bool,
    /// User-visible error banner
    pub error: Option<String>,
}

impl<R> Default for ControllerState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

impl<R: Resource> ControllerState<R> {
    pub fn find(&self, id: ItemId) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Drop every item carrying `id`; returns how many went
    pub fn remove(&mut self, id: ItemId) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        before - self.items.len()
    }

    /// Replace every item carrying `id` with `replacement`, in place
    pub fn replace(&mut self, id: ItemId, replacement: &R) -> usize {
        let mut replaced = 0;
        for item in self.items.iter_mut().filter(|item| item.id() == id) {
            *item = replacement.clone();
            replaced += 1;
        }
        replaced
    }

    /// Re-key every item carrying `from` to `to`, leaving fields and order alone
    pub fn rekey(&mut self, from: ItemId, to: ItemId) -> usize {
        let mut rekeyed = 0;
        for item in self.items.iter_mut().filter(|item| item.id() == from) {
            item.set_id(to);
            rekeyed += 1;
        }
        rekeyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Post;

    fn post(id: u64, title: &str) -> Post {
        Post {
            id: ItemId::from_raw(id),
            title: title.to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut state = ControllerState {
            items: vec![post(1, "a"), post(2, "b"), post(3, "c")],
            ..Default::default()
        };
        assert_eq!(state.replace(ItemId::Remote(2), &post(2, "B")), 1);
        assert_eq!(state.position(ItemId::Remote(2)), Some(1));
        assert_eq!(state.find(ItemId::Remote(2)).unwrap().title, "B");
    }

    #[test]
    fn test_rekey_and_remove() {
        let mut state = ControllerState {
            items: vec![post(1_700_000_000_000, "new"), post(1, "a")],
            ..Default::default()
        };
        assert_eq!(
            state.rekey(ItemId::Local(1_700_000_000_000), ItemId::Local(151)),
            1
        );
        assert_eq!(state.items[0].id, ItemId::Local(151));
        assert_eq!(state.items[0].title, "new");

        assert_eq!(state.remove(ItemId::Local(151)), 1);
        assert_eq!(state.remove(ItemId::Local(151)), 0);
        assert_eq!(state.items.len(), 1);
    }
}
