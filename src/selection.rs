//! Ordered set of selectable shapes with exactly one active member.

/// Scene membership operations needed to swap the visible shape.
pub(crate) trait SceneMembership<T> {
    fn add(&mut self, object: T);
    fn remove(&mut self, object: T);
}

/// Fixed, non-empty list of objects cycled in order.
#[derive(Debug, Clone)]
pub(crate) struct SelectionRegistry<T> {
    objects: Vec<T>,
    active: usize,
}

impl<T: Copy> SelectionRegistry<T> {
    /// Put the initially active object into the scene.
    pub(crate) fn activate_initial(&self, scene: &mut impl SceneMembership<T>) {
        scene.add(self.active());
    }

    /// Swap the active object for the next one, wrapping at the end.
    pub(crate) fn advance(&mut self, scene: &mut impl SceneMembership<T>) -> T {
        scene.remove(self.active());
        self.active = (self.active + 1) % self.objects.len();
        let next = self.active();
        scene.add(next);
        next
    }

    pub(crate) fn active(&self) -> T {
        self.objects[self.active]
    }

    #[cfg(test)]
    pub(crate) fn active_index(&self) -> usize {
        self.active
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.objects.len()
    }
}

/// The first object starts active; empty arrays are rejected at compile time.
impl<T: Copy, const N: usize> From<[T; N]> for SelectionRegistry<T> {
    fn from(objects: [T; N]) -> Self {
        const { assert!(N > 0, "a selection registry needs at least one object") };
        Self {
            objects: objects.to_vec(),
            active: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Change {
        Add(char),
        Remove(char),
    }

    #[derive(Default)]
    struct RecordingScene {
        changes: Vec<Change>,
    }

    impl SceneMembership<char> for RecordingScene {
        fn add(&mut self, object: char) {
            self.changes.push(Change::Add(object));
        }

        fn remove(&mut self, object: char) {
            self.changes.push(Change::Remove(object));
        }
    }

    #[test]
    fn registry_from_array_starts_at_first_object() {
        let registry = SelectionRegistry::from(['x', 'y']);
        assert_eq!(registry.active(), 'x');
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn advance_wraps_after_last_object() {
        let mut registry = SelectionRegistry::from(['a', 'b', 'c']);
        let mut scene = RecordingScene::default();

        registry.advance(&mut scene);
        registry.advance(&mut scene);
        assert_eq!(registry.active_index(), 2);
        assert_eq!(registry.active(), 'c');

        registry.advance(&mut scene);
        assert_eq!(registry.active_index(), 0);
        assert_eq!(registry.active(), 'a');
    }

    #[test]
    fn each_advance_removes_then_adds_once() {
        let mut registry = SelectionRegistry::from(['a', 'b', 'c']);
        let mut scene = RecordingScene::default();
        registry.activate_initial(&mut scene);

        registry.advance(&mut scene);
        registry.advance(&mut scene);
        registry.advance(&mut scene);

        assert_eq!(
            scene.changes,
            vec![
                Change::Add('a'),
                Change::Remove('a'),
                Change::Add('b'),
                Change::Remove('b'),
                Change::Add('c'),
                Change::Remove('c'),
                Change::Add('a'),
            ]
        );
    }

    #[test]
    fn active_index_is_call_count_modulo_len() {
        let mut registry = SelectionRegistry::from([0u8, 1, 2, 3, 4, 5, 6]);
        let mut scene = NullScene;

        for n in 1..=30 {
            let activated = registry.advance(&mut scene);
            assert_eq!(registry.active_index(), n % registry.len());
            assert_eq!(activated as usize, n % 7);
        }
    }

    struct NullScene;

    impl SceneMembership<u8> for NullScene {
        fn add(&mut self, _object: u8) {}
        fn remove(&mut self, _object: u8) {}
    }
}
