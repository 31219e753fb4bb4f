/// Lazily recomputed value tagged with the generation it was computed for.
#[derive(Debug, Clone, Default)]
pub struct Cached<T> {
    tag: Option<u64>,
    value: T,
}

impl<T: Default> Cached<T> {
    /// Empty cache; the first lookup always recomputes.
    pub fn new() -> Self {
        Self {
            tag: None,
            value: T::default(),
        }
    }
}

impl<T> Cached<T> {
    /// Returns the cached value, recomputing it in place when `tag` differs
    /// from the tag it was last computed for.
    pub fn get_or_update<F>(&mut self, tag: u64, compute: F) -> &T
    where
        F: FnOnce(&mut T),
    {
        if self.tag != Some(tag) {
            compute(&mut self.value);
            self.tag = Some(tag);
        }
        &self.value
    }
}
