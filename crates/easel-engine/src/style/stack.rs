/// LIFO of saved values (coordinate transforms or styles).
///
/// Popping an empty stack is a caller bug and panics; pushes and pops must be
/// balanced, typically through a scope guard.
#[derive(Debug, Clone)]
pub struct StateStack<T> {
    name: &'static str,
    items: Vec<T>,
}

impl<T> StateStack<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, items: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// # Panics
    /// Panics if the stack is empty.
    #[inline]
    #[track_caller]
    pub fn pop(&mut self) -> T {
        match self.items.pop() {
            Some(v) => v,
            None => panic!("{} stack underflow: pop without matching push", self.name),
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_reverse_order() {
        let mut s = StateStack::new("test");
        s.push(1);
        s.push(2);
        assert_eq!(s.pop(), 2);
        assert_eq!(s.pop(), 1);
        assert!(s.is_empty());
    }

    #[test]
    #[should_panic(expected = "coordinate stack underflow")]
    fn pop_on_empty_panics() {
        let mut s: StateStack<u8> = StateStack::new("coordinate");
        s.pop();
    }
}
