/// Songs of one interpret waiting to be shuffled, plus a cooldown counter
///
/// The counter is set when the group supplies a pick and drops by one
/// every round; while it is above zero the group is blocked.
#[derive(Debug)]
pub(crate) struct ShuffleGroup<T> {
    name: String,
    items: Vec<T>,
    cooldown: usize,
}

impl<T> ShuffleGroup<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            items: Vec::new(),
            cooldown: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn take(&mut self, offset: usize) -> T {
        self.items.remove(offset)
    }

    pub fn is_blocked(&self) -> bool {
        self.cooldown > 0
    }

    pub fn cooldown(&self) -> usize {
        self.cooldown
    }

    pub fn block(&mut self, rounds: usize) {
        self.cooldown = rounds;
    }

    /// One emission round has passed
    pub fn pass(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_counts_down_to_zero() {
        let mut group = ShuffleGroup::<u32>::new("Artist");
        group.block(2);
        assert!(group.is_blocked());
        group.pass();
        assert_eq!(group.cooldown(), 1);
        group.pass();
        group.pass();
        assert_eq!(group.cooldown(), 0);
        assert!(!group.is_blocked());
    }

    #[test]
    fn test_take_keeps_order_of_rest() {
        let mut group = ShuffleGroup::new("Artist");
        group.push(1);
        group.push(2);
        group.push(3);
        assert_eq!(group.take(1), 2);
        assert_eq!(group.take(0), 1);
        assert_eq!(group.len(), 1);
        assert_eq!(group.name(), "Artist");
    }
}
