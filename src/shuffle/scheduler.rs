use super::group::ShuffleGroup;
use rand::Rng;

/// Interpret-fair shuffle
///
/// Items are grouped by interpret. Each pick draws a random position over
/// all remaining items, but a group that supplied a pick within the last
/// `gap` rounds is skipped, and a group too large to be deferred any longer
/// is picked first. The gap is capped to what the largest group allows, so
/// every item is emitted even when full separation is impossible.
#[derive(Debug)]
pub struct ShuffleScheduler<T> {
    /// Groups in order of first appearance
    groups: Vec<ShuffleGroup<T>>,

    /// Gap asked for by the caller
    requested_gap: usize,

    /// Gap actually enforced
    gap: usize,

    /// Size of the largest group seen while filling
    same: usize,

    /// Items not yet emitted
    remaining: usize,
}

impl<T> ShuffleScheduler<T> {
    pub fn new(gap: usize) -> Self {
        Self {
            groups: Vec::new(),
            requested_gap: gap,
            gap: 0,
            same: 0,
            remaining: 0,
        }
    }

    pub fn push(&mut self, interpret: &str, item: T) {
        let position = match self.groups.iter().position(|g| g.name() == interpret) {
            Some(position) => position,
            None => {
                self.groups.push(ShuffleGroup::new(interpret));
                self.groups.len() - 1
            }
        };

        let group = &mut self.groups[position];
        group.push(item);
        self.remaining += 1;
        self.same = self.same.max(group.len());
        self.gap = self.requested_gap.min(self.remaining / self.same - 1);
    }

    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Gap enforced between two picks of the same interpret
    pub fn effective_gap(&self) -> usize {
        self.gap
    }

    /// Emit the next item
    pub fn next_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<T> {
        if self.remaining == 0 {
            return None;
        }

        let r = rng.gen_range(0..self.remaining);
        let mut forced = None;
        let mut windowed = None;
        let mut last_open = None;
        let mut least_blocked: Option<usize> = None;
        let mut pointer = 0;

        for (i, group) in self.groups.iter().enumerate() {
            let size = group.len();
            if group.is_blocked() {
                let better = least_blocked.map_or(true, |j| self.groups[j].cooldown() > group.cooldown());
                if better {
                    least_blocked = Some(i);
                }
            } else {
                // deferring this group again would make the gap unreachable
                if forced.is_none() && (size - 1) * self.gap + size >= self.remaining {
                    forced = Some(i);
                }
                if windowed.is_none() && (pointer..pointer + size).contains(&r) {
                    windowed = Some((i, r - pointer));
                }
                last_open = Some(i);
            }
            pointer += size;
        }

        for group in &mut self.groups {
            group.pass();
        }

        let (chosen, offset) = if let Some(i) = forced {
            (i, None)
        } else if let Some((i, offset)) = windowed {
            (i, Some(offset))
        } else if let Some(i) = last_open {
            (i, None)
        } else {
            (least_blocked?, None)
        };

        let group = &mut self.groups[chosen];
        let offset = offset.unwrap_or_else(|| rng.gen_range(0..group.len()));
        let item = group.take(offset);
        group.block(self.gap);
        if group.is_empty() {
            self.groups.remove(chosen);
        }
        self.remaining -= 1;

        Some(item)
    }

    /// Drain every item in shuffled order
    pub fn drain_with<R: Rng + ?Sized>(mut self, rng: &mut R) -> Vec<T> {
        let mut out = Vec::with_capacity(self.remaining);
        while let Some(item) = self.next_with(rng) {
            out.push(item);
        }
        out
    }

    #[cfg(test)]
    fn max_cooldown(&self) -> usize {
        self.groups.iter().map(ShuffleGroup::cooldown).max().unwrap_or(0)
    }
}
