// netdetective/src/engine/ranking.rs
//
// Bounded, stable, descending top-K list shared by the spike and gap finders.
//
// A candidate is inserted in front of the first entry it strictly outranks.
// Ties never displace an existing entry, so earlier candidates win ties and
// the output is a pure function of insertion order.

use std::cmp::Ordering;

pub struct BoundedRanking<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    capacity: usize,
    items:    Vec<T>,
    /// `Greater` means the first argument ranks ahead of the second.
    rank:     F,
}

impl<T, F> BoundedRanking<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    pub fn new(capacity: usize, rank: F) -> Self {
        Self { capacity, items: Vec::new(), rank }
    }

    /// Returns the position the candidate landed at, or None if it was
    /// rejected (or pushed straight out by truncation).
    pub fn insert(&mut self, candidate: T) -> Option<usize> {
        if self.capacity == 0 { return None; }

        let pos = self.items.iter()
            .position(|existing| (self.rank)(&candidate, existing) == Ordering::Greater);

        let landed = match pos {
            Some(p) => {
                self.items.insert(p, candidate);
                Some(p)
            }
            None if self.items.len() < self.capacity => {
                self.items.push(candidate);
                Some(self.items.len() - 1)
            }
            None => None,
        };

        self.items.truncate(self.capacity);
        landed.filter(|&p| p < self.capacity)
    }

    pub fn len(&self) -> usize { self.items.len() }
    pub fn into_vec(self) -> Vec<T> { self.items }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_first(a: &(u32, char), b: &(u32, char)) -> Ordering {
        a.0.cmp(&b.0)
    }

    #[test]
    fn test_descending_order() {
        let mut r = BoundedRanking::new(10, by_first);
        for (i, v) in [3, 9, 1, 7].into_iter().enumerate() {
            r.insert((v, (b'a' + i as u8) as char));
        }
        let vals: Vec<u32> = r.into_vec().into_iter().map(|x| x.0).collect();
        assert_eq!(vals, vec![9, 7, 3, 1]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut r = BoundedRanking::new(10, by_first);
        r.insert((5, 'a'));
        r.insert((5, 'b'));
        r.insert((6, 'c'));
        r.insert((5, 'd'));
        let tags: String = r.into_vec().into_iter().map(|x| x.1).collect();
        assert_eq!(tags, "cabd");
    }

    #[test]
    fn test_truncates_to_capacity() {
        let mut r = BoundedRanking::new(3, by_first);
        for v in 0..20u32 {
            r.insert((v, 'x'));
        }
        let vals: Vec<u32> = r.into_vec().into_iter().map(|x| x.0).collect();
        assert_eq!(vals, vec![19, 18, 17]);
    }

    #[test]
    fn test_full_list_rejects_non_improving_candidate() {
        let mut r = BoundedRanking::new(2, by_first);
        assert_eq!(r.insert((5, 'a')), Some(0));
        assert_eq!(r.insert((4, 'b')), Some(1));
        assert_eq!(r.insert((4, 'c')), None);
        assert_eq!(r.insert((1, 'd')), None);
        assert_eq!(r.insert((6, 'e')), Some(0));
        let tags: String = r.into_vec().into_iter().map(|x| x.1).collect();
        assert_eq!(tags, "ea");
    }

    #[test]
    fn test_unbounded_capacity_does_not_preallocate() {
        let mut r = BoundedRanking::new(usize::MAX, by_first);
        assert_eq!(r.insert((1, 'a')), Some(0));
        assert_eq!(r.insert((2, 'b')), Some(0));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_tie_break_comparator() {
        // Primary descending, secondary descending.
        let mut r = BoundedRanking::new(10, |a: &(u32, u32), b: &(u32, u32)| {
            a.0.cmp(&b.0).then(a.1.cmp(&b.1))
        });
        r.insert((1, 5));
        r.insert((1, 9));
        r.insert((2, 0));
        assert_eq!(r.into_vec(), vec![(2, 0), (1, 9), (1, 5)]);
    }
}
