use crate::math::Real;
use std::cmp::Ordering;

/// A value packed with a cost, ordered by cost only.
///
/// `BinaryHeap` is a max-heap: push negated costs to pop the cheapest entry first.
#[derive(Copy, Clone, Debug)]
pub struct WeightedValue<T> {
    pub value: T,
    pub cost: Real,
}

impl<T> WeightedValue<T> {
    /// Creates a new value packed with a cost value.
    #[inline]
    pub fn new(value: T, cost: Real) -> WeightedValue<T> {
        WeightedValue { value, cost }
    }
}

impl<T> PartialEq for WeightedValue<T> {
    #[inline]
    fn eq(&self, other: &WeightedValue<T>) -> bool {
        self.cost.eq(&other.cost)
    }
}

impl<T> Eq for WeightedValue<T> {}

impl<T> PartialOrd for WeightedValue<T> {
    #[inline]
    fn partial_cmp(&self, other: &WeightedValue<T>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for WeightedValue<T> {
    #[inline]
    fn cmp(&self, other: &WeightedValue<T>) -> Ordering {
        if self.cost < other.cost {
            Ordering::Less
        } else if self.cost > other.cost {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

#[cfg(test)]
mod test {
    use super::WeightedValue;
    use std::collections::BinaryHeap;

    #[test]
    fn negated_costs_pop_cheapest_first() {
        let mut heap = BinaryHeap::new();
        for (value, cost) in [(0u32, 3.0), (1, 0.5), (2, 7.0), (3, 1.5)] {
            heap.push(WeightedValue::new(value, -cost));
        }

        let order: Vec<u32> = std::iter::from_fn(|| heap.pop().map(|e| e.value)).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }
}
