//! Lexicographic permutation enumeration.

/// Iterator over every ordering of `0..n` in lexicographic order.
///
/// Yields `n!` permutations; for `n == 0` it yields the single empty
/// ordering.
///
/// # Examples
/// ```
/// use waymark_planner::Permutations;
///
/// let orders: Vec<Vec<usize>> = Permutations::new(3).collect();
/// assert_eq!(orders.len(), 6);
/// assert_eq!(orders.first(), Some(&vec![0, 1, 2]));
/// assert_eq!(orders.last(), Some(&vec![2, 1, 0]));
/// ```
#[derive(Debug, Clone)]
pub struct Permutations {
    next: Option<Vec<usize>>,
}

impl Permutations {
    /// Enumerate the orderings of `0..n`.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            next: Some((0..n).collect()),
        }
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let mut successor = current.clone();
        if advance(&mut successor) {
            self.next = Some(successor);
        }
        Some(current)
    }
}

/// Rearrange `order` into its lexicographic successor.
///
/// Returns `false` when `order` is already the last permutation.
fn advance(order: &mut [usize]) -> bool {
    // Rightmost ascent: the last `pivot` with order[pivot] < order[pivot + 1].
    let Some(pivot) = order
        .windows(2)
        .rposition(|pair| matches!(pair, [left, right] if left < right))
    else {
        return false;
    };
    let Some(&pivot_value) = order.get(pivot) else {
        return false;
    };
    let Some(swap_offset) = order
        .iter()
        .skip(pivot.saturating_add(1))
        .rposition(|value| *value > pivot_value)
    else {
        return false;
    };
    order.swap(pivot, pivot.saturating_add(1).saturating_add(swap_offset));
    if let Some(tail) = order.get_mut(pivot.saturating_add(1)..) {
        tail.reverse();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(2, 2)]
    #[case(3, 6)]
    #[case(4, 24)]
    fn yields_factorial_count(#[case] n: usize, #[case] expected: usize) {
        assert_eq!(Permutations::new(n).count(), expected);
    }

    #[rstest]
    fn three_items_in_lexicographic_order() {
        let orders: Vec<Vec<usize>> = Permutations::new(3).collect();
        assert_eq!(
            orders,
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0],
            ]
        );
    }

    #[rstest]
    fn orders_are_distinct() {
        let mut orders: Vec<Vec<usize>> = Permutations::new(4).collect();
        let total = orders.len();
        orders.sort();
        orders.dedup();
        assert_eq!(orders.len(), total);
    }
}
