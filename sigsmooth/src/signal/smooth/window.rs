use num_traits::Float;

/// Inclusive index range of the `k` nearest neighbours of the current point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Window {
    pub(crate) left: usize,
    pub(crate) right: usize,
}

impl Window {
    /// Leftmost window of `size` points over `n` sorted samples.
    pub(crate) fn first(size: usize, n: usize) -> Self {
        Self {
            left: 0,
            right: size.min(n).saturating_sub(1),
        }
    }

    /// Slide right while the next point to the right is strictly closer to `x[current]`
    /// than the leftmost point. `x` must be sorted and `current` visited in order.
    pub(crate) fn recenter<F: Float>(&mut self, x: &[F], current: usize) {
        let n = x.len();
        let at = x[current];
        while self.right + 1 < n {
            let d_left = at - x[self.left];
            let d_right = x[self.right + 1] - at;
            if d_left <= d_right {
                break;
            }
            self.left += 1;
            self.right += 1;
        }
    }

    /// Distance from `x[current]` to the farthest point in the window.
    pub(crate) fn radius<F: Float>(&self, x: &[F], current: usize) -> F {
        let at = x[current];
        (at - x[self.left]).max(x[self.right] - at)
    }
}
