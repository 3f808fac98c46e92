use crate::error::{AqError, Result};
use std::collections::VecDeque;

/// Trailing moving average over a series with absent values.
///
/// Yields exactly one output per input. The first `window - 1` outputs are
/// absent; afterwards each output is the mean of the present values among the
/// last `window` inputs, or absent if none of them is present.
#[derive(Debug, Clone)]
pub struct RollingMean<I> {
    inner: I,
    window: usize,
    buffer: VecDeque<Option<f64>>,
}

impl<I> RollingMean<I>
where
    I: Iterator<Item = Option<f64>>,
{
    fn new(inner: I, window: usize) -> Self {
        // The window may be far longer than the series
        let capacity = window.min(inner.size_hint().0);
        Self {
            inner,
            window,
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    fn window_mean(&self) -> Option<f64> {
        let (sum, count) = self
            .buffer
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

        (count > 0).then(|| sum / count as f64)
    }
}

impl<I> Iterator for RollingMean<I>
where
    I: Iterator<Item = Option<f64>>,
{
    type Item = Option<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.inner.next()?;

        if self.buffer.len() == self.window {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);

        if self.buffer.len() < self.window {
            Some(None)
        } else {
            Some(self.window_mean())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Lazily smooth `series` with a trailing window of `window` values
pub fn rolling_mean<S>(series: S, window: usize) -> Result<RollingMean<S::IntoIter>>
where
    S: IntoIterator<Item = Option<f64>>,
{
    if window == 0 {
        return Err(AqError::insufficient("rolling mean window", 1, 0));
    }

    Ok(RollingMean::new(series.into_iter(), window))
}
