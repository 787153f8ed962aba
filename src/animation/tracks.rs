use thiserror::Error;

use crate::animation::values::Interpolatable;

const MAX_SCAN_OFFSET: usize = 3;

/// A single `(time, value)` sample. Time is in clip ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub const fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Reasons a keyframe sequence is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("track has no keyframes")]
    Empty,
    #[error("{times} times but {values} values")]
    LengthMismatch { times: usize, values: usize },
    #[error("keyframe {index} has a non-finite time")]
    NonFiniteTime { index: usize },
    #[error("keyframe {index} is earlier than its predecessor")]
    Decreasing { index: usize },
    #[error("keyframe {index} has an unusable value")]
    InvalidValue { index: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Time-ordered samples of one animated property.
///
/// Times are strictly increasing and there is always at least one sample.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Builds a track from parallel time/value arrays.
    ///
    /// A sample whose time equals its predecessor's is dropped, so the first
    /// of several coincident samples wins. Values go through
    /// [`Interpolatable::prepare`]; rotations are stored normalized.
    pub fn new(times: Vec<f32>, values: Vec<T>) -> Result<Self, TrackError> {
        if times.len() != values.len() {
            return Err(TrackError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        if times.is_empty() {
            return Err(TrackError::Empty);
        }

        let total = times.len();
        let mut kept_times = Vec::with_capacity(total);
        let mut kept_values = Vec::with_capacity(values.len());

        for (index, (time, value)) in times.into_iter().zip(values).enumerate() {
            if !time.is_finite() {
                return Err(TrackError::NonFiniteTime { index });
            }
            match kept_times.last() {
                Some(&prev) if time < prev => return Err(TrackError::Decreasing { index }),
                Some(&prev) if time == prev => continue,
                _ => {}
            }
            let value = value.prepare().ok_or(TrackError::InvalidValue { index })?;
            kept_times.push(time);
            kept_values.push(value);
        }

        let dropped = total - kept_times.len();
        if dropped > 0 {
            log::warn!("Dropped {dropped} keyframe(s) sharing a time with the previous keyframe");
        }

        Ok(Self {
            times: kept_times,
            values: kept_values,
        })
    }

    pub fn from_keyframes(keys: impl IntoIterator<Item = Keyframe<T>>) -> Result<Self, TrackError> {
        let (times, values) = keys.into_iter().map(|k| (k.time, k.value)).unzip();
        Self::new(times, values)
    }

    /// A track holding a single constant value.
    pub fn constant(value: T) -> Result<Self, TrackError> {
        Self::new(vec![0.0], vec![value])
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[must_use]
    pub fn keyframe(&self, index: usize) -> Option<Keyframe<T>> {
        Some(Keyframe::new(*self.times.get(index)?, *self.values.get(index)?))
    }

    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Indices of the samples surrounding `time`.
    ///
    /// Returns the last sample whose time is `<= time` and the one after it.
    /// The bracket collapses onto a single sample in three cases:
    /// - `time` is before the first sample: `(0, 0)`
    /// - the track has one sample: `(0, 0)`
    /// - `time` is at or after the last sample: `(last, last)`
    #[must_use]
    pub fn bracket(&self, time: f32) -> (usize, usize) {
        let len = self.times.len();
        // partition_point finds the first index where t > time, i.e. next_index
        let next = self.times.partition_point(|&t| t <= time);

        if next == 0 {
            (0, 0)
        } else if next >= len {
            (len - 1, len - 1)
        } else {
            (next - 1, next)
        }
    }

    /// Same result as [`bracket`](Self::bracket), starting the search at the
    /// cursor. Sequential playback finds the interval in O(1); larger jumps
    /// fall back to binary search. The cursor is updated to the new interval.
    pub fn bracket_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> (usize, usize) {
        let len = self.times.len();
        if len == 1 {
            return (0, 0);
        }

        // Cursor may be stale if it last served a longer track
        let i = cursor.last_index.min(len - 1);

        let found = if time >= self.times[i] {
            // Forward: time >= times[idx] holds on entry to every iteration
            let mut res = None;
            for idx in i..=(i + MAX_SCAN_OFFSET) {
                if idx >= len - 1 {
                    res = Some((len - 1, len - 1));
                    break;
                }
                if time < self.times[idx + 1] {
                    res = Some((idx, idx + 1));
                    break;
                }
            }
            res
        } else {
            // Backward: time < times[i]
            let mut res = None;
            for offset in 1..=MAX_SCAN_OFFSET {
                if i < offset {
                    break;
                }
                let idx = i - offset;
                if time >= self.times[idx] {
                    res = Some((idx, idx + 1));
                    break;
                }
            }
            res
        };

        let bracket = found.unwrap_or_else(|| self.bracket(time));
        cursor.last_index = bracket.0;
        bracket
    }

    /// Blend fraction of `time` between samples `prev` and `next`, clamped to `[0, 1]`.
    ///
    /// Returns `None` when the two samples share a time (including
    /// `prev == next`) or an index is out of range.
    #[must_use]
    pub fn blend_factor(&self, prev: usize, next: usize, time: f32) -> Option<f32> {
        let t0 = *self.times.get(prev)?;
        let t1 = *self.times.get(next)?;
        let dt = t1 - t0;
        if dt <= 0.0 {
            return None;
        }
        Some(((time - t0) / dt).clamp(0.0, 1.0))
    }

    /// Samples with [`Interpolatable::interpolate_linear`]; rotations are
    /// always renormalized.
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        self.sample_by(time, None, T::interpolate_linear)
    }

    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        self.sample_by(time, Some(cursor), T::interpolate_linear)
    }

    /// Samples the track with a caller-chosen blend function.
    pub fn sample_by<F>(&self, time: f32, cursor: Option<&mut KeyframeCursor>, blend: F) -> T
    where
        F: FnOnce(&T, &T, f32) -> T,
    {
        let (prev, next) = match cursor {
            Some(cursor) => self.bracket_with_cursor(time, cursor),
            None => self.bracket(time),
        };

        if prev == next {
            return self.values[prev];
        }

        match self.blend_factor(prev, next, time) {
            Some(factor) => blend(&self.values[prev], &self.values[next], factor),
            None => self.values[prev],
        }
    }
}
