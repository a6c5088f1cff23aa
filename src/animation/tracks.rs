use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
}

const MAX_SCAN_OFFSET: usize = 3;

/// Last keyframe index a track was sampled at. One per (action, track).
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Keyframes for one property. `times` is sorted ascending, in seconds.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Builds a track, sorting keyframes by time. Extra times or values are dropped.
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        let mut keys: Vec<(f32, T)> = times.into_iter().zip(values).collect();
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (times, values) = keys.into_iter().unzip();
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last keyframe, or zero for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.times.is_empty() {
            return None;
        }
        let next_idx = self.times.partition_point(|&t| t <= time);
        Some(self.sample_at_frame(next_idx.saturating_sub(1), time))
    }

    /// Samples using the cursor as a starting guess; falls back to binary search on jumps.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        let len = self.times.len();
        match len {
            0 => return None,
            1 => return Some(self.values[0]),
            _ => {}
        }

        let i = cursor.last_index.min(len - 1);
        let t_curr = self.times[i];

        let found_index = if time >= t_curr {
            // forward: normal playback
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    if time >= self.times[len - 1] {
                        res = Some(len - 1);
                    }
                    break;
                }
                if time < self.times[idx + 1] {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // backward: seek or loop restart
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                if i < offset {
                    break;
                }
                let idx = i - offset;
                if time >= self.times[idx] {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        let index = found_index.unwrap_or_else(|| {
            let next_idx = self.times.partition_point(|&t| t <= time);
            next_idx.saturating_sub(1)
        });
        cursor.last_index = index;

        Some(self.sample_at_frame(index, time))
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();

        if index >= len - 1 {
            return self.values[len - 1];
        }
        if time <= self.times[0] {
            return self.values[0];
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.values[index],
            InterpolationMode::Linear => {
                T::interpolate_linear(self.values[index], self.values[next_idx], t)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> KeyframeTrack<f32> {
        KeyframeTrack::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0],
            InterpolationMode::Linear,
        )
    }

    #[test]
    fn cursor_matches_binary_search() {
        let track = track();
        let mut cursor = KeyframeCursor::default();
        for &t in &[0.0, 0.5, 1.5, 5.9, 0.25, 6.0, 9.0, 3.3] {
            let a = track.sample_with_cursor(t, &mut cursor).unwrap();
            let b = track.sample(t).unwrap();
            assert!((a - b).abs() < 1e-5, "t={t}: {a} vs {b}");
        }
    }

    #[test]
    fn step_holds_value() {
        let track = KeyframeTrack::new(vec![0.0, 1.0], vec![1.0_f32, 2.0], InterpolationMode::Step);
        assert_eq!(track.sample(0.99), Some(1.0));
        assert_eq!(track.sample(1.0), Some(2.0));
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let track = KeyframeTrack::new(vec![2.0, 0.0], vec![4.0_f32, 0.0], InterpolationMode::Linear);
        assert_eq!(track.times, vec![0.0, 2.0]);
        assert_eq!(track.sample(1.0), Some(2.0));
        assert_eq!(track.end_time(), 2.0);
    }
}
