//! Criterion runtime presets shared by the workspace benchmarks.

use std::time::Duration;

use criterion::BenchmarkGroup;
use criterion::measurement::Measurement;

/// Sample count and timing budget applied to a benchmark group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimePreset {
    pub sample_size: usize,
    pub warm_up: Duration,
    pub measurement: Duration,
}

impl RuntimePreset {
    pub const SMALL: Self = Self::from_millis(15, 100, 200);
    pub const MEDIUM: Self = Self::from_millis(15, 500, 1_000);
    pub const LARGE: Self = Self::from_millis(10, 800, 1_500);

    const fn from_millis(sample_size: usize, warm_up_ms: u64, measurement_ms: u64) -> Self {
        Self {
            sample_size,
            warm_up: Duration::from_millis(warm_up_ms),
            measurement: Duration::from_millis(measurement_ms),
        }
    }

    /// Preset for inputs of `size` elements: small up to `4_096`, medium up to `16_384`.
    pub fn for_size(size: usize) -> Self {
        match size {
            0..=4_096 => Self::SMALL,
            4_097..=16_384 => Self::MEDIUM,
            _ => Self::LARGE,
        }
    }

    pub fn apply<M: Measurement>(self, group: &mut BenchmarkGroup<'_, M>) {
        group.sample_size(self.sample_size);
        group.warm_up_time(self.warm_up);
        group.measurement_time(self.measurement);
    }
}

pub fn apply_runtime_config_for_size<M: Measurement>(
    group: &mut BenchmarkGroup<'_, M>,
    size: usize,
) {
    RuntimePreset::for_size(size).apply(group);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_grow_with_input_size() {
        assert_eq!(RuntimePreset::for_size(1_024), RuntimePreset::SMALL);
        assert_eq!(RuntimePreset::for_size(4_096), RuntimePreset::SMALL);
        assert_eq!(RuntimePreset::for_size(4_097), RuntimePreset::MEDIUM);
        assert_eq!(RuntimePreset::for_size(16_384), RuntimePreset::MEDIUM);
        assert_eq!(RuntimePreset::for_size(65_536), RuntimePreset::LARGE);

        let presets = [RuntimePreset::SMALL, RuntimePreset::MEDIUM, RuntimePreset::LARGE];
        for pair in presets.windows(2) {
            assert!(pair[0].warm_up <= pair[1].warm_up);
            assert!(pair[0].measurement <= pair[1].measurement);
            assert!(pair[1].sample_size >= 10);
        }
    }
}
