/// Fitness spread of one population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl FitnessSummary {
    /// Summarizes `values`.
    ///
    /// Returns `None` if there are no values.
    ///
    /// ```
    /// # use gpac_training::stats::FitnessSummary;
    /// let summary = FitnessSummary::new([5.0, 1.0, 9.0, 3.0]).unwrap();
    /// assert_eq!(summary.min, 1.0);
    /// assert_eq!(summary.max, 9.0);
    /// assert_eq!(summary.mean, 4.5);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0_u32;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        (count > 0).then(|| Self {
            min,
            max,
            mean: sum / f64::from(count),
        })
    }
}

/// Progress report emitted after every generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSummary {
    pub run: u32,
    /// `0` is the initial population.
    pub generation: u32,
    /// Fitness evaluations performed so far in this run.
    pub eval_count: usize,
    pub fitness: FitnessSummary,
    /// Best fitness seen so far in this run.
    pub best_fitness: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_summary() {
        assert_eq!(FitnessSummary::new([]), None);
    }

    #[test]
    fn test_single_value() {
        let summary = FitnessSummary::new([7.0]).unwrap();
        assert_eq!(summary.min, 7.0);
        assert_eq!(summary.max, 7.0);
        assert_eq!(summary.mean, 7.0);
    }
}
