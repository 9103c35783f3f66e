//! Early stopping on a higher-is-better validation score

/// Explicit early-stopping state
///
/// An epoch improves when `score > best + min_delta`; the first observed
/// score always improves. Training should stop once `patience` consecutive
/// epochs pass without improvement. A patience of 0 disables stopping.
///
/// # Example
///
/// ```rust
/// use linaje::train::callback::EarlyStopping;
///
/// let mut es = EarlyStopping::new(2, 0.0);
/// assert!(es.update(0.5));
/// assert!(!es.update(0.5));
/// assert!(!es.should_stop());
/// assert!(!es.update(0.4));
/// assert!(es.should_stop());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EarlyStopping {
    patience: usize,
    min_delta: f32,
    best: Option<f32>,
    best_epoch: Option<usize>,
    epochs_seen: usize,
    pub(crate) epochs_without_improvement: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize, min_delta: f32) -> Self {
        Self {
            patience,
            min_delta,
            best: None,
            best_epoch: None,
            epochs_seen: 0,
            epochs_without_improvement: 0,
        }
    }

    /// Record an epoch's score; returns whether it is a new best
    pub fn update(&mut self, score: f32) -> bool {
        let epoch = self.epochs_seen;
        self.epochs_seen += 1;

        let improved = match self.best {
            None => true,
            Some(best) => score > best + self.min_delta,
        };
        if improved {
            self.best = Some(score);
            self.best_epoch = Some(epoch);
            self.epochs_without_improvement = 0;
        } else {
            self.epochs_without_improvement += 1;
        }
        improved
    }

    /// Record an epoch that produced no score (e.g. an empty validation set)
    pub fn skip(&mut self) {
        self.epochs_seen += 1;
        self.epochs_without_improvement += 1;
    }

    pub fn should_stop(&self) -> bool {
        self.patience > 0 && self.epochs_without_improvement >= self.patience
    }

    pub fn best(&self) -> Option<f32> {
        self.best
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    pub fn epochs_without_improvement(&self) -> usize {
        self.epochs_without_improvement
    }

    pub fn patience(&self) -> usize {
        self.patience
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_patience() {
        let mut es = EarlyStopping::new(3, 0.0);
        assert!(es.update(0.1));
        assert!(es.update(0.2));
        assert!(!es.update(0.2));
        assert!(!es.update(0.15));
        assert!(!es.should_stop());
        assert!(!es.update(0.19));
        assert!(es.should_stop());
        assert_eq!(es.best(), Some(0.2));
        assert_eq!(es.best_epoch(), Some(1));
    }

    #[test]
    fn test_min_delta() {
        let mut es = EarlyStopping::new(1, 0.05);
        es.update(0.5);
        assert!(!es.update(0.54));
        assert!(es.should_stop());
    }

    #[test]
    fn test_improvement_resets_counter() {
        let mut es = EarlyStopping::new(2, 0.0);
        es.update(0.1);
        es.update(0.1);
        assert_eq!(es.epochs_without_improvement(), 1);
        es.update(0.3);
        assert_eq!(es.epochs_without_improvement(), 0);
    }

    #[test]
    fn test_zero_patience_never_stops() {
        let mut es = EarlyStopping::new(0, 0.0);
        for _ in 0..10 {
            es.update(0.0);
        }
        assert!(!es.should_stop());
    }

    #[test]
    fn test_skip_counts_against_patience() {
        let mut es = EarlyStopping::new(2, 0.0);
        es.skip();
        es.skip();
        assert!(es.should_stop());
        assert_eq!(es.best(), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_best_is_running_maximum(scores in proptest::collection::vec(0.0f32..1.0, 1..40)) {
            let mut es = EarlyStopping::new(5, 0.0);
            let mut running = f32::NEG_INFINITY;
            for s in scores {
                let improved = es.update(s);
                prop_assert_eq!(improved, s > running);
                running = running.max(s);
                prop_assert_eq!(es.best(), Some(running));
            }
        }
    }
}
