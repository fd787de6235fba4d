use crate::stats::GenerationSummary;

/// Receives progress events from the GP driver.
///
/// Every method has an empty default, so observers implement only what they
/// record.
pub trait RunObserver {
    /// A run is starting; `run` counts from `1`.
    fn run_started(&mut self, run: u32) {
        let _ = run;
    }

    /// An evaluation beat the best fitness of the current run.
    fn improved(&mut self, eval_count: usize, best_fitness: f64) {
        let _ = (eval_count, best_fitness);
    }

    fn generation_finished(&mut self, summary: &GenerationSummary) {
        let _ = summary;
    }
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

impl<O> RunObserver for &mut O
where
    O: RunObserver + ?Sized,
{
    fn run_started(&mut self, run: u32) {
        (**self).run_started(run);
    }

    fn improved(&mut self, eval_count: usize, best_fitness: f64) {
        (**self).improved(eval_count, best_fitness);
    }

    fn generation_finished(&mut self, summary: &GenerationSummary) {
        (**self).generation_finished(summary);
    }
}
