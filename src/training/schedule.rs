/// When the generator updates and when periodic side effects fire.
///
/// Generator updates are keyed on the batch index within an epoch; image
/// samples and checkpoints on the global step. All three fire at index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub n_critic: usize,
    pub sample_interval: usize,
    pub checkpoint_interval: usize,
}

impl Schedule {
    pub fn updates_generator(&self, batch_index: usize) -> bool {
        batch_index % self.n_critic == 0
    }

    /// Generator updates in an epoch of `num_batches` batches.
    pub fn generator_updates_per_epoch(&self, num_batches: usize) -> usize {
        num_batches.div_ceil(self.n_critic)
    }

    pub fn samples_at(&self, global_step: usize) -> bool {
        global_step % self.sample_interval == 0
    }

    pub fn checkpoints_at(&self, global_step: usize) -> bool {
        global_step % self.checkpoint_interval == 0
    }
}

/// Monotonic count of batches processed across all epochs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalStep(usize);

impl GlobalStep {
    pub fn get(&self) -> usize {
        self.0
    }

    /// Advance by one processed batch.
    pub fn advance(&mut self) {
        self.0 += 1;
    }
}
