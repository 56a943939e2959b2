use std::collections::VecDeque;
use std::fmt;

/// The generator loss as reported for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneratorLoss {
    /// No generator update has run yet.
    Pending,
    /// Computed by this iteration's generator update.
    Fresh(f32),
    /// Carried over from the last update; this iteration skipped it.
    Stale(f32),
}

impl GeneratorLoss {
    pub fn value(&self) -> Option<f32> {
        match *self {
            GeneratorLoss::Pending => None,
            GeneratorLoss::Fresh(v) | GeneratorLoss::Stale(v) => Some(v),
        }
    }
}

impl fmt::Display for GeneratorLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorLoss::Pending => f.write_str("n/a"),
            GeneratorLoss::Fresh(v) => write!(f, "{v:.6}"),
            GeneratorLoss::Stale(v) => write!(f, "{v:.6} (stale)"),
        }
    }
}

/// Loss tracker with rolling window computations.
pub struct LossMetrics {
    discriminator_losses: VecDeque<f32>,
    generator_losses: VecDeque<f32>,
    capacity: usize,
    last_generator: Option<f32>,
    generator_fresh: bool,
}

impl LossMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        LossMetrics {
            discriminator_losses: VecDeque::with_capacity(capacity),
            generator_losses: VecDeque::with_capacity(capacity),
            capacity,
            last_generator: None,
            generator_fresh: false,
        }
    }

    /// Record one iteration. `generator` is `None` when the generator update
    /// was skipped.
    pub fn record_step(&mut self, discriminator: f32, generator: Option<f32>) {
        push_capped(&mut self.discriminator_losses, discriminator, self.capacity);

        self.generator_fresh = generator.is_some();
        if let Some(g) = generator {
            self.last_generator = Some(g);
            push_capped(&mut self.generator_losses, g, self.capacity);
        }
    }

    /// Discriminator loss of the latest iteration.
    pub fn last_discriminator_loss(&self) -> Option<f32> {
        self.discriminator_losses.back().copied()
    }

    /// Generator loss for the latest iteration, tagged fresh or stale.
    pub fn generator_loss(&self) -> GeneratorLoss {
        match (self.last_generator, self.generator_fresh) {
            (None, _) => GeneratorLoss::Pending,
            (Some(v), true) => GeneratorLoss::Fresh(v),
            (Some(v), false) => GeneratorLoss::Stale(v),
        }
    }

    /// Average discriminator loss over the last N iterations.
    pub fn average_discriminator_loss(&self, last_n: usize) -> f32 {
        average_tail(&self.discriminator_losses, last_n)
    }

    /// Average generator loss over the last N generator updates.
    pub fn average_generator_loss(&self, last_n: usize) -> f32 {
        average_tail(&self.generator_losses, last_n)
    }
}

fn push_capped(buf: &mut VecDeque<f32>, value: f32, capacity: usize) {
    buf.push_back(value);
    if buf.len() > capacity {
        buf.pop_front();
    }
}

fn average_tail(buf: &VecDeque<f32>, last_n: usize) -> f32 {
    let n = buf.len().min(last_n);
    if n == 0 {
        return 0.0;
    }
    let sum: f32 = buf.iter().rev().take(n).sum();
    sum / n as f32
}
