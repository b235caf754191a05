use crate::runner::ds::step::Step;

/// Index cursor over a computed trace.
///
/// The first `position` steps count as executed. The cursor never computes
/// anything; it only reveals steps of a trace that already exists.
#[derive(Debug, Default)]
pub struct StepCursor {
    steps: Vec<Step>,
    position: usize,
}

impl StepCursor {
    pub fn new(steps: Vec<Step>) -> Self {
        StepCursor { steps, position: 0 }
    }

    /// Replaces the trace and rewinds.
    pub fn load(&mut self, steps: Vec<Step>) {
        self.steps = steps;
        self.position = 0;
    }

    /// Reveals one more step. Returns it, or `None` when already at the end.
    pub fn next(&mut self) -> Option<&Step> {
        if self.position < self.steps.len() {
            self.position += 1;
            self.steps.get(self.position - 1)
        } else {
            None
        }
    }

    /// Hides the last revealed step. Returns false at the start.
    pub fn prev(&mut self) -> bool {
        if self.position > 0 {
            self.position -= 1;
            true
        } else {
            false
        }
    }

    /// Drops the trace entirely.
    pub fn reset(&mut self) {
        self.steps.clear();
        self.position = 0;
    }

    pub fn executed_steps(&self) -> &[Step] {
        &self.steps[..self.position]
    }

    /// The most recently revealed step.
    pub fn current(&self) -> Option<&Step> {
        self.position.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.position == self.steps.len()
    }
}
