/// First and second moment estimates of one parameter buffer.
#[derive(Debug, Clone, Default)]
struct Moments {
    m: Vec<f32>,
    v: Vec<f32>,
}

/// Adam optimiser with bias-corrected moment estimates.
///
/// Parameter buffers are identified by a slot index; state for a slot is
/// allocated the first time it is updated.
#[derive(Debug, Clone)]
pub struct Adam {
    /// Learning rate.
    pub lr: f32,
    /// Decay rate of the first moment.
    pub beta1: f32,
    /// Decay rate of the second moment.
    pub beta2: f32,
    /// Term added to the denominator for numerical stability.
    pub eps: f32,
    step: i32,
    slots: Vec<Moments>,
}

impl Adam {
    /// Create an optimiser with the usual defaults `beta1 = 0.9`, `beta2 = 0.999`, `eps = 1e-8`.
    pub fn new(lr: f32) -> Self {
        Self {
            lr,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            step: 0,
            slots: Vec::new(),
        }
    }

    /// Number of completed steps, saturating at `i32::MAX`.
    pub fn steps(&self) -> i32 {
        self.step
    }

    /// Start a new optimisation step. Call once before updating the slots of that step.
    ///
    /// The counter saturates at `i32::MAX`, the largest exponent `powi` takes.
    /// Both bias corrections are exactly 1 long before that.
    pub fn next_step(&mut self) {
        self.step = self.step.saturating_add(1);
    }

    /// Update one parameter buffer in place from its gradient.
    ///
    /// PRECONDITION: `param` and `grad` have the same length, which does not
    /// change between steps for a given slot.
    pub fn update(&mut self, slot: usize, param: &mut [f32], grad: &[f32]) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, Moments::default);
        }
        let moments = &mut self.slots[slot];
        if moments.m.len() != param.len() {
            moments.m = vec![0.0; param.len()];
            moments.v = vec![0.0; param.len()];
        }

        let t = self.step.max(1);
        let bias1 = 1.0 - self.beta1.powi(t);
        let bias2 = 1.0 - self.beta2.powi(t);

        for ((p, &g), (m, v)) in param
            .iter_mut()
            .zip(grad)
            .zip(moments.m.iter_mut().zip(moments.v.iter_mut()))
        {
            *m = self.beta1 * *m + (1.0 - self.beta1) * g;
            *v = self.beta2 * *v + (1.0 - self.beta2) * g * g;
            let m_hat = *m / bias1;
            let v_hat = *v / bias2;
            *p -= self.lr * m_hat / (v_hat.sqrt() + self.eps);
        }
    }
}
