use nalgebra::SVector;

/// Exponential low-pass filter.
///
/// Every update keeps `1 - alpha` of the previous state and adds `alpha` of the new sample.
#[derive(Copy, Clone, Debug)]
pub struct ExponentialLpf<const N: usize> {
    alpha: f32,
    y: SVector<f32, N>,
}

impl<const N: usize> ExponentialLpf<N> {
    #[must_use]
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            y: SVector::zeros(),
        }
    }

    pub fn update(&mut self, x: SVector<f32, N>) -> SVector<f32, N> {
        self.y = (1.0 - self.alpha) * self.y + self.alpha * x;
        self.y
    }

    #[must_use]
    pub fn state(&self) -> SVector<f32, N> {
        self.y
    }

    pub fn reset(&mut self) {
        self.y = SVector::zeros();
    }
}
