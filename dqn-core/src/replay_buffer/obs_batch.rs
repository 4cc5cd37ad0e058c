use super::SubBatch;
use crate::error::DqnError;
use anyhow::Result;

/// A batch of `f32` observations sharing one shape, stored contiguously.
///
/// A single observation is an [`ObsBatch`] of length 1. When used as the
/// storage of a replay memory, the buffer is laid out on the first push,
/// since the per-sample shape is not known before.
#[derive(Clone, Debug, PartialEq)]
pub struct ObsBatch {
    shape: Vec<usize>,
    n: usize,
    buf: Vec<f32>,
}

impl ObsBatch {
    /// Creates a batch of length 1 from the values of one observation.
    pub fn from_sample(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let len: usize = shape.iter().product();
        if len != data.len() {
            return Err(DqnError::EnvContract(format!(
                "observation of shape {:?} has {} values",
                shape,
                data.len()
            ))
            .into());
        }

        Ok(Self {
            shape,
            n: 1,
            buf: data,
        })
    }

    /// Shape of one sample.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Shape of the whole batch, `[n, shape..]`.
    pub fn batch_shape(&self) -> Vec<usize> {
        let mut s = vec![self.n];
        s.extend_from_slice(&self.shape);
        s
    }

    /// The number of samples.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Returns `true` if the batch holds no sample.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Values of all samples in row-major order.
    pub fn as_slice(&self) -> &[f32] {
        &self.buf
    }

    /// Values of the `i`-th sample.
    pub fn get(&self, i: usize) -> &[f32] {
        let len = self.sample_len();
        &self.buf[i * len..(i + 1) * len]
    }

    fn sample_len(&self) -> usize {
        self.shape.iter().product()
    }
}

impl SubBatch for ObsBatch {
    fn new(capacity: usize) -> Self {
        Self {
            shape: vec![],
            n: capacity,
            buf: vec![],
        }
    }

    fn check(&self, data: &Self) -> Result<()> {
        if data.n != 1 {
            return Err(DqnError::EnvContract(format!(
                "expected a single observation, got {}",
                data.n
            ))
            .into());
        }

        if !self.buf.is_empty() && self.shape != data.shape {
            return Err(DqnError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: data.shape.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn push(&mut self, i: usize, data: &Self) -> Result<()> {
        self.check(data)?;
        if self.buf.is_empty() {
            self.shape = data.shape.clone();
            self.buf = vec![0f32; self.n * data.sample_len()];
        }

        let len = self.sample_len();
        self.buf[i * len..(i + 1) * len].copy_from_slice(&data.buf);
        Ok(())
    }

    fn sample(&self, ixs: &[usize]) -> Self {
        let mut buf = Vec::with_capacity(ixs.len() * self.sample_len());
        for &ix in ixs {
            buf.extend_from_slice(self.get(ix));
        }

        Self {
            shape: self.shape.clone(),
            n: ixs.len(),
            buf,
        }
    }
}
