//! Linear regression model over spliced multi-channel input
//!
//! The model reproduces a four-step pipeline: splice the per-channel images
//! along the depth axis, scale raw pixel values to [0, 1], flatten, and apply
//! a single dense transform `y = xWᵀ + b`.

use crate::utils::SimpleRng;
use cblas::{sgemm, Layout, Transpose};

/// Row-major GEMM: `c = alpha * op(a) * op(b) + beta * c`.
fn sgemm_wrapper(
    m: usize,
    n: usize,
    k: usize,
    a: &[f32],
    lda: usize,
    b: &[f32],
    ldb: usize,
    c: &mut [f32],
    ldc: usize,
    transpose_a: bool,
    transpose_b: bool,
    alpha: f32,
    beta: f32,
) {
    let trans_a = if transpose_a {
        Transpose::Ordinary
    } else {
        Transpose::None
    };
    let trans_b = if transpose_b {
        Transpose::Ordinary
    } else {
        Transpose::None
    };

    unsafe {
        sgemm(
            Layout::RowMajor,
            trans_a,
            trans_b,
            m as i32,
            n as i32,
            k as i32,
            alpha,
            a,
            lda as i32,
            b,
            ldb as i32,
            beta,
            c,
            ldc as i32,
        );
    }
}

/// Linear model mapping spliced channel input to a regression output vector.
///
/// Holds two trainable parameter tensors whose lifetime spans the whole
/// training run:
///
/// * `weights` — `(output_size × feature_count)` matrix, row-major,
///   Xavier/Glorot-uniform initialized,
/// * `biases` — `(output_size,)` vector, zero initialized,
///
/// where `feature_count = height * width * channel_count`. Gradient buffers
/// of the same shapes are filled by [`LinearModel::backward`] and consumed by
/// the optimizer.
///
/// # Example
///
/// ```
/// use multichannel_trainer::model::LinearModel;
/// use multichannel_trainer::utils::SimpleRng;
///
/// let mut rng = SimpleRng::new(42);
/// let model = LinearModel::new(28, 28, 4, 3, &mut rng);
/// assert_eq!(model.spliced_shape(), (28, 28, 4));
/// assert_eq!(model.weight_shape(), (3, 28 * 28 * 4));
/// assert_eq!(model.bias_shape(), 3);
/// ```
pub struct LinearModel {
    height: usize,
    width: usize,
    channel_count: usize,
    output_size: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
    grad_weights: Vec<f32>,
    grad_biases: Vec<f32>,
}

/// Raw pixel values are bytes; the model rescales them to [0, 1].
const PIXEL_SCALE: f32 = 1.0 / 255.0;

impl LinearModel {
    /// Create a new model for `channel_count` channels of `height` × `width`
    /// grayscale input and an output vector of `output_size` values.
    ///
    /// Weights use Xavier/Glorot initialization, uniform in [-limit, limit]
    /// with `limit = sqrt(6 / (fan_in + fan_out))`. Biases start at zero.
    pub fn new(
        height: usize,
        width: usize,
        channel_count: usize,
        output_size: usize,
        rng: &mut SimpleRng,
    ) -> Self {
        let feature_count = height * width * channel_count;
        let mut weights = vec![0.0f32; output_size * feature_count];
        let limit = (6.0f32 / (feature_count + output_size) as f32).sqrt();

        for value in &mut weights {
            *value = rng.gen_range_f32(-limit, limit);
        }

        Self {
            height,
            width,
            channel_count,
            output_size,
            weights,
            biases: vec![0.0f32; output_size],
            grad_weights: vec![0.0f32; output_size * feature_count],
            grad_biases: vec![0.0f32; output_size],
        }
    }

    /// Shape of the spliced input: (height, width, channel count).
    pub fn spliced_shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channel_count)
    }

    /// Shape of the weight matrix: (output size, feature count).
    pub fn weight_shape(&self) -> (usize, usize) {
        (self.output_size, self.feature_count())
    }

    /// Length of the bias vector.
    pub fn bias_shape(&self) -> usize {
        self.output_size
    }

    /// Number of flattened input features per example.
    pub fn feature_count(&self) -> usize {
        self.height * self.width * self.channel_count
    }

    /// Width of the output vector.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    /// Mutable parameter/gradient pairs, in a fixed order, for the optimizer.
    pub fn parameters_and_gradients(&mut self) -> [(&mut [f32], &[f32]); 2] {
        [
            (self.weights.as_mut_slice(), self.grad_weights.as_slice()),
            (self.biases.as_mut_slice(), self.grad_biases.as_slice()),
        ]
    }

    /// Splice per-channel tensors into flattened, normalized feature rows.
    ///
    /// `channels` holds one raw-pixel tensor per configured channel, each of
    /// length `batch_size * height * width`, in channel binding order. The
    /// output layout is channel-major per example: feature
    /// `c * height * width + p` is pixel `p` of channel `c`, scaled by 1/255.
    ///
    /// `features` must hold at least `batch_size * feature_count()` values.
    ///
    /// # Panics
    ///
    /// Panics if the number of channel tensors or any tensor length does not
    /// match the configured shape.
    pub fn splice_normalize(&self, channels: &[&[f32]], batch_size: usize, features: &mut [f32]) {
        assert_eq!(
            channels.len(),
            self.channel_count,
            "expected one tensor per configured channel"
        );
        let plane = self.height * self.width;
        let stride = self.feature_count();

        for (c, channel) in channels.iter().enumerate() {
            assert!(
                channel.len() >= batch_size * plane,
                "channel tensor too short for batch"
            );
            for example in 0..batch_size {
                let src = &channel[example * plane..(example + 1) * plane];
                let dst_start = example * stride + c * plane;
                let dst = &mut features[dst_start..dst_start + plane];
                for (d, &s) in dst.iter_mut().zip(src.iter()) {
                    *d = s * PIXEL_SCALE;
                }
            }
        }
    }

    /// Forward pass: `output = features · weightsᵀ + biases`.
    ///
    /// `features` is (batch_size × feature_count) row-major, `output` must
    /// hold at least `batch_size * output_size` values.
    pub fn forward(&self, features: &[f32], output: &mut [f32], batch_size: usize) {
        let f = self.feature_count();
        let o = self.output_size;

        // output (batch x O) = features (batch x F) * weights^T (F x O)
        sgemm_wrapper(
            batch_size,
            o,
            f,
            features,
            f,
            &self.weights,
            f,
            output,
            o,
            false,
            true,
            1.0,
            0.0,
        );

        for row in output.chunks_exact_mut(o).take(batch_size) {
            for (value, b) in row.iter_mut().zip(&self.biases) {
                *value += *b;
            }
        }
    }

    /// Backward pass: fill the gradient buffers from `grad_output`, the
    /// gradient of the loss with respect to the forward output.
    ///
    /// `grad_weights = grad_outputᵀ · features` and `grad_biases` is the
    /// per-column sum of `grad_output`. Gradients are overwritten, not
    /// accumulated across calls.
    pub fn backward(&mut self, features: &[f32], grad_output: &[f32], batch_size: usize) {
        let f = self.feature_count();
        let o = self.output_size;

        // grad_weights (O x F) = grad_output^T (O x batch) * features (batch x F)
        sgemm_wrapper(
            o,
            f,
            batch_size,
            grad_output,
            o,
            features,
            f,
            &mut self.grad_weights,
            f,
            true,
            false,
            1.0,
            0.0,
        );

        self.grad_biases.iter_mut().for_each(|g| *g = 0.0);
        for row in grad_output.chunks_exact(o).take(batch_size) {
            for (g, &value) in self.grad_biases.iter_mut().zip(row) {
                *g += value;
            }
        }
    }
}
