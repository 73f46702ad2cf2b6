// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scalar loss functions.

/// Scaled margins at or below this value take the linear branch of
/// [`LogLoss::evaluate`]; `exp(18)` is where `log(1 + e^m)` and `m` agree to
/// within double precision.
const LINEAR_MARGIN_THRESHOLD: f64 = -18.0;

/// A loss over a scalar prediction and label.
pub trait Loss: Send + Sync {
    fn evaluate(&self, prediction: f64, label: f64) -> f64;

    /// Derivative of [`evaluate`](Loss::evaluate) with respect to the
    /// prediction.
    fn derivative(&self, prediction: f64, label: f64) -> f64;
}

/// Logistic loss `log(1 + exp(-s * p * l)) / s`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LogLoss {
    scale: f64,
}

impl LogLoss {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for LogLoss {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Loss for LogLoss {
    fn evaluate(&self, prediction: f64, label: f64) -> f64 {
        let scaled_margin = self.scale * prediction * label;
        if scaled_margin <= LINEAR_MARGIN_THRESHOLD {
            return -prediction * label;
        }
        (-scaled_margin).exp().ln_1p() / self.scale
    }

    fn derivative(&self, prediction: f64, label: f64) -> f64 {
        let scaled_margin = self.scale * prediction * label;
        if scaled_margin <= 0.0 {
            -label / (1.0 + scaled_margin.exp())
        } else {
            let e = (-scaled_margin).exp();
            -label * e / (1.0 + e)
        }
    }
}
