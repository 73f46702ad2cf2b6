// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! C rendering of a [`ConvolutionRoutine`].
//!
//! The emitted function has the signature
//! `void name(const T* input, const T* weights, T* output)` and mirrors the
//! loop nest of [`ConvolutionRoutine::execute`] with every layout constant
//! folded in.

use crate::{ConvolutionKernel, ConvolutionRoutine, EmitError};
use tensor_core::ElementType;

fn push_line(module: &mut String, indent: usize, line: &str) {
    module.push_str(&"    ".repeat(indent));
    module.push_str(line);
    module.push('\n');
}

impl ConvolutionRoutine {
    /// Renders the routine as a C function named `name` over `element_type`.
    ///
    /// # Errors
    /// Returns [`EmitError::UnsupportedType`] for non floating-point types.
    pub fn to_c_source(&self, name: &str, element_type: ElementType) -> Result<String, EmitError> {
        if !element_type.is_floating_point() {
            return Err(EmitError::UnsupportedType(element_type));
        }
        let ty = element_type.c_type();
        let params = self.params();
        let k = params.filter_size;
        let s = params.stride;
        let depth = params.input_depth();
        let in_inc = self.input_increments();
        let out_inc = self.output_increments();
        let ol = &params.output_layout;
        let channel_start = params.input_layout.offset_dim(2);

        let mut m = String::new();
        push_line(
            &mut m,
            0,
            &format!(
                "/* {kernel:?} convolution: {f} filters, {k}x{k} window, stride {s} */",
                kernel = self.kernel(),
                f = params.num_filters()
            ),
        );
        push_line(
            &mut m,
            0,
            &format!("void {name}(const {ty}* input, const {ty}* weights, {ty}* output)"),
        );
        push_line(&mut m, 0, "{");
        if self.options().parallel {
            push_line(&mut m, 1, "#pragma omp parallel for");
        }
        push_line(
            &mut m,
            1,
            &format!("for (int f = 0; f < {}; ++f) {{", params.num_filters()),
        );
        push_line(&mut m, 2, &format!("for (int r = 0; r < {}; ++r) {{", ol.active_dim(0)));
        push_line(&mut m, 3, &format!("for (int c = 0; c < {}; ++c) {{", ol.active_dim(1)));
        push_line(&mut m, 4, &format!("{ty} acc = 0;"));

        match self.kernel() {
            ConvolutionKernel::CombinedRows => {
                let span = k * depth;
                push_line(&mut m, 4, &format!("for (int wr = 0; wr < {k}; ++wr) {{"));
                push_line(
                    &mut m,
                    5,
                    &format!(
                        "const {ty}* in_row = input + (r * {s} + wr) * {} + c * {};",
                        in_inc[0],
                        s * in_inc[1]
                    ),
                );
                push_line(
                    &mut m,
                    5,
                    &format!("const {ty}* w_row = weights + f * {} + wr * {span};", k * span),
                );
                push_line(
                    &mut m,
                    5,
                    &format!("for (int i = 0; i < {span}; ++i) acc += in_row[i] * w_row[i];"),
                );
                push_line(&mut m, 4, "}");
            }
            ConvolutionKernel::PerColumn => {
                push_line(&mut m, 4, &format!("for (int wr = 0; wr < {k}; ++wr) {{"));
                push_line(&mut m, 5, &format!("for (int wc = 0; wc < {k}; ++wc) {{"));
                push_line(
                    &mut m,
                    6,
                    &format!(
                        "const {ty}* in_px = input + (r * {s} + wr) * {} + (c * {s} + wc) * {} + {channel_start};",
                        in_inc[0], in_inc[1]
                    ),
                );
                push_line(
                    &mut m,
                    6,
                    &format!(
                        "const {ty}* w_px = weights + f * {} + (wr * {k} + wc) * {depth};",
                        k * k * depth
                    ),
                );
                push_line(
                    &mut m,
                    6,
                    &format!("for (int ch = 0; ch < {depth}; ++ch) acc += in_px[ch] * w_px[ch];"),
                );
                push_line(&mut m, 5, "}");
                push_line(&mut m, 4, "}");
            }
            ConvolutionKernel::Depthwise => {
                push_line(&mut m, 4, &format!("for (int wr = 0; wr < {k}; ++wr) {{"));
                push_line(&mut m, 5, &format!("for (int wc = 0; wc < {k}; ++wc) {{"));
                push_line(
                    &mut m,
                    6,
                    &format!(
                        "acc += input[(r * {s} + wr) * {} + (c * {s} + wc) * {} + {channel_start} + f] * weights[f * {} + wr * {k} + wc];",
                        in_inc[0],
                        in_inc[1],
                        k * k
                    ),
                );
                push_line(&mut m, 5, "}");
                push_line(&mut m, 4, "}");
            }
        }

        push_line(
            &mut m,
            4,
            &format!(
                "output[(r + {}) * {} + (c + {}) * {} + (f + {}) * {}] = acc;",
                ol.offset_dim(0),
                out_inc[0],
                ol.offset_dim(1),
                out_inc[1],
                ol.offset_dim(2),
                out_inc[2]
            ),
        );
        push_line(&mut m, 3, "}");
        push_line(&mut m, 2, "}");
        push_line(&mut m, 1, "}");
        push_line(&mut m, 0, "}");
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ConvolutionParameters, ConvolutionRoutine, EmitError, EmitOptions};
    use tensor_core::{ElementType, MemoryLayout, MemoryShape};

    fn routine(depthwise: bool, options: EmitOptions) -> ConvolutionRoutine {
        let channels = if depthwise { 2 } else { 1 };
        ConvolutionRoutine::emit(
            ConvolutionParameters {
                input_layout: MemoryLayout::padded(MemoryShape::tensor(5, 5, channels), &[1, 1, 0]),
                output_layout: MemoryLayout::dense(MemoryShape::tensor(5, 5, channels)),
                filter_size: 3,
                stride: 1,
                depthwise,
            },
            options,
        )
        .unwrap()
    }

    #[test]
    fn test_fast_path_source() {
        let src = routine(false, EmitOptions::default())
            .to_c_source("conv0", ElementType::Float32)
            .unwrap();
        assert!(src.contains("void conv0(const float* input, const float* weights, float* output)"));
        assert!(src.contains("#pragma omp parallel for"));
        assert!(src.contains("for (int i = 0; i < 3; ++i)"));
        assert!(src.contains("in_row = input + (r * 1 + wr) * 7 + c * 1;"));
    }

    #[test]
    fn test_sequential_per_column_source() {
        let options = EmitOptions {
            contiguous_fast_path: false,
            parallel: false,
        };
        let src = routine(false, options)
            .to_c_source("conv1", ElementType::Float64)
            .unwrap();
        assert!(src.contains("const double* input"));
        assert!(!src.contains("#pragma omp"));
        assert!(src.contains("for (int wc = 0; wc < 3; ++wc)"));
    }

    #[test]
    fn test_depthwise_source() {
        let src = routine(true, EmitOptions::default())
            .to_c_source("dw", ElementType::Float32)
            .unwrap();
        assert!(src.contains("Depthwise"));
        assert!(src.contains("weights[f * 9 + wr * 3 + wc]"));
    }

    #[test]
    fn test_integer_types_rejected() {
        let err = routine(false, EmitOptions::default())
            .to_c_source("bad", ElementType::Int32)
            .unwrap_err();
        assert!(matches!(err, EmitError::UnsupportedType(ElementType::Int32)));
    }
}
