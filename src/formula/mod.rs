//! User formulas → harmonic coefficients.
//!
//! A formula such as `sin(2 * pi * t)` is parsed into a typed expression
//! tree and sampled at `sample_rate` points over one second. The samples are
//! *not* played back as audio: sample `i` becomes the cosine amplitude of
//! harmonic `i` of a periodic wave (see `dsp::wavetable`).
//!
//! Formulas come straight from a text field or a command-line flag, so the
//! evaluator only knows numbers, `t`, arithmetic and a fixed set of math
//! functions and constants. Anything else is a `CompilationError`.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::Expr;
pub use parser::parse;

use crate::error::CompilationError;

/// Harmonic coefficients sampled from a formula. Both vectors hold one
/// second of samples; `imag` is always zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledWaveform {
    pub real: Vec<f32>,
    pub imag: Vec<f32>,
}

impl CompiledWaveform {
    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }
}

/// Sample `formula` at `t = i / sample_rate` for every `i` in
/// `0..sample_rate`.
///
/// Fails on the first sample that is NaN or infinite (in `f32`), so
/// formulas like `1/0` or `sqrt(-1)` never reach the audio path.
pub fn compile(formula: &str, sample_rate: u32) -> Result<CompiledWaveform, CompilationError> {
    let expr = parse(formula)?;
    let len = sample_rate as usize;
    let rate = f64::from(sample_rate);

    let mut real = Vec::with_capacity(len);
    for index in 0..len {
        let t = index as f64 / rate;
        let value = expr.eval(t) as f32;
        if !value.is_finite() {
            return Err(CompilationError::NonFinite { index, t });
        }
        real.push(value);
    }

    Ok(CompiledWaveform {
        real,
        imag: vec![0.0; len],
    })
}
