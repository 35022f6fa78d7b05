//! CPU application of filter chains to RGBA frame buffers.
//!
//! Color primitives use the matrices from Filter Effects Module Level 1 and
//! operate on non-premultiplied sRGB values; results are clamped after each
//! primitive. Runs of pointwise primitives are fused into one pass.

use image::{ImageBuffer, Rgba};
use rayon::prelude::*;
use snapstrip_core::frame::{FrameBuffer, PixelFormat};

use crate::ast::{FilterChain, FilterOp};

type Matrix = [[f32; 3]; 3];

/// Apply `chain` to `fb` in place. Non-RGBA buffers are converted first.
pub fn apply_chain(fb: &mut FrameBuffer, chain: &FilterChain) {
    if chain.is_identity() || fb.is_empty() {
        return;
    }
    if fb.format != PixelFormat::Rgba8 {
        *fb = std::mem::replace(fb, FrameBuffer::new(0, 0, PixelFormat::Rgba8)).into_rgba();
    }

    let mut pending: Vec<FilterOp> = Vec::new();
    for op in chain.ops() {
        if op.is_pointwise() {
            pending.push(*op);
            continue;
        }
        apply_pointwise(fb, &pending);
        pending.clear();
        if let FilterOp::Blur(radius) = op {
            blur(fb, *radius);
        }
    }
    apply_pointwise(fb, &pending);
}

fn apply_pointwise(fb: &mut FrameBuffer, ops: &[FilterOp]) {
    if ops.is_empty() {
        return;
    }
    fb.data.par_chunks_exact_mut(4).for_each(|px| {
        let mut rgba = [
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
            px[3] as f32 / 255.0,
        ];
        for op in ops {
            apply_op(&mut rgba, op);
        }
        for (dst, v) in px.iter_mut().zip(rgba) {
            *dst = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    });
}

fn apply_op(px: &mut [f32; 4], op: &FilterOp) {
    match *op {
        FilterOp::Grayscale(a) => apply_matrix(px, &grayscale_matrix(a)),
        FilterOp::Sepia(a) => apply_matrix(px, &sepia_matrix(a)),
        FilterOp::Saturate(s) => apply_matrix(px, &saturate_matrix(s)),
        FilterOp::HueRotate(deg) => apply_matrix(px, &hue_rotate_matrix(deg)),
        FilterOp::Invert(a) => {
            for c in &mut px[..3] {
                *c = a * (1.0 - *c) + (1.0 - a) * *c;
            }
        }
        FilterOp::Opacity(a) => px[3] = (px[3] * a).clamp(0.0, 1.0),
        FilterOp::Brightness(a) => {
            for c in &mut px[..3] {
                *c = (*c * a).clamp(0.0, 1.0);
            }
        }
        FilterOp::Contrast(a) => {
            for c in &mut px[..3] {
                *c = ((*c - 0.5) * a + 0.5).clamp(0.0, 1.0);
            }
        }
        FilterOp::Blur(_) => {}
    }
}

fn apply_matrix(px: &mut [f32; 4], m: &Matrix) {
    let [r, g, b, _] = *px;
    for (i, row) in m.iter().enumerate() {
        px[i] = (row[0] * r + row[1] * g + row[2] * b).clamp(0.0, 1.0);
    }
}

fn grayscale_matrix(amount: f32) -> Matrix {
    let s = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.2126 + 0.7874 * s, 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
        [0.2126 - 0.2126 * s, 0.7152 + 0.2848 * s, 0.0722 - 0.0722 * s],
        [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.0722 + 0.9278 * s],
    ]
}

fn sepia_matrix(amount: f32) -> Matrix {
    let s = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.393 + 0.607 * s, 0.769 - 0.769 * s, 0.189 - 0.189 * s],
        [0.349 - 0.349 * s, 0.686 + 0.314 * s, 0.168 - 0.168 * s],
        [0.272 - 0.272 * s, 0.534 - 0.534 * s, 0.131 + 0.869 * s],
    ]
}

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> Matrix {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

/// Gaussian blur with standard deviation `radius` (CSS `blur()` semantics).
fn blur(fb: &mut FrameBuffer, radius: f32) {
    if radius <= 0.0 {
        return;
    }
    let Some(img) = ImageBuffer::<Rgba<u8>, _>::from_raw(fb.width, fb.height, fb.data.clone())
    else {
        tracing::warn!(width = fb.width, height = fb.height, "blur skipped: buffer size mismatch");
        return;
    };
    let blurred = image::imageops::blur(&img, radius);
    fb.data = blurred.into_raw();
}
