use std::fmt;

/// A single drawing-surface filter primitive.
///
/// Amounts are normalized at parse time: percentages become fractions,
/// angles become degrees, lengths are CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Grayscale(f32),
    Sepia(f32),
    Saturate(f32),
    HueRotate(f32),
    Invert(f32),
    Opacity(f32),
    Brightness(f32),
    Contrast(f32),
    Blur(f32),
}

impl FilterOp {
    pub fn name(&self) -> &'static str {
        match self {
            FilterOp::Grayscale(_) => "grayscale",
            FilterOp::Sepia(_) => "sepia",
            FilterOp::Saturate(_) => "saturate",
            FilterOp::HueRotate(_) => "hue-rotate",
            FilterOp::Invert(_) => "invert",
            FilterOp::Opacity(_) => "opacity",
            FilterOp::Brightness(_) => "brightness",
            FilterOp::Contrast(_) => "contrast",
            FilterOp::Blur(_) => "blur",
        }
    }

    /// Whether this primitive is a per-pixel color operation (as opposed to a
    /// neighbourhood operation like blur).
    pub fn is_pointwise(&self) -> bool {
        !matches!(self, FilterOp::Blur(_))
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FilterOp::HueRotate(deg) => write!(f, "hue-rotate({}deg)", deg),
            FilterOp::Blur(px) => write!(f, "blur({}px)", px),
            FilterOp::Grayscale(a)
            | FilterOp::Sepia(a)
            | FilterOp::Saturate(a)
            | FilterOp::Invert(a)
            | FilterOp::Opacity(a)
            | FilterOp::Brightness(a)
            | FilterOp::Contrast(a) => write!(f, "{}({}%)", self.name(), (a * 100.0).round()),
        }
    }
}

/// An ordered chain of filter primitives; empty means `none`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterChain {
    ops: Vec<FilterOp>,
}

impl FilterChain {
    pub fn new(ops: Vec<FilterOp>) -> Self {
        Self { ops }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[FilterOp] {
        &self.ops
    }

    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "none");
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_chain() {
        let chain = FilterChain::new(vec![
            FilterOp::Grayscale(1.0),
            FilterOp::HueRotate(90.0),
            FilterOp::Blur(2.0),
        ]);
        assert_eq!(chain.to_string(), "grayscale(100%) hue-rotate(90deg) blur(2px)");
        assert_eq!(FilterChain::none().to_string(), "none");
    }
}
