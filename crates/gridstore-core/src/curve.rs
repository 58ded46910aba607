//! Piecewise-linear curves.
//!
//! Heat-rate curves, supply curves and reinforcement curves are all stored
//! the same way: a JSON array of `{from_x, to_x, from_y, to_y}` segments,
//! written as a BLOB attribute.

use serde::{Deserialize, Serialize};

use crate::{AttributeValue, GridResult};

const CONTINUITY_EPS: f64 = 1e-9;

/// One linear piece of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from_x: f64,
    pub to_x: f64,
    pub from_y: f64,
    pub to_y: f64,
}

impl Segment {
    pub fn end(&self) -> (f64, f64) {
        (self.to_x, self.to_y)
    }
}

/// Ordered list of segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PiecewiseLinear {
    segments: Vec<Segment>,
}

/// Heat-rate inputs of one thermal unit.
///
/// `output_pct[i]` is the `Output_pct_i` breakpoint as a fraction of `cap`;
/// `incremental[i - 1]` is the matching `HR_incr_i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatRatePoints {
    pub cap: f64,
    pub heat_rate: Option<f64>,
    pub output_pct: [Option<f64>; 5],
    pub incremental: [Option<f64>; 4],
}

impl PiecewiseLinear {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Chain `(x, y)` samples into segments, starting at the origin.
    ///
    /// Samples are used in the order given; callers sort them first.
    pub fn from_samples(samples: &[(f64, f64)]) -> Self {
        let mut segments = Vec::with_capacity(samples.len());
        let (mut from_x, mut from_y) = (0.0, 0.0);
        for &(to_x, to_y) in samples {
            segments.push(Segment {
                from_x,
                to_x,
                from_y,
                to_y,
            });
            from_x = to_x;
            from_y = to_y;
        }
        Self { segments }
    }

    /// Heat-rate curve of a thermal unit, or `None` without a base heat rate.
    ///
    /// The first segment always exists. Segments 2 to 4 are appended only
    /// when both their output breakpoint and incremental rate are present,
    /// and each starts where the previous one ended.
    pub fn heat_rate(points: &HeatRatePoints) -> Option<Self> {
        let base = points.heat_rate?;
        let cap = points.cap;

        let first = Segment {
            from_x: points.output_pct[0].unwrap_or(0.0) * cap,
            to_x: points.output_pct[1].map_or(cap, |pct| pct * cap),
            from_y: base,
            to_y: points.incremental[0].unwrap_or(base),
        };

        let mut segments = vec![first];
        for i in 2..=4 {
            if let (Some(pct), Some(rate)) = (points.output_pct[i], points.incremental[i - 1]) {
                let (from_x, from_y) = segments[segments.len() - 1].end();
                segments.push(Segment {
                    from_x,
                    to_x: pct * cap,
                    from_y,
                    to_y: rate,
                });
            }
        }

        Some(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Every segment starts where its predecessor ended.
    pub fn is_continuous(&self) -> bool {
        self.segments.windows(2).all(|pair| {
            let (x, y) = pair[0].end();
            (pair[1].from_x - x).abs() <= CONTINUITY_EPS
                && (pair[1].from_y - y).abs() <= CONTINUITY_EPS
        })
    }

    pub fn to_blob(&self) -> GridResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.segments)?)
    }

    pub fn from_blob(bytes: &[u8]) -> GridResult<Self> {
        Ok(Self {
            segments: serde_json::from_slice(bytes)?,
        })
    }

    pub fn to_attribute(&self) -> GridResult<AttributeValue> {
        Ok(AttributeValue::Blob(self.to_blob()?))
    }
}
