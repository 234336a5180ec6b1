//! Target blending: from weights to final vertex positions.
//!
//! Displacement data is one flat buffer of per-vertex-per-axis i16 values,
//! `n_targets x n_vertices x 3`, target-major, ordered by target path
//! alphabetically. That is the same ordering as the catalog's slot index.
//! Values are fixed-point with a 1/1000 scale.

use std::io::Read;
use std::time::{Duration, Instant};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{EngineError, EngineResult};

/// Fixed-point scale of the i16 displacement values.
pub const DISPLACEMENT_SCALE: f64 = 1e-3;

/// Default minimum interval between two bakes.
pub const DEFAULT_MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(1000);

/// The loaded displacement buffer.
#[derive(Debug, Clone)]
pub struct TargetData {
    data: Vec<i16>,
    n_targets: usize,
    n_vertices: usize,
}

impl TargetData {
    /// Wraps a raw displacement buffer, validating its length against the
    /// expected shape.
    pub fn new(data: Vec<i16>, n_targets: usize, n_vertices: usize) -> EngineResult<Self> {
        if data.len() != n_targets * n_vertices * 3 {
            return Err(EngineError::DisplacementLength {
                actual: data.len(),
                targets: n_targets,
                vertices: n_vertices,
            });
        }
        Ok(Self {
            data,
            n_targets,
            n_vertices,
        })
    }

    /// Decodes a little-endian i16 buffer from a reader.
    pub fn from_reader<R: Read>(
        mut reader: R,
        n_targets: usize,
        n_vertices: usize,
    ) -> EngineResult<Self> {
        let mut data = vec![0i16; n_targets * n_vertices * 3];
        reader.read_i16_into::<LittleEndian>(&mut data)?;
        Self::new(data, n_targets, n_vertices)
    }

    /// Number of targets.
    pub fn n_targets(&self) -> usize {
        self.n_targets
    }

    /// Number of vertices.
    pub fn n_vertices(&self) -> usize {
        self.n_vertices
    }

    /// Total number of stored values.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// One target's flat displacement row (`n_vertices * 3` values).
    fn row(&self, target: usize) -> &[i16] {
        let stride = self.n_vertices * 3;
        &self.data[target * stride..(target + 1) * stride]
    }
}

/// Why a bake was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The minimum update interval has not elapsed since the last bake.
    Throttled,
    /// The weight vector equals the last applied snapshot.
    Unchanged,
}

/// Result of one [`BlendEngine::apply_targets`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum BakeOutcome {
    /// A fresh vertex buffer was computed.
    Baked(Vec<[f32; 3]>),
    /// Recomputation was skipped.
    Skipped(SkipReason),
}

impl BakeOutcome {
    /// The baked vertices, if any.
    pub fn vertices(&self) -> Option<&[[f32; 3]]> {
        match self {
            BakeOutcome::Baked(vertices) => Some(vertices),
            BakeOutcome::Skipped(_) => None,
        }
    }
}

/// Computes final vertex positions from target weights.
///
/// Recomputation is throttled: a call within the minimum update interval of
/// the last bake, or with a weight vector equal to the last applied
/// snapshot, is skipped. That is a CPU-cost tradeoff, not a correctness
/// rule; `force_next_bake` clears both gates. The engine never mutates the
/// displacement data or the reference vertices.
#[derive(Debug, Clone)]
pub struct BlendEngine {
    data: TargetData,
    reference: Vec<[f32; 3]>,
    min_update_interval: Duration,
    last_bake: Option<Instant>,
    last_weights: Option<Vec<f32>>,
    bake_count: u64,
}

impl BlendEngine {
    /// Creates an engine over loaded displacement data and the immutable
    /// pre-morph reference vertices.
    pub fn new(data: TargetData, reference: Vec<[f32; 3]>) -> EngineResult<Self> {
        if reference.len() != data.n_vertices() {
            return Err(EngineError::DisplacementLength {
                actual: data.len(),
                targets: data.n_targets(),
                vertices: reference.len(),
            });
        }
        Ok(Self {
            data,
            reference,
            min_update_interval: DEFAULT_MIN_UPDATE_INTERVAL,
            last_bake: None,
            last_weights: None,
            bake_count: 0,
        })
    }

    /// Sets the minimum interval between bakes.
    pub fn with_min_update_interval(mut self, interval: Duration) -> Self {
        self.min_update_interval = interval;
        self
    }

    /// Adjusts the minimum interval between bakes in place.
    pub fn set_min_update_interval(&mut self, interval: Duration) {
        self.min_update_interval = interval;
    }

    /// Number of completed bakes.
    pub fn bake_count(&self) -> u64 {
        self.bake_count
    }

    /// The reference vertices.
    pub fn reference_vertices(&self) -> &[[f32; 3]] {
        &self.reference
    }

    /// Clears the throttle and the weight snapshot so the next
    /// `apply_targets` call always recomputes.
    pub fn force_next_bake(&mut self) {
        self.last_bake = None;
        self.last_weights = None;
    }

    /// Applies the weight vector to the displacement data.
    ///
    /// Output vertex `i` is `reference[i] + sum_t weights[t] *
    /// displacement[t][i] * 1e-3`. Targets with zero weight are skipped;
    /// most weights are zero at any time.
    pub fn apply_targets(&mut self, weights: &[f32]) -> EngineResult<BakeOutcome> {
        if weights.len() != self.data.n_targets() {
            return Err(EngineError::WeightLength {
                actual: weights.len(),
                expected: self.data.n_targets(),
            });
        }

        if let Some(last) = self.last_bake {
            if last.elapsed() < self.min_update_interval {
                return Ok(BakeOutcome::Skipped(SkipReason::Throttled));
            }
        }
        if let Some(previous) = &self.last_weights {
            if previous.as_slice() == weights {
                return Ok(BakeOutcome::Skipped(SkipReason::Unchanged));
            }
        }

        let stride = self.data.n_vertices() * 3;
        let mut displacement = vec![0.0f64; stride];
        for (target, &weight) in weights.iter().enumerate() {
            if weight == 0.0 {
                continue;
            }
            let weight = weight as f64;
            let row = self.data.row(target);
            for (slot, &value) in row.iter().enumerate() {
                if value != 0 {
                    displacement[slot] += weight * value as f64;
                }
            }
        }

        let vertices: Vec<[f32; 3]> = self
            .reference
            .iter()
            .enumerate()
            .map(|(i, v)| {
                [
                    v[0] + (displacement[i * 3] * DISPLACEMENT_SCALE) as f32,
                    v[1] + (displacement[i * 3 + 1] * DISPLACEMENT_SCALE) as f32,
                    v[2] + (displacement[i * 3 + 2] * DISPLACEMENT_SCALE) as f32,
                ]
            })
            .collect();

        self.last_weights = Some(weights.to_vec());
        self.last_bake = Some(Instant::now());
        self.bake_count += 1;
        Ok(BakeOutcome::Baked(vertices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Two targets, two vertices. Target 0 moves vertex 0 by +1000 units in
    /// x; target 1 moves vertex 1 by -500 in y and +250 in z.
    fn engine() -> BlendEngine {
        let data = TargetData::new(
            vec![
                1000, 0, 0, 0, 0, 0, // target 0
                0, 0, 0, 0, -500, 250, // target 1
            ],
            2,
            2,
        )
        .unwrap();
        BlendEngine::new(data, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_target_data_length_validation() {
        assert!(matches!(
            TargetData::new(vec![0; 5], 2, 2),
            Err(EngineError::DisplacementLength {
                actual: 5,
                targets: 2,
                vertices: 2
            })
        ));
    }

    #[test]
    fn test_from_reader_little_endian() {
        // 1 target, 1 vertex: values 1, -2, 300.
        let bytes: Vec<u8> = [1i16, -2, 300]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let data = TargetData::from_reader(bytes.as_slice(), 1, 1).unwrap();
        assert_eq!(data.row(0), &[1, -2, 300]);
    }

    #[test]
    fn test_bake_known_output() {
        let mut engine = engine();
        let outcome = engine.apply_targets(&[1.0, 0.5]).unwrap();
        let vertices = outcome.vertices().expect("should bake");
        // v0 = (1,2,3) + 1.0 * (1000,0,0) * 1e-3 = (2,2,3)
        assert_eq!(vertices[0], [2.0, 2.0, 3.0]);
        // v1 = (4,5,6) + 0.5 * (0,-500,250) * 1e-3 = (4, 4.75, 6.125)
        assert_eq!(vertices[1], [4.0, 4.75, 6.125]);
        assert_eq!(engine.bake_count(), 1);
    }

    #[test]
    fn test_zero_weights_leave_reference() {
        let mut engine = engine();
        let outcome = engine.apply_targets(&[0.0, 0.0]).unwrap();
        let vertices = outcome.vertices().unwrap();
        assert_eq!(vertices, engine.reference_vertices());
    }

    #[test]
    fn test_throttle_skips_within_interval() {
        let mut engine = engine().with_min_update_interval(Duration::from_secs(3600));
        assert!(matches!(
            engine.apply_targets(&[1.0, 0.0]).unwrap(),
            BakeOutcome::Baked(_)
        ));
        // Immediately after a bake the throttle gates recomputation, even
        // for changed weights.
        assert_eq!(
            engine.apply_targets(&[0.5, 0.0]).unwrap(),
            BakeOutcome::Skipped(SkipReason::Throttled)
        );
        assert_eq!(engine.bake_count(), 1);
    }

    #[test]
    fn test_unchanged_weights_skip_after_forced_throttle() {
        let mut engine = engine();
        engine.apply_targets(&[1.0, 0.0]).unwrap();

        // Clear the timer but keep the snapshot: identical weights are
        // still recognized and skipped.
        engine.last_bake = None;
        assert_eq!(
            engine.apply_targets(&[1.0, 0.0]).unwrap(),
            BakeOutcome::Skipped(SkipReason::Unchanged)
        );
        assert_eq!(engine.bake_count(), 1);

        // Changed weights rebake.
        assert!(matches!(
            engine.apply_targets(&[0.25, 0.0]).unwrap(),
            BakeOutcome::Baked(_)
        ));
        assert_eq!(engine.bake_count(), 2);
    }

    #[test]
    fn test_force_next_bake_rebakes_identical_weights() {
        let mut engine = engine();
        engine.apply_targets(&[1.0, 0.0]).unwrap();
        engine.force_next_bake();
        assert!(matches!(
            engine.apply_targets(&[1.0, 0.0]).unwrap(),
            BakeOutcome::Baked(_)
        ));
        assert_eq!(engine.bake_count(), 2);
    }

    #[test]
    fn test_weight_length_validation() {
        let mut engine = engine();
        assert!(matches!(
            engine.apply_targets(&[1.0]),
            Err(EngineError::WeightLength {
                actual: 1,
                expected: 2
            })
        ));
    }

    #[test]
    fn test_reference_mismatch_rejected() {
        let data = TargetData::new(vec![0; 6], 1, 2).unwrap();
        assert!(BlendEngine::new(data, vec![[0.0; 3]]).is_err());
    }
}
