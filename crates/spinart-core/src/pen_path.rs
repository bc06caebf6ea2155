//! Pen-path recording.
//!
//! Each arm owns one flat point buffer plus the offsets at which its
//! segments start, so recording a sample is an in-place push rather than a
//! rebuild of nested vectors. A segment begins whenever the previous sample
//! for that arm was taken with the pen up.
//!
//! Two optional bounds keep long sessions in check:
//! - `min_spacing` drops samples that would land on top of the open
//!   segment's last point (the canvas barely moves between display frames).
//! - `max_points_per_arm` caps each buffer; once full, further samples for
//!   that arm are dropped until the paths are cleared.

use crate::{
    arm::ARM_COUNT,
    config::RecorderConfig,
    geometry::{Vec2, distance},
};
use serde::{Serialize, Serializer};

/// Offset of the second point of a marker dot
const MARK_OFFSET: Vec2 = Vec2::new(0.1, 0.1);

#[derive(Clone, Debug, Default)]
struct ArmTrace {
    points: Vec<Vec2>,
    starts: Vec<usize>,
    was_down: bool,
    saturated: bool,
}

impl ArmTrace {
    fn segments(&self) -> impl Iterator<Item = &[Vec2]> + '_ {
        self.starts.iter().enumerate().map(move |(i, &start)| {
            let end = self
                .starts
                .get(i + 1)
                .copied()
                .unwrap_or(self.points.len());
            &self.points[start..end]
        })
    }

    fn start_segment(&mut self, point: Vec2) {
        self.starts.push(self.points.len());
        self.points.push(point);
    }
}

#[derive(Clone, Debug, Default)]
pub struct PenPaths {
    arms: [ArmTrace; ARM_COUNT],
    min_spacing: f64,
    max_points_per_arm: Option<usize>,
    revision: u64,
}

impl PenPaths {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            arms: Default::default(),
            min_spacing: config.min_spacing,
            max_points_per_arm: config.max_points_per_arm,
            revision: 0,
        }
    }

    /// Bumped whenever stored points change; equal revisions of the same
    /// paths hold the same segments.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Record one canvas-local sample for `arm`.
    ///
    /// Pen-up samples never touch the stored segments; they only note that
    /// the next pen-down sample starts a new segment. Returns whether a point
    /// was stored.
    pub fn record(&mut self, arm: usize, point: Vec2, pen_down: bool) -> bool {
        let Some(trace) = self.arms.get_mut(arm) else {
            return false;
        };
        if !pen_down {
            trace.was_down = false;
            return false;
        }
        if !point.is_finite() {
            return false;
        }
        if let Some(max) = self.max_points_per_arm
            && trace.points.len() >= max
        {
            if !trace.saturated {
                tracing::warn!(arm, max, "pen path is full, dropping samples");
                trace.saturated = true;
            }
            return false;
        }

        if !trace.was_down || trace.starts.is_empty() {
            trace.start_segment(point);
        } else {
            if let Some(&last) = trace.points.last()
                && distance(last, point) < self.min_spacing
            {
                return false;
            }
            trace.points.push(point);
        }
        trace.was_down = true;
        self.revision += 1;
        true
    }

    /// Drop a two-point dot at `point` as its own segment.
    pub fn mark(&mut self, arm: usize, point: Vec2) -> bool {
        let Some(trace) = self.arms.get_mut(arm) else {
            return false;
        };
        if !point.is_finite() {
            return false;
        }
        trace.start_segment(point);
        trace.points.push(point + MARK_OFFSET);
        // the dot stands alone; the next pen-down sample opens a new segment
        trace.was_down = false;
        self.revision += 1;
        true
    }

    pub fn clear(&mut self) {
        for trace in &mut self.arms {
            *trace = ArmTrace::default();
        }
        self.revision += 1;
    }

    /// Segments for `arm`, oldest first. Unknown arms yield nothing.
    pub fn segments(&self, arm: usize) -> impl Iterator<Item = &[Vec2]> + '_ {
        self.arms.get(arm).into_iter().flat_map(ArmTrace::segments)
    }

    pub fn segment_count(&self, arm: usize) -> usize {
        self.arms.get(arm).map_or(0, |t| t.starts.len())
    }

    pub fn point_count(&self, arm: usize) -> usize {
        self.arms.get(arm).map_or(0, |t| t.points.len())
    }

    pub fn is_empty(&self) -> bool {
        self.arms.iter().all(|t| t.points.is_empty())
    }
}

impl Serialize for PenPaths {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.arms
                .iter()
                .map(|trace| trace.segments().collect::<Vec<_>>()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64) -> Vec2 {
        Vec2::new(x, 0.0)
    }

    #[test]
    fn pen_up_samples_do_not_change_paths() {
        let mut paths = PenPaths::default();
        paths.record(0, p(1.0), true);
        paths.record(0, p(2.0), true);
        let before: Vec<Vec<Vec2>> = paths.segments(0).map(<[_]>::to_vec).collect();
        for _ in 0..5 {
            assert!(!paths.record(0, p(9.0), false));
        }
        let after: Vec<Vec<Vec2>> = paths.segments(0).map(<[_]>::to_vec).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn new_segment_on_each_down_transition() {
        let mut paths = PenPaths::default();
        for (i, down) in [true, true, false, true, true].into_iter().enumerate() {
            paths.record(2, p(i as f64), down);
        }
        let segments: Vec<&[Vec2]> = paths.segments(2).collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], &[p(0.0), p(1.0)]);
        assert_eq!(segments[1], &[p(3.0), p(4.0)]);
        assert_eq!(paths.segment_count(0), 0);
    }

    #[test]
    fn arms_are_independent() {
        let mut paths = PenPaths::default();
        paths.record(0, p(0.0), true);
        paths.record(1, p(0.0), true);
        paths.record(1, p(1.0), false);
        paths.record(0, p(1.0), true);
        paths.record(1, p(2.0), true);
        assert_eq!(paths.segment_count(0), 1);
        assert_eq!(paths.point_count(0), 2);
        assert_eq!(paths.segment_count(1), 2);
    }

    #[test]
    fn unknown_arm_is_ignored() {
        let mut paths = PenPaths::default();
        assert!(!paths.record(ARM_COUNT, p(0.0), true));
        assert!(!paths.mark(ARM_COUNT, p(0.0)));
        assert_eq!(paths.segments(ARM_COUNT).count(), 0);
        assert!(paths.is_empty());
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let mut paths = PenPaths::default();
        assert!(!paths.record(0, Vec2::new(f64::NAN, 0.0), true));
        assert!(paths.is_empty());
    }

    #[test]
    fn min_spacing_drops_near_duplicates() {
        let mut paths = PenPaths::new(&RecorderConfig {
            min_spacing: 0.5,
            max_points_per_arm: None,
        });
        assert!(paths.record(0, p(0.0), true));
        assert!(!paths.record(0, p(0.1), true));
        assert!(paths.record(0, p(0.6), true));
        assert_eq!(paths.point_count(0), 2);
    }

    #[test]
    fn cap_bounds_each_arm() {
        let mut paths = PenPaths::new(&RecorderConfig {
            min_spacing: 0.0,
            max_points_per_arm: Some(3),
        });
        for i in 0..10 {
            paths.record(0, p(i as f64), true);
        }
        assert_eq!(paths.point_count(0), 3);
        assert!(paths.record(1, p(0.0), true));
    }

    #[test]
    fn mark_is_a_standalone_dot() {
        let mut paths = PenPaths::default();
        paths.record(0, p(0.0), true);
        paths.mark(0, p(5.0));
        paths.record(0, p(6.0), true);
        let segments: Vec<&[Vec2]> = paths.segments(0).collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1], &[p(5.0), p(5.0) + MARK_OFFSET]);
        assert_eq!(segments[2], &[p(6.0)]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut paths = PenPaths::default();
        paths.record(0, p(0.0), true);
        paths.record(3, p(0.0), true);
        paths.clear();
        assert!(paths.is_empty());
        paths.record(0, p(1.0), true);
        assert_eq!(paths.segment_count(0), 1);
    }

    #[test]
    fn revision_tracks_stored_points() {
        let mut paths = PenPaths::new(&RecorderConfig {
            min_spacing: 0.5,
            max_points_per_arm: None,
        });
        assert!(paths.record(0, p(0.0), true));
        let revision = paths.revision();
        paths.record(0, p(0.1), true);
        paths.record(0, p(3.0), false);
        assert_eq!(paths.revision(), revision);

        paths.mark(1, p(1.0));
        assert!(paths.revision() > revision);
        let revision = paths.revision();
        paths.clear();
        assert!(paths.revision() > revision);
    }

    #[test]
    fn serializes_as_nested_segments() {
        let mut paths = PenPaths::default();
        paths.record(1, Vec2::new(1.0, 2.0), true);
        let json = serde_json::to_string(&paths).unwrap();
        assert_eq!(json, r#"[[],[[{"x":1.0,"y":2.0}]],[],[]]"#);
    }
}
