//! Two-point selection on the CO2 scatter plot.
//!
//! Clicks feed a [`SelectionBuffer`] holding the two most recent picks and a
//! running click counter; [`evaluate`] turns the buffer into a
//! [`SlopeReport`] for display. The buffer is plain owned state: whoever
//! handles click events owns it and nothing else mutates it.
//!
//! The report is zeroed on every odd click count even when two points are
//! buffered. This is inherited behavior of the first/second pick toggle and
//! is kept as observed.

use std::fmt;

use crate::data::model::ScatterPoint;

/// Tick spacing, in the units the slope is reported per.
pub const SAMPLING_INTERVAL: f64 = 0.16;

/// Maximum number of buffered picks.
pub const CAPACITY: usize = 2;

// ---------------------------------------------------------------------------
// Selection buffer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Single,
    Paired,
}

/// Sliding window of the last two picks plus the total click count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionBuffer {
    /// Newest last.
    points: Vec<ScatterPoint>,
    click_count: u64,
}

impl SelectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one pick: append, count, then evict down to [`CAPACITY`].
    pub fn click(&mut self, point: ScatterPoint) {
        self.points.push(point);
        self.click_count += 1;
        if self.points.len() > CAPACITY {
            let excess = self.points.len() - CAPACITY;
            self.points.drain(..excess);
        }
    }

    pub fn points(&self) -> &[ScatterPoint] {
        &self.points
    }

    pub fn click_count(&self) -> u64 {
        self.click_count
    }

    pub fn phase(&self) -> Phase {
        match self.points.len() {
            0 => Phase::Idle,
            1 => Phase::Single,
            _ => Phase::Paired,
        }
    }
}

// ---------------------------------------------------------------------------
// Slope / delta
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlopeReport {
    /// Odd click count: slope and delta shown as zero.
    Masked,
    /// Even click count with fewer than two points.
    AwaitingSecond,
    /// Both points share an x coordinate.
    UndefinedSlope,
    Slope { slope: f64, delta: f64 },
}

/// Compute the display payload for the current buffer.
pub fn evaluate(buffer: &SelectionBuffer) -> SlopeReport {
    if buffer.click_count() % 2 == 1 {
        return SlopeReport::Masked;
    }
    match buffer.points() {
        [p1, p2] => {
            if p2.x - p1.x == 0.0 {
                SlopeReport::UndefinedSlope
            } else {
                let delta = p2.y - p1.y;
                SlopeReport::Slope {
                    slope: delta / SAMPLING_INTERVAL,
                    delta,
                }
            }
        }
        _ => SlopeReport::AwaitingSecond,
    }
}

impl SlopeReport {
    pub fn slope_message(&self) -> String {
        match self {
            SlopeReport::Masked => "Slope: 0".into(),
            SlopeReport::AwaitingSecond => {
                "Click on the scatter plot to select two points for slope calculation.".into()
            }
            SlopeReport::UndefinedSlope => "Slope is undefined (division by zero). \
                 Please select points with different x coordinates."
                .into(),
            SlopeReport::Slope { slope, .. } => format!("Slope: {slope:.4}"),
        }
    }

    pub fn delta_message(&self) -> String {
        match self {
            SlopeReport::Masked => "CO2 Concentration Difference: 0".into(),
            SlopeReport::Slope { delta, .. } => {
                format!("CO2 Concentration Difference: {delta:.4}")
            }
            SlopeReport::AwaitingSecond | SlopeReport::UndefinedSlope => String::new(),
        }
    }
}

/// `"<slope message> and <delta message>"`.
impl fmt::Display for SlopeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} and {}", self.slope_message(), self.delta_message())
    }
}

// ---------------------------------------------------------------------------
// Click resolution
// ---------------------------------------------------------------------------

/// Resolve a pointer position to the nearest plotted point.
///
/// `to_screen` maps a data point into the pointer's coordinate space;
/// only points within `radius` of `pointer` there are eligible. Ties go to
/// the earlier point.
pub fn pick_point<F>(
    points: &[ScatterPoint],
    pointer: (f32, f32),
    radius: f32,
    to_screen: F,
) -> Option<ScatterPoint>
where
    F: Fn(ScatterPoint) -> (f32, f32),
{
    let mut best: Option<(f32, ScatterPoint)> = None;
    for &p in points {
        let (sx, sy) = to_screen(p);
        let dist = ((sx - pointer.0).powi(2) + (sy - pointer.1).powi(2)).sqrt();
        if dist > radius {
            continue;
        }
        if best.map_or(true, |(d, _)| dist < d) {
            best = Some((dist, p));
        }
    }
    best.map(|(_, p)| p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> ScatterPoint {
        ScatterPoint::new(x, y)
    }

    fn clicked(points: &[ScatterPoint]) -> SelectionBuffer {
        let mut buf = SelectionBuffer::new();
        for &pt in points {
            buf.click(pt);
        }
        buf
    }

    #[test]
    fn keeps_last_two_points() {
        let buf = clicked(&[p(1.0, 1.0), p(2.0, 2.0), p(3.0, 3.0)]);
        assert_eq!(buf.points(), &[p(2.0, 2.0), p(3.0, 3.0)]);
        assert_eq!(buf.click_count(), 3);
        assert_eq!(buf.phase(), Phase::Paired);
    }

    #[test]
    fn phases_track_buffer_length() {
        let mut buf = SelectionBuffer::new();
        assert_eq!(buf.phase(), Phase::Idle);
        buf.click(p(0.0, 0.0));
        assert_eq!(buf.phase(), Phase::Single);
        buf.click(p(1.0, 0.0));
        assert_eq!(buf.phase(), Phase::Paired);
    }

    #[test]
    fn same_x_is_undefined() {
        let buf = clicked(&[p(0.0, 10.0), p(0.0, 20.0)]);
        assert_eq!(evaluate(&buf), SlopeReport::UndefinedSlope);
        assert_eq!(evaluate(&buf).delta_message(), "");
    }

    #[test]
    fn slope_uses_sampling_interval() {
        let buf = clicked(&[p(0.0, 10.0), p(1.0, 26.0)]);
        match evaluate(&buf) {
            SlopeReport::Slope { slope, delta } => {
                assert!((slope - 100.0).abs() < 1e-9);
                assert!((delta - 16.0).abs() < 1e-9);
            }
            other => panic!("expected slope, got {other:?}"),
        }
        assert_eq!(
            evaluate(&buf).to_string(),
            "Slope: 100.0000 and CO2 Concentration Difference: 16.0000"
        );
    }

    #[test]
    fn odd_click_count_masks_a_valid_pair() {
        let buf = clicked(&[
            p(0.0, 1.0),
            p(1.0, 2.0),
            p(2.0, 3.0),
            p(3.0, 5.0),
            p(4.0, 9.0),
        ]);
        assert_eq!(buf.phase(), Phase::Paired);
        assert_eq!(evaluate(&buf), SlopeReport::Masked);
        assert_eq!(
            evaluate(&buf).to_string(),
            "Slope: 0 and CO2 Concentration Difference: 0"
        );
    }

    #[test]
    fn even_count_without_pair_prompts() {
        let buf = SelectionBuffer::new();
        assert_eq!(evaluate(&buf), SlopeReport::AwaitingSecond);
        assert_eq!(
            evaluate(&buf).to_string(),
            "Click on the scatter plot to select two points for slope calculation. and "
        );
    }

    #[test]
    fn pick_prefers_nearest_within_radius() {
        let pts = [p(0.0, 0.0), p(10.0, 0.0), p(12.0, 0.0)];
        let identity = |pt: ScatterPoint| (pt.x as f32, pt.y as f32);
        assert_eq!(pick_point(&pts, (11.5, 0.0), 3.0, identity), Some(p(12.0, 0.0)));
        assert_eq!(pick_point(&pts, (5.0, 0.0), 3.0, identity), None);
        assert_eq!(pick_point(&[], (0.0, 0.0), 3.0, identity), None);
    }
}
