//! Debug overlays
//!
//! Thin forwards to the simulator's debug helper, plus arc drawing.

use contracts::{Color, DebugShape, DrawStyle, Location, PERSISTENT};
use tracing::{debug, instrument};

use crate::client::CarlaClient;
use crate::error::Result;

/// Points along a quadratic Bézier arc from `start` to `end`
///
/// The control point is the midpoint raised by `height` along z. Returns
/// `segments + 1` points; zero segments counts as one.
pub fn arc_points(start: Location, end: Location, height: f64, segments: usize) -> Vec<Location> {
    let segments = segments.max(1);
    let control = (start + end).scale(0.5) + Location::new(0.0, 0.0, height);

    (0..=segments)
        .map(|i| {
            if i == 0 {
                return start;
            }
            if i == segments {
                return end;
            }
            let t = i as f64 / segments as f64;
            let u = 1.0 - t;
            start.scale(u * u) + control.scale(2.0 * u * t) + end.scale(t * t)
        })
        .collect()
}

/// How `draw_arc` looks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcStyle {
    /// Apex height above the chord midpoint (metres)
    pub height: f64,
    pub segments: usize,
    pub style: DrawStyle,
}

impl Default for ArcStyle {
    fn default() -> Self {
        Self {
            height: 2.0,
            segments: 16,
            style: DrawStyle {
                color: Color::GREEN,
                thickness: 0.1,
                life_time: PERSISTENT,
            },
        }
    }
}

/// Draw an arc as consecutive line segments, returning how many were drawn
#[instrument(name = "debug_draw_arc", skip(client, arc))]
pub async fn draw_arc<C: CarlaClient>(
    client: &C,
    start: Location,
    end: Location,
    arc: &ArcStyle,
) -> Result<usize> {
    let points = arc_points(start, end, arc.height, arc.segments);

    for pair in points.windows(2) {
        client
            .draw(
                DebugShape::Line {
                    begin: pair[0],
                    end: pair[1],
                },
                arc.style,
            )
            .await?;
    }
    observability::metrics::record_debug_draw("arc");

    debug!(segments = points.len() - 1, "arc drawn");
    Ok(points.len() - 1)
}

pub async fn draw_line<C: CarlaClient>(
    client: &C,
    begin: Location,
    end: Location,
    style: DrawStyle,
) -> Result<()> {
    client.draw(DebugShape::Line { begin, end }, style).await?;
    observability::metrics::record_debug_draw("line");
    Ok(())
}

pub async fn draw_point<C: CarlaClient>(
    client: &C,
    location: Location,
    style: DrawStyle,
) -> Result<()> {
    client.draw(DebugShape::Point { location }, style).await?;
    observability::metrics::record_debug_draw("point");
    Ok(())
}

/// Text label at `location`
pub async fn draw_string<C: CarlaClient>(
    client: &C,
    location: Location,
    text: impl Into<String>,
    style: DrawStyle,
) -> Result<()> {
    client
        .draw(
            DebugShape::String {
                location,
                text: text.into(),
            },
            style,
        )
        .await?;
    observability::metrics::record_debug_draw("string");
    Ok(())
}
