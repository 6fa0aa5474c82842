//! Headless display that logs frames instead of drawing them.

use mday_core::{EngineError, Frame, Renderer};
use tracing::{debug, info};

/// Logs a one-line summary every `every` frames and each visible unit at
/// `debug`.
#[derive(Debug)]
pub struct LogRenderer {
    every: u64,
    frames: u64,
}

impl LogRenderer {
    /// Summarises every `every` frames; zero is treated as one.
    #[must_use]
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
        }
    }

    /// Frames received so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, frame: &Frame<'_>) -> Result<(), EngineError> {
        self.frames += 1;
        if frame.tick() % self.every != 0 {
            return Ok(());
        }

        let view = frame.view();
        let visible = frame.visible().count();
        info!(
            tick = frame.tick(),
            units = frame.units().len(),
            visible,
            selected = frame.units().selected().count(),
            scale = format_args!("{:.3}", frame.scale()),
            center = %view.center(),
            "frame"
        );
        for (unit, point) in frame.visible() {
            debug!(
                unit = %unit.id(),
                x = format_args!("{:.1}", point.x),
                y = format_args!("{:.1}", point.y),
                heading = format_args!("{:.3}", unit.heading()),
                selected = unit.is_selected(),
                "visible"
            );
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        info!(frames = self.frames, "display closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mday_core::{CoordinateSystem, Units};

    #[test]
    fn counts_every_frame() {
        let units = Units::new();
        let view = CoordinateSystem::default();
        let mut renderer = LogRenderer::new(0);

        for tick in 0..4 {
            renderer.render(&Frame::new(tick, &units, &view)).unwrap();
        }
        assert_eq!(renderer.frames(), 4);
    }

    #[test]
    fn shutdown_keeps_frame_count() {
        let units = Units::new();
        let view = CoordinateSystem::default();
        let mut renderer = LogRenderer::new(1);
        renderer.render(&Frame::new(0, &units, &view)).unwrap();

        renderer.shutdown().unwrap();
        assert_eq!(renderer.frames(), 1);
    }
}
