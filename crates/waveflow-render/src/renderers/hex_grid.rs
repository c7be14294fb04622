//! Hex-grid pulse waves radiating from the center.

use crate::renderer::{FrameInput, Renderer};
use crate::surface::Canvas;
use glam::Vec2;
use waveflow_core::Quality;

const BASE_COLS: usize = 16;
/// Spatial frequency of the radial wave, in cycles per surface diagonal
const WAVE_FREQ: f32 = 9.0;
const RIPPLE_SPEED: f32 = 8.0;

/// Hexagon cells brighten along a radial wave driven by the rotation phase
/// and mid energy; beats launch an expanding ripple front.
pub struct HexGrid {
    cells: Vec<Vec2>,
    cell_radius: f32,
    ripple_radius: f32,
    max_distance: f32,
}

impl HexGrid {
    /// Create an uninitialized grid
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            cell_radius: 0.0,
            ripple_radius: f32::MAX,
            max_distance: 0.0,
        }
    }

    fn hexagon(center: Vec2, radius: f32) -> [Vec2; 6] {
        let mut corners = [Vec2::ZERO; 6];
        for (i, corner) in corners.iter_mut().enumerate() {
            let angle = std::f32::consts::FRAC_PI_6 + i as f32 * std::f32::consts::FRAC_PI_3;
            *corner = center + Vec2::new(angle.cos(), angle.sin()) * radius;
        }
        corners
    }
}

impl Default for HexGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HexGrid {
    fn name(&self) -> &'static str {
        "hex_grid"
    }

    fn init(&mut self, width: f32, height: f32, quality: Quality) {
        let cols = quality.scale_count(BASE_COLS);
        self.cell_radius = (width.max(1.0) / cols as f32) * 0.58;
        self.ripple_radius = f32::MAX;
        self.max_distance = (width * width + height * height).sqrt() * 0.5;

        // Axial layout: odd rows shift half a cell
        self.cells.clear();
        let dx = self.cell_radius * 1.73;
        let dy = self.cell_radius * 1.5;
        let rows = (height / dy).ceil() as usize + 1;
        for row in 0..rows {
            let offset = if row % 2 == 1 { dx * 0.5 } else { 0.0 };
            let mut x = offset;
            while x < width + dx {
                self.cells.push(Vec2::new(x, row as f32 * dy));
                x += dx;
            }
        }
    }

    fn draw(&mut self, canvas: &mut Canvas<'_>, frame: &FrameInput<'_>) {
        if frame.spectrum.is_empty() || frame.palette.is_empty() || self.cells.is_empty() {
            return;
        }

        if frame.beat {
            self.ripple_radius = 0.0;
        }
        let ripple_active = self.ripple_radius < self.max_distance;
        if ripple_active {
            self.ripple_radius += RIPPLE_SPEED * frame.settings.speed;
        }

        let center = Vec2::new(frame.width * 0.5, frame.height * 0.5);
        let mid = frame.mid();
        let bass = frame.bass();

        for (i, &cell) in self.cells.iter().enumerate() {
            let distance = cell.distance(center);
            let norm = distance / self.max_distance.max(1.0);

            // Outward-traveling wave plus the beat ripple front
            let wave = (norm * WAVE_FREQ - frame.rotation * 4.0).sin() * 0.5 + 0.5;
            let ripple = if ripple_active {
                let d = (distance - self.ripple_radius).abs();
                (1.0 - d / (self.cell_radius * 3.0)).max(0.0)
            } else {
                0.0
            };

            let intensity = (wave * (0.25 + mid * 0.75) + ripple).min(1.0);
            if intensity < 0.05 {
                continue;
            }
            let Some(color) = frame.palette.cycle(i / 7) else { continue };
            let radius = self.cell_radius * (0.55 + 0.35 * intensity + bass * 0.1);
            let corners = Self::hexagon(cell, radius);
            canvas.stroke_polyline(
                &[
                    corners[0], corners[1], corners[2], corners[3], corners[4], corners[5],
                    corners[0],
                ],
                1.0 + intensity * 2.0,
                color,
                0.15 + intensity * 0.8,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use waveflow_core::{PalettePreset, VisualizerSettings};

    #[test]
    fn test_grid_covers_surface_once() {
        let mut grid = HexGrid::new();
        grid.init(160.0, 90.0, Quality::Med);
        let count = grid.cells.len();
        assert!(count > 0);

        // Re-init does not accumulate cells
        grid.init(160.0, 90.0, Quality::Med);
        assert_eq!(grid.cells.len(), count);
    }

    #[test]
    fn test_ripple_front_expands_and_expires() {
        let mut grid = HexGrid::new();
        grid.init(96.0, 96.0, Quality::Low);
        let mut surface = Surface::new(96, 96, 1.0).unwrap();
        let palette = PalettePreset::Neon.palette();
        let settings = VisualizerSettings::default();
        let spectrum = vec![140.0f32; 64];

        let mut draw = |grid: &mut HexGrid, beat: bool| {
            let input = FrameInput {
                spectrum: &spectrum,
                alt_spectrum: None,
                width: 96.0,
                height: 96.0,
                palette: &palette,
                settings: &settings,
                rotation: 0.3,
                beat,
            };
            grid.draw(&mut surface.canvas(), &input);
        };

        draw(&mut grid, true);
        let r0 = grid.ripple_radius;
        draw(&mut grid, false);
        assert!(grid.ripple_radius > r0, "ripple must expand");

        for _ in 0..500 {
            draw(&mut grid, false);
        }
        assert!(
            grid.ripple_radius >= grid.max_distance,
            "ripple front stops advancing once it leaves the surface"
        );
    }
}
