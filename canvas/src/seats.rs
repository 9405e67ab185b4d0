//! Chair placement around a table.
//!
//! Positions are relative to the table center and only feed the renderer;
//! they are never stored. Angles are in degrees and rotate the chair glyph
//! about its own center.

#[cfg(test)]
#[path = "seats_test.rs"]
mod seats_test;

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::consts::CHAIR_OFFSET;
use crate::doc::{Shape, Table};

/// One chair glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seat {
    pub x: f64,
    pub y: f64,
    pub angle_deg: f64,
}

/// Chair positions for a table of the given shape, size and seat count.
///
/// Deterministic: identical inputs give identical output in identical order.
#[must_use]
pub fn seat_positions(shape: Shape, width: f64, height: f64, seat_count: u32) -> Vec<Seat> {
    let n = seat_count as usize;
    if n == 0 {
        return Vec::new();
    }
    let half_w = width * 0.5;
    let half_h = height * 0.5;

    match shape {
        Shape::Circle | Shape::Oval => around_ellipse(half_w + CHAIR_OFFSET, half_h + CHAIR_OFFSET, n),
        Shape::Booth => {
            let top = n.div_ceil(2);
            let mut seats = horizontal_row(width, -(half_h + CHAIR_OFFSET), top, 180.0);
            seats.extend(horizontal_row(width, half_h + CHAIR_OFFSET, n - top, 0.0));
            seats
        }
        Shape::Bar => horizontal_row(width, half_h + CHAIR_OFFSET, n, 0.0),
        Shape::Rectangle => {
            let per_long_side = n.div_ceil(4);
            let top = per_long_side;
            let bottom = per_long_side.min(n - top);
            let remaining = n - top - bottom;
            let left = remaining / 2;
            let right = remaining - left;

            let mut seats = horizontal_row(width, -(half_h + CHAIR_OFFSET), top, 180.0);
            seats.extend(horizontal_row(width, half_h + CHAIR_OFFSET, bottom, 0.0));
            seats.extend(vertical_column(height, -(half_w + CHAIR_OFFSET), left, 90.0));
            seats.extend(vertical_column(height, half_w + CHAIR_OFFSET, right, -90.0));
            seats
        }
    }
}

/// Chair positions for a stored table.
#[must_use]
pub fn seats_for(table: &Table) -> Vec<Seat> {
    seat_positions(table.shape, table.width, table.height, table.seat_count)
}

fn around_ellipse(rx: f64, ry: f64, n: usize) -> Vec<Seat> {
    (0..n)
        .map(|i| {
            let theta = TAU * (i as f64) / (n as f64) - FRAC_PI_2;
            Seat { x: rx * theta.cos(), y: ry * theta.sin(), angle_deg: theta.to_degrees() + 90.0 }
        })
        .collect()
}

/// Offset of slot `i` of `k` evenly spaced along an edge of `length`, centered on 0.
fn slot(length: f64, i: usize, k: usize) -> f64 {
    -length * 0.5 + length * ((i + 1) as f64) / ((k + 1) as f64)
}

fn horizontal_row(width: f64, y: f64, k: usize, angle_deg: f64) -> Vec<Seat> {
    (0..k)
        .map(|i| Seat { x: slot(width, i, k), y, angle_deg })
        .collect()
}

fn vertical_column(height: f64, x: f64, k: usize, angle_deg: f64) -> Vec<Seat> {
    (0..k)
        .map(|i| Seat { x, y: slot(height, i, k), angle_deg })
        .collect()
}
