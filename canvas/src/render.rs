//! Rendering: draws the selected floor to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives a read-only view of the engine and produces pixels. It does not
//! mutate any application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::doc::{Shape, Table, TableStatus};
use crate::engine::EngineCore;
use crate::seats::{Seat, seats_for};

/// Grid spacing in logical units.
const GRID_STEP: f64 = 50.0;

/// Chair glyph size in logical units.
const CHAIR_W: f64 = 18.0;
const CHAIR_H: f64 = 14.0;

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;

/// Gap between a table outline and its selection outline, in logical units.
const SELECTION_PAD: f64 = 6.0;

const SURROUND_FILL: &str = "#E5E7EB";
const CANVAS_FILL: &str = "#FAFAF9";
const GRID_STROKE: &str = "rgba(0, 0, 0, 0.06)";
const SELECTION_STROKE: &str = "#1E90FF";

/// Draw the full scene for the engine's current state.
///
/// `dpr` is the device pixel ratio; the engine's surface is in CSS pixels.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, core: &EngineCore, dpr: f64) -> Result<(), JsValue> {
    let surface = core.surface;
    let t = core.viewport.transform(surface);

    // Layer 1: clear in device space, then map logical units to the surface.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.set_fill_style_str(SURROUND_FILL);
    ctx.fill_rect(0.0, 0.0, surface.width, surface.height);
    ctx.set_transform(dpr * t.scale, 0.0, 0.0, dpr * t.scale, dpr * t.tx, dpr * t.ty)?;

    // Layer 2: the canvas sheet.
    draw_background(ctx, t.scale)?;

    if core.shows_empty_state() {
        return draw_empty_state(ctx);
    }

    // Layer 3: tables in draw order (later ids on top).
    for table in core.visible_tables() {
        draw_table(ctx, table)?;
    }

    // Layer 4: selection.
    if let Some(table) = core.selected_table() {
        if core.ui.selected_floor == table.floor_id {
            draw_selection(ctx, table, t.scale)?;
        }
    }

    Ok(())
}

// =============================================================
// Background
// =============================================================

fn draw_background(ctx: &CanvasRenderingContext2d, scale: f64) -> Result<(), JsValue> {
    ctx.set_fill_style_str(CANVAS_FILL);
    ctx.fill_rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);

    ctx.save();
    ctx.set_stroke_style_str(GRID_STROKE);
    ctx.set_line_width(1.0 / scale);
    ctx.begin_path();
    let mut x = GRID_STEP;
    while x < CANVAS_WIDTH {
        ctx.move_to(x, 0.0);
        ctx.line_to(x, CANVAS_HEIGHT);
        x += GRID_STEP;
    }
    let mut y = GRID_STEP;
    while y < CANVAS_HEIGHT {
        ctx.move_to(0.0, y);
        ctx.line_to(CANVAS_WIDTH, y);
        y += GRID_STEP;
    }
    ctx.stroke();
    ctx.restore();
    Ok(())
}

fn draw_empty_state(ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_fill_style_str("#6B7280");
    ctx.set_font("20px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text("No floors yet. Add a floor to start laying out tables.", CANVAS_WIDTH * 0.5, CANVAS_HEIGHT * 0.5)?;
    ctx.restore();
    Ok(())
}

// =============================================================
// Tables
// =============================================================

fn status_colors(status: TableStatus) -> (&'static str, &'static str) {
    match status {
        TableStatus::Available => ("#D1FAE5", "#059669"),
        TableStatus::Occupied => ("#FEE2E2", "#DC2626"),
    }
}

fn draw_table(ctx: &CanvasRenderingContext2d, table: &Table) -> Result<(), JsValue> {
    if table.width <= 0.0 || table.height <= 0.0 {
        return Ok(());
    }
    let (fill, stroke) = status_colors(table.status);

    ctx.save();
    ctx.translate(table.x_position, table.y_position)?;

    for seat in seats_for(table) {
        draw_chair(ctx, seat, stroke)?;
    }

    table_path(ctx, table)?;
    ctx.set_fill_style_str(fill);
    ctx.fill();
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(2.0);
    ctx.stroke();

    draw_labels(ctx, table)?;
    ctx.restore();
    Ok(())
}

/// Trace the table outline centered on the origin. Does not fill or stroke.
fn table_path(ctx: &CanvasRenderingContext2d, table: &Table) -> Result<(), JsValue> {
    let hw = table.width / 2.0;
    let hh = table.height / 2.0;
    ctx.begin_path();
    match table.shape {
        Shape::Circle | Shape::Oval => {
            ctx.ellipse(0.0, 0.0, hw, hh, 0.0, 0.0, 2.0 * PI)?;
        }
        Shape::Booth => rounded_rect(ctx, -hw, -hh, table.width, table.height, hh.min(hw) * 0.5)?,
        Shape::Bar => rounded_rect(ctx, -hw, -hh, table.width, table.height, 4.0)?,
        Shape::Rectangle => ctx.rect(-hw, -hh, table.width, table.height),
    }
    Ok(())
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) -> Result<(), JsValue> {
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r)?;
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r)?;
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r)?;
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r)?;
    ctx.close_path();
    Ok(())
}

fn draw_chair(ctx: &CanvasRenderingContext2d, seat: Seat, stroke: &str) -> Result<(), JsValue> {
    ctx.save();
    ctx.translate(seat.x, seat.y)?;
    ctx.rotate(seat.angle_deg.to_radians())?;
    ctx.begin_path();
    rounded_rect(ctx, -CHAIR_W / 2.0, -CHAIR_H / 2.0, CHAIR_W, CHAIR_H, 3.0)?;
    ctx.set_fill_style_str("#FFFFFF");
    ctx.fill();
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(1.5);
    ctx.stroke();
    ctx.restore();
    Ok(())
}

fn draw_labels(ctx: &CanvasRenderingContext2d, table: &Table) -> Result<(), JsValue> {
    let font_size = (table.height * 0.2).clamp(10.0, 16.0);
    let max_w = (table.width - 8.0).max(1.0);

    ctx.set_fill_style_str("#111827");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_font(&format!("600 {font_size:.0}px sans-serif"));
    let name = fit_text(ctx, &table.name, max_w)?;
    ctx.fill_text(&name, 0.0, -font_size * 0.55)?;

    ctx.set_fill_style_str("#4B5563");
    ctx.set_font(&format!("{:.0}px sans-serif", font_size * 0.85));
    let seats = if table.seat_count == 1 { "1 seat".to_owned() } else { format!("{} seats", table.seat_count) };
    ctx.fill_text(&seats, 0.0, font_size * 0.65)?;
    Ok(())
}

/// Truncate `text` with an ellipsis until it fits within `max_w`.
fn fit_text(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> Result<String, JsValue> {
    if ctx.measure_text(text)?.width() <= max_w {
        return Ok(text.to_owned());
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}…", chars.iter().collect::<String>());
        if ctx.measure_text(&candidate)?.width() <= max_w {
            return Ok(candidate);
        }
    }
    Ok(String::new())
}

// =============================================================
// Selection
// =============================================================

fn draw_selection(ctx: &CanvasRenderingContext2d, table: &Table, scale: f64) -> Result<(), JsValue> {
    ctx.save();
    ctx.translate(table.x_position, table.y_position)?;

    let w = table.width + SELECTION_PAD * 2.0;
    let h = table.height + SELECTION_PAD * 2.0;
    let dash_world = SELECTION_DASH_PX / scale;

    ctx.set_stroke_style_str(SELECTION_STROKE);
    ctx.set_line_width(1.5 / scale);
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash_world.into());
    dash_array.push(&dash_world.into());
    ctx.set_line_dash(&dash_array)?;

    ctx.begin_path();
    if table.shape.is_round() {
        ctx.ellipse(0.0, 0.0, w / 2.0, h / 2.0, 0.0, 0.0, 2.0 * PI)?;
    } else {
        ctx.rect(-w / 2.0, -h / 2.0, w, h);
    }
    ctx.stroke();
    ctx.set_line_dash(&js_sys::Array::new())?;

    ctx.restore();
    Ok(())
}
