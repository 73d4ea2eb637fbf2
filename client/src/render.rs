use sampmap_shared::business::ICON_SIZE;
use sampmap_shared::{Business, DisplayPoint, LineStyle, MapSession, RulerOverlay};
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::images::{BusinessIcon, icon_for};
use crate::viewport::Viewport;

const BACKGROUND: &str = "#0c0e17";
const IMAGE_PLACEHOLDER: &str = "#161921";
const RULER_COLOR: &str = "#ffcc00";
const RULER_WIDTH: f64 = 2.0;
const RULER_DASH: [f64; 2] = [6.0, 4.0];
const LABEL_FONT: &str = "600 13px 'JetBrains Mono', monospace";
const MARKER_COLOR: &str = "#e5484d";

/// Ruler endpoint circle radius in CSS pixels; also the drag grab radius.
pub const HANDLE_RADIUS: f64 = 6.0;

/// Marker pin geometry: the head circle sits this far above the anchor point.
const PIN_HEAD_OFFSET: f64 = 20.0;
const PIN_HEAD_RADIUS: f64 = 9.0;

pub struct Scene<'a> {
    pub vp: &'a Viewport,
    pub session: &'a MapSession,
    pub businesses: &'a [Business],
    pub map_image: Option<&'a HtmlImageElement>,
    pub icons: &'a [BusinessIcon],
    pub width: f64,
    pub height: f64,
}

pub fn draw_scene(ctx: &CanvasRenderingContext2d, scene: &Scene<'_>, dpr: f64) {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, scene.width, scene.height);

    draw_map_image(ctx, scene);
    draw_businesses(ctx, scene);
    if let Some(overlay) = scene.session.ruler().overlay() {
        draw_ruler(ctx, scene.vp, &overlay);
    }
    draw_marker(ctx, scene);
}

fn draw_map_image(ctx: &CanvasRenderingContext2d, scene: &Scene<'_>) {
    let map_size = scene.session.projection().map_size();
    let (x0, y0) = scene
        .vp
        .display_to_screen(DisplayPoint::new(0.0, 0.0));
    let size = map_size * scene.vp.scale;

    match scene.map_image {
        Some(image) => {
            ctx.draw_image_with_html_image_element_and_dw_and_dh(image, x0, y0, size, size)
                .ok();
        }
        None => {
            ctx.set_fill_style_str(IMAGE_PLACEHOLDER);
            ctx.fill_rect(x0, y0, size, size);
        }
    }
}

fn draw_businesses(ctx: &CanvasRenderingContext2d, scene: &Scene<'_>) {
    let projection = scene.session.projection();
    let half = ICON_SIZE / 2.0;
    for business in scene.businesses {
        let (sx, sy) = scene.vp.display_to_screen(business.display_point(projection));
        if sx < -ICON_SIZE
            || sy < -ICON_SIZE
            || sx > scene.width + ICON_SIZE
            || sy > scene.height + ICON_SIZE
        {
            continue;
        }
        match icon_for(scene.icons, business.kind) {
            Some(image) => {
                ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    image,
                    sx - half,
                    sy - half,
                    ICON_SIZE,
                    ICON_SIZE,
                )
                .ok();
            }
            None => {
                ctx.begin_path();
                ctx.arc(sx, sy, half / 2.0, 0.0, std::f64::consts::TAU).ok();
                ctx.set_fill_style_str("#f2c14e");
                ctx.fill();
            }
        }
    }
}

fn draw_ruler(ctx: &CanvasRenderingContext2d, vp: &Viewport, overlay: &RulerOverlay) {
    let (ax, ay) = vp.display_to_screen(overlay.a);
    let (bx, by) = vp.display_to_screen(overlay.b);

    ctx.save();
    ctx.set_stroke_style_str(RULER_COLOR);
    ctx.set_line_width(RULER_WIDTH);
    if overlay.style == LineStyle::Tentative {
        let dash = js_sys::Array::of2(&JsValue::from(RULER_DASH[0]), &JsValue::from(RULER_DASH[1]));
        ctx.set_line_dash(&dash).ok();
    }
    ctx.begin_path();
    ctx.move_to(ax, ay);
    ctx.line_to(bx, by);
    ctx.stroke();
    ctx.restore();

    draw_handle(ctx, ax, ay);
    if overlay.b_placed {
        draw_handle(ctx, bx, by);
    }

    let (lx, ly) = vp.display_to_screen(overlay.label_at);
    draw_label(ctx, &overlay.label, lx, ly);
}

fn draw_handle(ctx: &CanvasRenderingContext2d, x: f64, y: f64) {
    ctx.begin_path();
    ctx.arc(x, y, HANDLE_RADIUS, 0.0, std::f64::consts::TAU).ok();
    ctx.set_fill_style_str("#ffffff");
    ctx.fill();
    ctx.set_stroke_style_str(RULER_COLOR);
    ctx.set_line_width(RULER_WIDTH);
    ctx.stroke();
}

fn draw_label(ctx: &CanvasRenderingContext2d, text: &str, x: f64, y: f64) {
    ctx.set_font(LABEL_FONT);
    let width = ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0);
    let pad_x = 6.0;
    let box_h = 20.0;
    // Sit just above the segment midpoint.
    let top = y - box_h - 6.0;

    ctx.set_fill_style_str("rgba(12, 14, 23, 0.85)");
    ctx.fill_rect(x - width / 2.0 - pad_x, top, width + pad_x * 2.0, box_h);
    ctx.set_fill_style_str(RULER_COLOR);
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(text, x, top + box_h / 2.0).ok();
}

fn draw_marker(ctx: &CanvasRenderingContext2d, scene: &Scene<'_>) {
    let Some(marker) = scene.session.marker().current() else {
        return;
    };
    let (x, y) = scene.vp.display_to_screen(marker.position);
    let head_y = y - PIN_HEAD_OFFSET;

    ctx.save();
    if marker.dragging {
        ctx.set_global_alpha(0.7);
    }
    ctx.begin_path();
    ctx.move_to(x, y);
    ctx.line_to(x - PIN_HEAD_RADIUS * 0.8, head_y + PIN_HEAD_RADIUS * 0.6);
    ctx.arc(
        x,
        head_y,
        PIN_HEAD_RADIUS,
        std::f64::consts::PI * 0.8,
        std::f64::consts::PI * 0.2,
    )
    .ok();
    ctx.close_path();
    ctx.set_fill_style_str(MARKER_COLOR);
    ctx.fill();
    ctx.set_stroke_style_str("#ffffff");
    ctx.set_line_width(1.5);
    ctx.stroke();

    ctx.begin_path();
    ctx.arc(x, head_y, PIN_HEAD_RADIUS * 0.35, 0.0, std::f64::consts::TAU)
        .ok();
    ctx.set_fill_style_str("#ffffff");
    ctx.fill();
    ctx.restore();
}

/// Whether the screen point lies on a business icon or the marker pin.
pub fn icon_at(scene: &Scene<'_>, sx: f64, sy: f64) -> bool {
    marker_pin_at(scene.vp, scene.session, sx, sy) || business_at(scene, sx, sy).is_some()
}

pub fn marker_pin_at(vp: &Viewport, session: &MapSession, sx: f64, sy: f64) -> bool {
    let Some(marker) = session.marker().current() else {
        return false;
    };
    let (x, y) = vp.display_to_screen(marker.position);
    let dx = sx - x;
    let dy = sy - (y - PIN_HEAD_OFFSET);
    (dx * dx + dy * dy).sqrt() <= PIN_HEAD_RADIUS + 2.0
        || (dx.abs() <= PIN_HEAD_RADIUS * 0.5 && sy <= y && sy >= y - PIN_HEAD_OFFSET)
}

/// Topmost business whose icon covers the screen point.
pub fn business_at<'a>(scene: &Scene<'a>, sx: f64, sy: f64) -> Option<&'a Business> {
    let projection = scene.session.projection();
    let half = ICON_SIZE / 2.0;
    scene.businesses.iter().rev().find(|business| {
        let (x, y) = scene.vp.display_to_screen(business.display_point(projection));
        (sx - x).abs() <= half && (sy - y).abs() <= half
    })
}
