use std::fmt::Write;

use crate::geo::{Dataset, Projector, Viewport};
use crate::icon::{self, BuildingGlyph};
use crate::interaction::{InteractionCoordinator, RegionFill};
use crate::models::{PointOfInterest, RegionFeature};

pub const BACKGROUND_COLOR: u32 = 0xe6f2ff;
pub const REGION_BASE_COLOR: u32 = 0x7fb3d5;
pub const REGION_HOVER_COLOR: u32 = 0x5499c7;
pub const REGION_SELECTED_COLOR: u32 = 0xffcc66;
pub const REGION_OUTLINE_COLOR: u32 = 0xffffff;

/// Region outline width in layer units.
pub const REGION_OUTLINE_WIDTH: f64 = 1.0;

pub fn css_color(color: u32) -> String {
    format!("#{:06x}", color & 0xff_ffff)
}

impl RegionFill {
    pub fn color(self) -> u32 {
        match self {
            RegionFill::Idle => REGION_BASE_COLOR,
            RegionFill::Hover => REGION_HOVER_COLOR,
            RegionFill::Selected => REGION_SELECTED_COLOR,
        }
    }
}

/// Everything a repaint reads.
pub struct SceneInput<'a> {
    pub dataset: &'a Dataset,
    pub points: &'a [PointOfInterest],
    pub interaction: &'a InteractionCoordinator,
    pub viewport: Viewport,
    pub zoom: f64,
}

/// Build the full map layer as SVG markup: every region, then the visible
/// markers on top. The result replaces the previous frame wholesale.
pub fn build_scene(input: &SceneInput<'_>) -> String {
    let mut svg = String::with_capacity(64 * 1024);
    let projector = input.dataset.projector();

    for region in &input.dataset.regions {
        let fill = input.interaction.fill_for(region.id);
        build_region(&mut svg, region, &projector, input.viewport, Some(fill.color()));
    }

    let hovered = input.interaction.hovered_marker();
    for i in input
        .interaction
        .visible_markers(input.points, input.zoom, input.dataset)
    {
        build_marker(
            &mut svg,
            &input.points[i],
            &projector,
            input.viewport,
            input.zoom,
            hovered == Some(i),
        );
    }

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" style="position:absolute;top:0;left:0;overflow:visible;pointer-events:none;">{svg}</svg>"#,
        w = input.viewport.width,
        h = input.viewport.height,
    )
}

/// SVG path data for a region at the current viewport size. Each ring is one
/// closed subpath. `None` when nothing drawable is left.
pub fn region_path(region: &RegionFeature, projector: &Projector, viewport: Viewport) -> Option<String> {
    let mut d = String::new();
    for ring in region.shape.iter().flatten() {
        if ring.len() < 3 {
            continue;
        }
        for (i, point) in ring.iter().enumerate() {
            let p = projector.project_at(*point, viewport);
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{cmd}{:.2} {:.2}", p.x, p.y);
        }
        d.push('Z');
    }
    (!d.is_empty()).then_some(d)
}

/// Emit one region. `fill` overrides the idle base colour.
pub fn build_region(
    svg: &mut String,
    region: &RegionFeature,
    projector: &Projector,
    viewport: Viewport,
    fill: Option<u32>,
) {
    let Some(d) = region_path(region, projector, viewport) else {
        return;
    };
    let fill = css_color(fill.unwrap_or(REGION_BASE_COLOR));
    let stroke = css_color(REGION_OUTLINE_COLOR);
    let name = title_text(&region.name);
    let _ = write!(
        svg,
        r#"<path data-region="{id}" d="{d}" fill="{fill}" fill-rule="evenodd" stroke="{stroke}" stroke-width="{REGION_OUTLINE_WIDTH}" stroke-linejoin="round"><title>{name}</title></path>"#,
        id = region.id.0,
    );
}

/// Emit the building glyph for one point, anchored at its projected location.
pub fn build_marker(
    svg: &mut String,
    point: &PointOfInterest,
    projector: &Projector,
    viewport: Viewport,
    zoom: f64,
    hover: bool,
) {
    let anchor = projector.project(point.lon, point.lat, viewport.width, viewport.height);
    let g = BuildingGlyph::new(point.color, zoom, hover);
    let line = css_color(icon::LINE_COLOR);
    let sw = g.stroke;

    let _ = write!(
        svg,
        r#"<g class="poi" transform="translate({:.3} {:.3})"><title>{}</title>"#,
        anchor.x,
        anchor.y,
        title_text(&point.name)
    );

    let [(ax, ay), (bx, by), (cx, cy)] = g.roof;
    let _ = write!(
        svg,
        r#"<polygon points="{ax},{ay} {bx},{by} {cx},{cy}" fill="{}" stroke="{line}" stroke-width="{sw}"/>"#,
        css_color(g.roof_color)
    );

    let body = g.body;
    let _ = write!(
        svg,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{line}" stroke-width="{sw}"/>"#,
        body.x,
        body.y,
        body.w,
        body.h,
        css_color(g.body_color)
    );

    let column_fill = css_color(icon::COLUMN_COLOR);
    for col in &g.columns {
        let _ = write!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{column_fill}"/>"#,
            col.x, col.y, col.w, col.h
        );
    }

    let door = g.door;
    let _ = write!(
        svg,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{line}" stroke-width="{sw}"/>"#,
        door.x,
        door.y,
        door.w,
        door.h,
        css_color(icon::DOOR_COLOR)
    );

    let crest = g.crest;
    let _ = write!(
        svg,
        r#"<circle cx="{}" cy="{}" r="{}" fill="{}" stroke="{line}" stroke-width="{sw}"/>"#,
        crest.cx,
        crest.cy,
        crest.r,
        css_color(g.crest_color)
    );

    let shadow = g.shadow;
    let _ = write!(
        svg,
        r##"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" fill="#000000" fill-opacity="{}"/>"##,
        shadow.cx,
        shadow.cy,
        shadow.rx,
        shadow.ry,
        icon::SHADOW_ALPHA
    );

    svg.push_str("</g>");
}

/// Topmost visible marker whose glyph covers the layer-space point.
pub fn marker_at(
    points: &[PointOfInterest],
    visible: &[usize],
    projector: &Projector,
    viewport: Viewport,
    zoom: f64,
    layer_x: f64,
    layer_y: f64,
) -> Option<usize> {
    visible.iter().rev().copied().find(|&i| {
        let Some(point) = points.get(i) else {
            return false;
        };
        let anchor = projector.project(point.lon, point.lat, viewport.width, viewport.height);
        let e = BuildingGlyph::new(point.color, zoom, false).extent();
        let (lx, ly) = (layer_x - anchor.x, layer_y - anchor.y);
        lx >= e.x && lx <= e.x + e.w && ly >= e.y && ly <= e.y + e.h
    })
}

/// Escaped text content for a `<title>` element.
fn title_text(text: &str) -> String {
    svg::node::Text::new(text).to_string()
}
