use std::f32::consts::TAU;

use eframe::egui::{self, Color32, Pos2, Stroke, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points};

use heart_explorer::color::{Rgb, TREND_COLOR, outcome_color, shades};
use heart_explorer::derive::{GroupedDistribution, HierarchyBreakdown, ProportionTable};
use heart_explorer::engine::ScatterView;
use heart_explorer::state::AppState;
use heart_explorer::data::model::OUTCOME_COLUMN;
use heart_explorer::{ExploreError, Outcome};

const PLOT_HEIGHT: f32 = 280.0;

fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}

fn error_label(ui: &mut Ui, e: &ExploreError) {
    let color = if e.is_recoverable() { Color32::from_rgb(200, 120, 0) } else { Color32::RED };
    ui.label(egui::RichText::new(e.to_string()).color(color));
}

// ---------------------------------------------------------------------------
// Categorical column: sunburst + stacked bars
// ---------------------------------------------------------------------------

pub fn categorical_views(ui: &mut Ui, state: &AppState) {
    let Some(session) = &state.session else {
        return;
    };

    ui.add_space(8.0);
    ui.label(egui::RichText::new("Heart disease sunburst chart").size(16.0));
    match &session.hierarchy {
        Ok(h) if h.is_empty() => {
            ui.label("No patients match the current filters.");
        }
        Ok(h) => sunburst(ui, h),
        Err(e) => error_label(ui, e),
    }

    ui.add_space(8.0);
    ui.label(egui::RichText::new("Heart disease bar chart").size(16.0));
    match &session.proportions {
        Ok(table) => {
            proportion_chart(ui, table);
            proportion_table(ui, table);
        }
        Err(e) => error_label(ui, e),
    }
}

/// Fill an annular sector, split into slivers so every polygon is convex.
fn ring_segment(
    painter: &egui::Painter,
    center: Pos2,
    radii: (f32, f32),
    angles: (f32, f32),
    fill: Color32,
) {
    let (r_in, r_out) = radii;
    let (start, end) = angles;
    let steps = ((end - start) / (TAU / 180.0)).ceil().max(1.0) as usize;
    let at = |r: f32, a: f32| center + Vec2::angled(a) * r;
    for i in 0..steps {
        let a0 = start + (end - start) * i as f32 / steps as f32;
        let a1 = start + (end - start) * (i + 1) as f32 / steps as f32;
        let points = if r_in <= 0.0 {
            vec![center, at(r_out, a0), at(r_out, a1)]
        } else {
            vec![at(r_in, a0), at(r_out, a0), at(r_out, a1), at(r_in, a1)]
        };
        painter.add(egui::Shape::convex_polygon(points, fill, Stroke::NONE));
    }
    for a in [start, end] {
        painter.line_segment([at(r_in, a), at(r_out, a)], Stroke::new(1.0, Color32::WHITE));
    }
}

fn sunburst(ui: &mut Ui, breakdown: &HierarchyBreakdown) {
    let size = ui.available_width().min(PLOT_HEIGHT + 40.0);
    let (response, painter) = ui.allocate_painter(Vec2::splat(size), egui::Sense::hover());
    let center = response.rect.center();
    let r_outer = size / 2.0 - 4.0;
    let r_inner = r_outer * 0.5;
    let total = breakdown.total().max(1) as f32;
    let text_color = Color32::WHITE;

    let mut angle = -TAU / 4.0;
    for node in &breakdown.outcomes {
        let base = outcome_color(node.outcome);
        let span = TAU * node.count as f32 / total;
        ring_segment(&painter, center, (0.0, r_inner), (angle, angle + span), color32(base));
        painter.text(
            center + Vec2::angled(angle + span / 2.0) * r_inner * 0.55,
            egui::Align2::CENTER_CENTER,
            node.outcome.label(),
            egui::FontId::proportional(14.0),
            text_color,
        );

        let mut child_angle = angle;
        for (child, shade) in node.children.iter().zip(shades(base, node.children.len())) {
            let child_span = TAU * child.count as f32 / total;
            ring_segment(
                &painter,
                center,
                (r_inner, r_outer),
                (child_angle, child_angle + child_span),
                color32(shade),
            );
            if child_span > 0.15 {
                painter.text(
                    center
                        + Vec2::angled(child_angle + child_span / 2.0) * (r_inner + r_outer) / 2.0,
                    egui::Align2::CENTER_CENTER,
                    child.value.to_string(),
                    egui::FontId::proportional(11.0),
                    text_color,
                );
            }
            child_angle += child_span;
        }
        angle += span;
    }

    if response.hovered() {
        response.on_hover_ui(|ui: &mut Ui| {
            for node in &breakdown.outcomes {
                ui.strong(format!("{OUTCOME_COLUMN} = {}: {}", node.outcome, node.count));
                for child in &node.children {
                    let predictor = &breakdown.predictor;
                    ui.label(format!("  {predictor} = {}: {}", child.value, child.count));
                }
            }
        });
    }
}

fn proportion_chart(ui: &mut Ui, table: &ProportionTable) {
    let labels: Vec<String> = table.rows.iter().map(|r| r.category.to_string()).collect();

    let healthy = BarChart::new(
        table
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| Bar::new(i as f64, r.healthy_fraction).width(0.6))
            .collect(),
    )
    .name("Healthy")
    .color(color32(outcome_color(Outcome::Healthy)));

    let disease = BarChart::new(
        table
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| Bar::new(i as f64, r.disease_rate).width(0.6))
            .collect(),
    )
    .name(OUTCOME_COLUMN)
    .color(color32(outcome_color(Outcome::Disease)))
    .stack_on(&[&healthy]);

    Plot::new("bar_chart")
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .y_axis_label("Proportion")
        .x_axis_label(table.predictor.clone())
        .include_y(0.0)
        .include_y(1.0)
        .allow_drag(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                labels.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(healthy);
            plot_ui.bar_chart(disease);
        });
}

fn proportion_table(ui: &mut Ui, table: &ProportionTable) {
    ui.push_id("proportion_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(80.0))
            .columns(Column::auto().at_least(70.0), 3)
            .header(20.0, |mut header| {
                for title in [table.predictor.as_str(), "Healthy", "HeartDisease", "n"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for row in &table.rows {
                    body.row(18.0, |mut r| {
                        r.col(|ui| {
                            ui.label(row.category.to_string());
                        });
                        r.col(|ui| {
                            ui.label(format!("{:.3}", row.healthy_fraction));
                        });
                        r.col(|ui| {
                            ui.label(format!("{:.3}", row.disease_rate));
                        });
                        r.col(|ui| {
                            ui.label(row.count.to_string());
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Numerical column: scatter (+ lowess) and box plot
// ---------------------------------------------------------------------------

pub fn scatter_view(ui: &mut Ui, state: &AppState) {
    let Some(session) = &state.session else {
        return;
    };
    let view: &ScatterView = match &session.scatter {
        Ok(view) => view,
        Err(e) => {
            error_label(ui, e);
            return;
        }
    };
    if let Some(e) = &view.smoothing_error {
        error_label(ui, e);
    }

    let series = &view.series;
    Plot::new("scatter_plot")
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(series.x_predictor.clone())
        .y_axis_label(series.y_predictor.clone())
        .show(ui, |plot_ui| {
            for outcome in Outcome::ALL {
                let points: Vec<[f64; 2]> = series
                    .points
                    .iter()
                    .filter(|p| p.outcome == outcome)
                    .map(|p| [p.x, p.y])
                    .collect();
                plot_ui.points(
                    Points::new(PlotPoints::new(points))
                        .name(outcome.label())
                        .color(color32(outcome_color(outcome)))
                        .radius(2.5),
                );
            }
            if let Some(curve) = &series.smoothed {
                let points: PlotPoints = curve.points.iter().map(|&(x, y)| [x, y]).collect();
                plot_ui.line(
                    Line::new(points)
                        .name("Lowess")
                        .color(color32(TREND_COLOR))
                        .width(2.0),
                );
            }
        });
}

/// Five-number summary with 1.5 IQR whiskers, plus the points beyond them.
#[derive(Debug, Clone, PartialEq)]
struct BoxSummary {
    lower_whisker: f64,
    q1: f64,
    median: f64,
    q3: f64,
    upper_whisker: f64,
    outliers: Vec<f64>,
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let fence = 1.5 * (q3 - q1);
    let inside = |v: &&f64| **v >= q1 - fence && **v <= q3 + fence;
    let lower_whisker = sorted.iter().find(inside).copied().unwrap_or(q1);
    let upper_whisker = sorted.iter().rev().find(inside).copied().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lower_whisker || *v > upper_whisker)
        .collect();

    Some(BoxSummary {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

fn box_plot(ui: &mut Ui, dist: &GroupedDistribution) {
    Plot::new("box_plot")
        .height(PLOT_HEIGHT)
        .x_axis_label(OUTCOME_COLUMN)
        .y_axis_label(dist.predictor.clone())
        .x_axis_formatter(|mark, _range| match mark.value {
            v if v == 0.0 => "0".to_string(),
            v if v == 1.0 => "1".to_string(),
            _ => String::new(),
        })
        .show(ui, |plot_ui| {
            for outcome in Outcome::ALL {
                let Some(summary) = box_summary(dist.group(outcome)) else {
                    continue;
                };
                let color = color32(outcome_color(outcome));
                let position = outcome.as_f64();
                let elem = BoxElem::new(
                    position,
                    BoxSpread::new(
                        summary.lower_whisker,
                        summary.q1,
                        summary.median,
                        summary.q3,
                        summary.upper_whisker,
                    ),
                )
                .box_width(0.5)
                .whisker_width(0.3)
                .fill(color.gamma_multiply(0.3))
                .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(outcome.label()).color(color));

                if !summary.outliers.is_empty() {
                    let points: Vec<[f64; 2]> =
                        summary.outliers.iter().map(|&v| [position, v]).collect();
                    plot_ui.points(Points::new(PlotPoints::new(points)).color(color).radius(2.0));
                }
            }
        });
}

pub fn distribution_view(ui: &mut Ui, state: &AppState) {
    let Some(session) = &state.session else {
        return;
    };
    match &session.distribution {
        Ok(dist) => box_plot(ui, dist),
        Err(e) => error_label(ui, e),
    }
}
