//! Vega-Lite JSON specs for the derived views.
//!
//! The core hands these to any Vega-Lite capable renderer; data is inlined so
//! each spec is self-contained.

use serde_json::{Value, json};

use crate::color::{TREND_COLOR, outcome_color, shades};
use crate::data::model::{OUTCOME_COLUMN, Outcome};
use crate::derive::{GroupedDistribution, HierarchyBreakdown, ProportionTable, ScatterSeries};

const SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";
const HEALTHY_SERIES: &str = "Healthy";
const TRANSPARENT: &str = "rgba(0, 0, 0, 0)";

/// Colour scale mapping outcome labels to the fixed hues.
fn outcome_scale() -> Value {
    json!({
        "domain": Outcome::ALL.iter().map(|o| o.label()).collect::<Vec<_>>(),
        "range": Outcome::ALL.iter().map(|o| outcome_color(*o).hex()).collect::<Vec<_>>(),
    })
}

fn base(title: &str) -> serde_json::Map<String, Value> {
    let mut spec = serde_json::Map::new();
    spec.insert("$schema".into(), json!(SCHEMA));
    spec.insert("title".into(), json!(title));
    spec.insert("background".into(), json!(TRANSPARENT));
    spec
}

// =============================================================================
// Sunburst
// =============================================================================

/// Two concentric arc rings: outcome inside, predictor value outside.
///
/// Outer segments are emitted grouped by outcome in the same order as the
/// inner ring so stacked angles line up.
pub fn hierarchy_spec(breakdown: &HierarchyBreakdown) -> Value {
    let mut inner = Vec::new();
    let mut outer = Vec::new();
    let mut order = 0usize;
    for node in &breakdown.outcomes {
        let color = outcome_color(node.outcome);
        inner.push(json!({
            "label": node.outcome.label(),
            "count": node.count,
            "color": color.hex(),
            "order": inner.len(),
        }));
        for (child, shade) in node.children.iter().zip(shades(color, node.children.len())) {
            outer.push(json!({
                "label": child.value.to_string(),
                "parent": node.outcome.label(),
                "count": child.count,
                "color": shade.hex(),
                "order": order,
            }));
            order += 1;
        }
    }

    let ring = |values: Vec<Value>, inner_radius: u32, outer_radius: u32| {
        json!({
            "data": { "values": values },
            "mark": { "type": "arc", "innerRadius": inner_radius, "outerRadius": outer_radius, "stroke": "white" },
            "encoding": {
                "theta": { "field": "count", "type": "quantitative", "stack": true },
                "order": { "field": "order", "type": "ordinal" },
                "color": { "field": "color", "type": "nominal", "scale": null, "legend": null },
                "tooltip": [
                    { "field": "label", "type": "nominal" },
                    { "field": "count", "type": "quantitative" }
                ]
            }
        })
    };

    let mut spec = base(&format!("{OUTCOME_COLUMN} by {}", breakdown.predictor));
    spec.insert(
        "layer".into(),
        json!([ring(inner, 0, 80), ring(outer, 80, 160)]),
    );
    Value::Object(spec)
}

// =============================================================================
// Stacked proportions
// =============================================================================

/// Stacked bars of `(Healthy, HeartDisease)` per category, in table order.
pub fn proportion_spec(table: &ProportionTable) -> Value {
    let mut values = Vec::with_capacity(table.rows.len() * 2);
    for row in &table.rows {
        let category = row.category.to_string();
        values.push(json!({ "category": category, "series": HEALTHY_SERIES, "value": row.healthy_fraction, "stack": 0 }));
        values.push(json!({ "category": category, "series": OUTCOME_COLUMN, "value": row.disease_rate, "stack": 1 }));
    }
    let sort: Vec<String> = table.rows.iter().map(|r| r.category.to_string()).collect();

    let mut spec = base(&format!("{OUTCOME_COLUMN} bar chart"));
    spec.insert("data".into(), json!({ "values": values }));
    spec.insert("mark".into(), json!("bar"));
    spec.insert(
        "encoding".into(),
        json!({
            "x": { "field": "category", "type": "nominal", "sort": sort, "title": table.predictor },
            "y": { "field": "value", "type": "quantitative", "stack": "zero", "scale": { "domain": [0, 1] }, "title": "Proportion" },
            "order": { "field": "stack", "type": "ordinal" },
            "color": {
                "field": "series",
                "type": "nominal",
                "scale": {
                    "domain": [HEALTHY_SERIES, OUTCOME_COLUMN],
                    "range": [outcome_color(Outcome::Healthy).hex(), outcome_color(Outcome::Disease).hex()]
                },
                "legend": { "title": "Legend" }
            }
        }),
    );
    Value::Object(spec)
}

// =============================================================================
// Scatter with optional lowess
// =============================================================================

pub fn scatter_spec(series: &ScatterSeries) -> Value {
    let points: Vec<Value> = series
        .points
        .iter()
        .map(|p| json!({ "x": p.x, "y": p.y, OUTCOME_COLUMN: p.outcome.label() }))
        .collect();

    let mut layers = vec![json!({
        "data": { "values": points },
        "mark": { "type": "point", "filled": true },
        "encoding": {
            "x": { "field": "x", "type": "quantitative", "title": series.x_predictor, "scale": { "zero": false } },
            "y": { "field": "y", "type": "quantitative", "title": series.y_predictor, "scale": { "zero": false }, "axis": { "gridColor": "lightgray" } },
            "color": { "field": OUTCOME_COLUMN, "type": "nominal", "scale": outcome_scale() }
        }
    })];

    if let Some(curve) = &series.smoothed {
        let values: Vec<Value> = curve
            .points
            .iter()
            .map(|(x, y)| json!({ "x": x, "Lowess": y }))
            .collect();
        layers.push(json!({
            "data": { "values": values },
            "mark": { "type": "line", "color": TREND_COLOR.hex() },
            "encoding": {
                "x": { "field": "x", "type": "quantitative" },
                "y": { "field": "Lowess", "type": "quantitative" }
            }
        }));
    }

    let mut spec = base(&format!("{} vs {}", series.y_predictor, series.x_predictor));
    spec.insert("layer".into(), Value::Array(layers));
    Value::Object(spec)
}

// =============================================================================
// Box plot
// =============================================================================

/// Box plot per outcome; the renderer computes the five-number summary.
pub fn distribution_spec(dist: &GroupedDistribution) -> Value {
    let values: Vec<Value> = Outcome::ALL
        .iter()
        .flat_map(|&outcome| {
            dist.group(outcome)
                .iter()
                .map(move |v| json!({ OUTCOME_COLUMN: outcome.label(), "value": v }))
        })
        .collect();

    let mut spec = base(&format!("{} by {OUTCOME_COLUMN}", dist.predictor));
    spec.insert("data".into(), json!({ "values": values }));
    spec.insert("mark".into(), json!({ "type": "boxplot", "extent": 1.5 }));
    spec.insert(
        "encoding".into(),
        json!({
            "x": { "field": OUTCOME_COLUMN, "type": "nominal" },
            "y": { "field": "value", "type": "quantitative", "title": dist.predictor, "scale": { "zero": false }, "axis": { "gridColor": "lightgray" } },
            "color": { "field": OUTCOME_COLUMN, "type": "nominal", "scale": outcome_scale(), "legend": null }
        }),
    );
    Value::Object(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use crate::derive::{
        CategoryNode, OutcomeNode, ProportionRow, ScatterPoint, SmoothedCurve,
    };

    #[test]
    fn test_proportion_spec_keeps_table_order() {
        let table = ProportionTable {
            predictor: "ST_Slope".into(),
            rows: vec![
                ProportionRow { category: CellValue::String("Flat".into()), healthy_fraction: 0.2, disease_rate: 0.8, count: 5 },
                ProportionRow { category: CellValue::String("Up".into()), healthy_fraction: 0.9, disease_rate: 0.1, count: 10 },
            ],
        };
        let spec = proportion_spec(&table);
        assert_eq!(spec["encoding"]["x"]["sort"], json!(["Flat", "Up"]));
        assert_eq!(spec["encoding"]["y"]["title"], "Proportion");
        assert_eq!(spec["encoding"]["color"]["scale"]["range"], json!(["#0000ff", "#ff0000"]));
        assert_eq!(spec["data"]["values"][0]["series"], "Healthy");
        assert_eq!(spec["data"]["values"][1]["value"], 0.8);
    }

    #[test]
    fn test_scatter_spec_adds_lowess_layer_only_when_smoothed() {
        let mut series = ScatterSeries {
            x_predictor: "Age".into(),
            y_predictor: "MaxHR".into(),
            points: vec![ScatterPoint { x: 40.0, y: 150.0, outcome: Outcome::Disease }],
            smoothed: None,
        };
        let plain = scatter_spec(&series);
        assert_eq!(plain["layer"].as_array().unwrap().len(), 1);
        assert_eq!(plain["layer"][0]["data"]["values"][0][OUTCOME_COLUMN], "1");

        series.smoothed = Some(SmoothedCurve { fraction: 0.5, points: vec![(40.0, 151.0)] });
        let smoothed = scatter_spec(&series);
        assert_eq!(smoothed["layer"][1]["mark"]["color"], "#000000");
        assert_eq!(smoothed["layer"][1]["data"]["values"][0]["Lowess"], 151.0);
    }

    #[test]
    fn test_hierarchy_spec_rings() {
        let breakdown = HierarchyBreakdown {
            predictor: "Sex".into(),
            outcomes: vec![OutcomeNode {
                outcome: Outcome::Healthy,
                count: 3,
                children: vec![
                    CategoryNode { value: CellValue::String("F".into()), count: 1 },
                    CategoryNode { value: CellValue::String("M".into()), count: 2 },
                ],
            }],
        };
        let spec = hierarchy_spec(&breakdown);
        assert_eq!(spec["layer"][0]["data"]["values"][0]["color"], "#0000ff");
        assert_eq!(spec["layer"][1]["data"]["values"].as_array().unwrap().len(), 2);
        assert_eq!(spec["layer"][1]["data"]["values"][1]["parent"], "0");
    }

    #[test]
    fn test_distribution_spec_flattens_groups() {
        let dist = GroupedDistribution {
            predictor: "Cholesterol".into(),
            healthy: vec![200.0],
            disease: vec![250.0, 300.0],
        };
        let spec = distribution_spec(&dist);
        let values = spec["data"]["values"].as_array().unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[2][OUTCOME_COLUMN], "1");
        assert_eq!(spec["mark"]["type"], "boxplot");
    }
}
