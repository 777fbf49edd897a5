//! Selector constraints. Stateless projections of the current selections.

/// Options for the second scatter-axis selector: every numeric predictor
/// except the one held by the first selector, in catalog order.
///
/// A second selection that has just become invalid is not reassigned here.
pub fn second_predictor_options(all_numeric: &[String], first_selection: &str) -> Vec<String> {
    all_numeric
        .iter()
        .filter(|p| p.as_str() != first_selection)
        .cloned()
        .collect()
}

/// The fraction input is shown exactly when smoothing is requested.
pub fn smoothing_panel_visible(smoothing_requested: bool) -> bool {
    smoothing_requested
}
