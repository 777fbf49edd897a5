use std::sync::Arc;

use heart_explorer::data::loader::parse_csv;
use heart_explorer::derive::{hierarchy, proportions};
use heart_explorer::{Dataset, ExploreError, Explorer, FilterState, SexFilter, filter};

const HEART_CSV: &str = "\
Age,Sex,ChestPainType,RestingBP,Cholesterol,FastingBS,RestingECG,MaxHR,ExerciseAngina,Oldpeak,ST_Slope,HeartDisease
40,M,ATA,140,289,0,Normal,172,N,0,Up,0
49,F,NAP,160,180,0,Normal,156,N,1,Flat,1
37,M,ATA,130,283,0,ST,98,N,0,Up,0
48,F,ASY,138,214,0,Normal,108,Y,1.5,Flat,1
54,M,NAP,150,195,0,Normal,122,N,0,Up,0
39,M,NAP,120,339,0,Normal,170,N,0,Up,0
45,F,ATA,130,237,0,Normal,170,N,0,Up,0
54,M,ATA,110,208,0,Normal,142,N,0,Up,0
37,M,ASY,140,207,0,Normal,130,Y,1.5,Flat,1
48,F,ATA,120,284,0,Normal,120,N,0,Up,0
58,M,ATA,136,164,0,ST,99,Y,2,Flat,1
65,M,ASY,140,306,1,Normal,87,Y,1.5,Flat,1
";

fn heart() -> Dataset {
    parse_csv(HEART_CSV.as_bytes()).unwrap()
}

fn explorer() -> Explorer {
    Explorer::new(Arc::new(heart()))
}

#[test]
fn scenario_a_sex_and_age_filter() {
    let csv = "Age,Sex,HeartDisease\n40,M,1\n45,F,0\n70,M,1\n";
    let ds = parse_csv(csv.as_bytes()).unwrap();

    assert_eq!(filter(&ds, &FilterState::new(SexFilter::Any, 40, 70)).len(), 3);

    let males = filter(&ds, &FilterState::new(SexFilter::Only("M".into()), 40, 70));
    let ages: Vec<i64> = males.rows().map(|r| r.age()).collect();
    assert_eq!(ages, vec![40, 70]);
}

#[test]
fn scenario_b_proportion_table() {
    let csv = "Age,Sex,Group,HeartDisease\n40,M,A,1\n41,M,A,0\n42,F,B,0\n";
    let ds = parse_csv(csv.as_bytes()).unwrap();
    let table = proportions(&filter(&ds, &FilterState::unfiltered(&ds)), "Group").unwrap();

    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].category.to_string(), "A");
    assert_eq!(table.rows[0].disease_rate, 0.5);
    assert_eq!(table.rows[0].healthy_fraction, 0.5);
    assert_eq!(table.rows[1].category.to_string(), "B");
    assert_eq!(table.rows[1].disease_rate, 0.0);
    assert_eq!(table.rows[1].healthy_fraction, 1.0);
}

#[test]
fn scenario_c_second_predictor_options() {
    let csv = "Age,Sex,Cholesterol,MaxHR,HeartDisease\n40,M,289,172,0\n";
    let ex = Explorer::new(Arc::new(parse_csv(csv.as_bytes()).unwrap()));
    assert_eq!(ex.second_predictor_options("Age"), vec!["Cholesterol", "MaxHR"]);
}

#[test]
fn scenario_d_unparsable_fraction_keeps_base_series() {
    let ex = explorer();
    let filters = FilterState::unfiltered(ex.dataset());
    let view = ex
        .recompute_scatter(&filters, "Age", "MaxHR", true, "abc")
        .unwrap();

    assert!(matches!(
        view.smoothing_error,
        Some(ExploreError::InvalidSmoothingFraction(_))
    ));
    assert_eq!(view.series.points.len(), ex.dataset().len());
    assert!(view.series.smoothed.is_none());
}

#[test]
fn empty_subset_gives_empty_views() {
    let ex = explorer();
    let filters = FilterState::new(SexFilter::Any, 70, 80);

    assert!(ex.recompute_hierarchy(&filters, "ChestPainType").unwrap().is_empty());
    assert!(ex.recompute_proportions(&filters, "ST_Slope").unwrap().is_empty());
    assert!(ex.recompute_distribution(&filters, "Cholesterol").unwrap().is_empty());
    let view = ex.recompute_scatter(&filters, "Age", "MaxHR", false, "0").unwrap();
    assert!(view.series.is_empty());
    assert!(view.smoothing_error.is_none());
}

#[test]
fn smoothing_on_empty_subset_is_unavailable() {
    let ex = explorer();
    let filters = FilterState::new(SexFilter::Any, 70, 80);
    let view = ex.recompute_scatter(&filters, "Age", "MaxHR", true, "0.5").unwrap();
    assert!(matches!(
        view.smoothing_error,
        Some(ExploreError::SmoothingUnavailable(_))
    ));
}

#[test]
fn lowess_overlay_is_monotonic_in_x() {
    let ex = explorer();
    let filters = FilterState::unfiltered(ex.dataset());
    let view = ex.recompute_scatter(&filters, "Age", "MaxHR", true, "0.8").unwrap();

    assert!(view.smoothing_error.is_none(), "{:?}", view.smoothing_error);
    let curve = view.series.smoothed.expect("overlay");
    assert_eq!(curve.fraction, 0.8);
    assert!(!curve.points.is_empty());
    assert!(curve.points.windows(2).all(|w| w[0].0 <= w[1].0));
    assert!(curve.points.iter().all(|(_, y)| y.is_finite()));
}

#[test]
fn filter_is_idempotent() {
    let ds = heart();
    for filters in [
        FilterState::new(SexFilter::Any, 40, 55),
        FilterState::new(SexFilter::Only("F".into()), 30, 80),
        FilterState::new(SexFilter::Only("M".into()), 50, 50),
    ] {
        let once = filter(&ds, &filters);
        let twice = filter(&ds, &filters);
        assert_eq!(once.indices(), twice.indices());
        assert!(once.indices().windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn filter_is_monotonic() {
    let ds = heart();
    let (min_age, max_age) = ds.age_range();
    for sex in ["M", "F"] {
        let mut previous = 0;
        for high in (min_age..=max_age).step_by(5) {
            let only = FilterState::new(SexFilter::Only(sex.into()), min_age, high);
            let specific = filter(&ds, &only);
            let any = filter(&ds, &FilterState::new(SexFilter::Any, min_age, high));
            assert!(specific.len() >= previous);
            assert!(any.len() >= specific.len());
            assert!(specific.indices().iter().all(|i| any.indices().contains(i)));
            previous = specific.len();
        }
    }
}

#[test]
fn proportion_rows_sum_to_one_and_are_sorted() {
    let ds = heart();
    let subset = filter(&ds, &FilterState::unfiltered(&ds));
    for predictor in ds.categorical_predictors() {
        let table = proportions(&subset, predictor).unwrap();
        for row in &table.rows {
            assert!((row.healthy_fraction + row.disease_rate - 1.0).abs() < 1e-12);
        }
        assert!(table.rows.windows(2).all(|w| w[0].disease_rate >= w[1].disease_rate));
    }
}

#[test]
fn hierarchy_counts_match_subset() {
    let ds = heart();
    let subset = filter(&ds, &FilterState::new(SexFilter::Only("M".into()), 0, 100));
    let h = hierarchy(&subset, "ExerciseAngina").unwrap();
    assert_eq!(h.total(), subset.len());
    for node in &h.outcomes {
        assert_eq!(node.count, node.children.iter().map(|c| c.count).sum::<usize>());
    }
}

#[test]
fn mutual_exclusion_and_visibility_laws() {
    let ex = explorer();
    for v in ex.dataset().numeric_predictors() {
        assert!(!ex.second_predictor_options(v).contains(v));
    }
    assert!(ex.smoothing_panel_visible(true));
    assert!(!ex.smoothing_panel_visible(false));
}

#[test]
fn invalid_predictor_is_local_to_its_view() {
    let ex = explorer();
    let filters = FilterState::unfiltered(ex.dataset());
    assert!(matches!(
        ex.recompute_hierarchy(&filters, "Cholesterol"),
        Err(ExploreError::InvalidPredictor { .. })
    ));
    assert!(ex.recompute_distribution(&filters, "Cholesterol").is_ok());
}
