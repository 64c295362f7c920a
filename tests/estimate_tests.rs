use chrono::{Datelike, NaiveDate};
use timeline_estimator::config::{ConfigError, EstimationConfig};
use timeline_estimator::estimate::{EstimateError, Estimator, PreparedGraph, estimate};
use timeline_estimator::work_item::WorkItem;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn chain() -> Vec<WorkItem> {
    vec![
        WorkItem::new("A", 5.0).blocking(&["B"]),
        WorkItem::new("B", 3.0).blocking(&["C"]),
        WorkItem::new("C", 2.0),
    ]
}

fn backlog() -> Vec<WorkItem> {
    vec![
        WorkItem::new("E1-1", 5.0).with_group("E1").blocking(&["E1-2", "E1-3"]),
        WorkItem::new("E1-2", 3.0).with_group("E1"),
        WorkItem::new("E1-3", 8.0).with_group("E1").blocking(&["E2-2"]),
        WorkItem::new("E2-1", 2.0).with_group("E2"),
        WorkItem::new("E2-2", 5.0).with_group("E2"),
        WorkItem::new("E2-3", 1.0).with_group("E2").with_status("Done"),
        WorkItem::new("LOOSE", 3.0),
    ]
}

#[test]
fn chain_with_one_engineer_matches_capacity() {
    for trials in [1, 10, 250] {
        let config = EstimationConfig::default()
            .with_team_size(1.0)
            .with_variance(0.0)
            .with_trials(trials)
            .with_start_date(d(2024, 1, 1));
        let result = estimate(chain(), &config).unwrap();
        assert_eq!(result.statistics.p50.workdays, 13);
        assert_eq!(result.statistics.p95.workdays, 13);
        assert_eq!(result.critical_path.keys, vec!["A", "B", "C"]);
        assert_eq!(result.critical_path.points, 10.0);
    }
}

#[test]
fn two_parallel_items_take_as_long_as_one() {
    let base = EstimationConfig::default()
        .with_variance(0.0)
        .with_coordination_factor(0.0)
        .with_trials(20);
    let pair = estimate(
        vec![WorkItem::new("A", 5.0), WorkItem::new("B", 5.0)],
        &base.clone().with_team_size(2.0),
    )
    .unwrap();
    let single = estimate(vec![WorkItem::new("A", 5.0)], &base.with_team_size(1.0)).unwrap();
    assert_eq!(
        pair.statistics.p50.workdays,
        single.statistics.p50.workdays
    );
}

#[test]
fn repeated_group_name_is_rejected() {
    let items = vec![WorkItem::new("A", 8.0).with_group("E1")];
    let config = EstimationConfig {
        groups: Some(vec!["E1".into(), "E1".into()]),
        ..EstimationConfig::default().with_trials(10).with_seed(1)
    };
    let err = estimate(items, &config).unwrap_err();
    assert!(matches!(
        err,
        EstimateError::Config(ConfigError::Invalid {
            parameter: "groups",
            ..
        })
    ));
}

#[test]
fn cycle_is_reported_and_repaired() {
    let items = vec![
        WorkItem::new("A", 1.0).blocking(&["B"]),
        WorkItem::new("B", 1.0).blocking(&["C"]),
        WorkItem::new("C", 1.0).blocking(&["A"]),
    ];
    let prepared = PreparedGraph::prepare(items).unwrap();
    assert_eq!(prepared.removed_edges.len(), 1);
    assert_eq!(prepared.dag.edge_count(), 2);
    assert_eq!(prepared.cycles.len(), 1);

    let config = EstimationConfig::default().with_trials(50).with_seed(5);
    let result = Estimator::new(&prepared, &config).execute().unwrap();
    assert_eq!(result.removed_edges.len(), 1);
    assert_eq!(result.truncated_trials, 0);
}

#[test]
fn fixed_seed_reproduces_estimate() {
    let config = EstimationConfig::default()
        .with_trials(500)
        .with_seed(2024)
        .with_start_date(d(2024, 6, 3));
    let first = estimate(backlog(), &config).unwrap();
    let second = estimate(backlog(), &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.seed, 2024);
}

#[test]
fn entropy_seed_is_reported_back() {
    let config = EstimationConfig::default().with_trials(50);
    let prepared = PreparedGraph::prepare(backlog()).unwrap();
    let first = Estimator::new(&prepared, &config).execute().unwrap();
    let replay = Estimator::new(&prepared, &config.clone().with_seed(first.seed))
        .execute()
        .unwrap();
    assert_eq!(first.statistics, replay.statistics);
}

#[test]
fn percentiles_are_ordered() {
    let config = EstimationConfig::default().with_trials(1000).with_seed(11);
    let result = estimate(backlog(), &config).unwrap();
    let s = &result.statistics;
    assert!(s.p50.workdays <= s.p85.workdays);
    assert!(s.p85.workdays <= s.p95.workdays);
    assert!(s.p50.end_date <= s.p85.end_date);
    assert_eq!(s.sorted_workdays.len(), 1000);
    assert!(s.sorted_workdays.windows(2).all(|w| w[0] <= w[1]));
    for group in &result.groups {
        let g = &group.statistics;
        assert!(g.p50.workdays <= g.p85.workdays && g.p85.workdays <= g.p95.workdays);
        assert!(g.p95.workdays <= s.p95.workdays);
    }
}

#[test]
fn p50_converges_with_more_trials() {
    let prepared = PreparedGraph::prepare(backlog()).unwrap();
    let small = EstimationConfig::default().with_trials(2_000).with_seed(1);
    let large = EstimationConfig::default().with_trials(20_000).with_seed(777);
    let a = Estimator::new(&prepared, &small).execute().unwrap();
    let b = Estimator::new(&prepared, &large).execute().unwrap();
    let diff = (a.statistics.p50.workdays as i64 - b.statistics.p50.workdays as i64).abs();
    assert!(diff <= 2, "p50 {} vs {}", a.statistics.p50.workdays, b.statistics.p50.workdays);
}

#[test]
fn end_dates_land_on_weekdays() {
    let config = EstimationConfig::default()
        .with_trials(300)
        .with_seed(9)
        .with_start_date(d(2026, 2, 18));
    let result = estimate(backlog(), &config).unwrap();
    let mut dates = vec![];
    for p in result.statistics.percentiles() {
        dates.push(p.end_date);
    }
    for group in &result.groups {
        for p in group.statistics.percentiles() {
            if p.workdays > 0 {
                dates.push(p.end_date);
            }
        }
    }
    for date in dates {
        assert!(date.weekday().num_days_from_monday() < 5, "{date} is a weekend");
    }
}

#[test]
fn group_breakdown_counts_items_and_points() {
    let config = EstimationConfig::default().with_trials(100).with_seed(3);
    let result = estimate(backlog(), &config).unwrap();

    let names: Vec<&str> = result.groups.iter().map(|g| g.group.as_str()).collect();
    assert_eq!(names, vec!["E1", "E2"]);

    let e1 = result.group("E1").unwrap();
    assert_eq!(e1.total_items, 3);
    assert_eq!(e1.remaining_points, 16.0);
    assert_eq!(e1.critical_path.keys, vec!["E1-1", "E1-3"]);

    let e2 = result.group("E2").unwrap();
    assert_eq!(e2.total_items, 3);
    assert_eq!(e2.completed_items, 1);
    assert_eq!(e2.remaining_items, 2);
    assert_eq!(e2.remaining_points, 7.0);
    assert_eq!(e2.completed_points, 1.0);

    assert_eq!(result.total_items, 7);
    assert_eq!(result.completed_items, 1);
    assert_eq!(result.remaining_points, 26.0);
    // E1-1 -> E1-3 -> E2-2
    assert_eq!(result.critical_path.points, 18.0);
}

#[test]
fn configured_groups_limit_breakdown() {
    let mut config = EstimationConfig::default().with_trials(20).with_seed(3);
    config.groups = Some(vec!["E2".to_string(), "MISSING".to_string()]);
    let result = estimate(backlog(), &config).unwrap();
    assert_eq!(result.groups.len(), 2);
    let missing = result.group("MISSING").unwrap();
    assert_eq!(missing.total_items, 0);
    assert_eq!(missing.statistics.p95.workdays, 0);
    assert_eq!(missing.statistics.p95.end_date, result.start_date);
}

#[test]
fn malformed_items_are_skipped_and_reported() {
    let mut items = backlog();
    items.push(WorkItem::new("", 3.0));
    items.push(WorkItem::new("BAD", -1.0));
    items.push(WorkItem::new("E2-1", 8.0));
    let config = EstimationConfig::default().with_trials(10).with_seed(1);
    let result = estimate(items, &config).unwrap();
    assert_eq!(result.skipped_items.len(), 3);
    assert_eq!(result.total_items, 7);
}

#[test]
fn tiny_horizon_truncates_trials() {
    let mut config = EstimationConfig::default().with_trials(10).with_seed(1);
    config.max_workdays = 3;
    let result = estimate(backlog(), &config).unwrap();
    assert_eq!(result.truncated_trials, 10);
    assert_eq!(result.statistics.max_workdays, 3);
}
