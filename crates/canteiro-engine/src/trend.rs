//! S-curve trend generation
//!
//! Samples a project's planned and actual cumulative progress over time.
//!
//! - **Planned** follows a cubic S-curve `100 * (3t² - 2t³)` across the
//!   baseline window (earliest planned start to latest planned end).
//! - **Actual** is the duration-weighted progress of every dated task,
//!   defined up to `today`. A task in flight counts at the smaller of its
//!   elapsed fraction and its reported completion.
//! - **Projected** extends the current progress past `today` at the average
//!   velocity observed since the earliest start, capped at 100.
//!
//! Only tasks with both a start and an end date take part. With none left
//! the result is [`Trend::InsufficientData`], never a zero-filled series.
//!
//! # Example
//!
//! ```rust
//! use canteiro_core::config::TrendConfig;
//! use canteiro_core::{Origin, Task};
//! use canteiro_engine::trend::{generate, Trend};
//!
//! let tasks = vec![Task::new("Estrutura", Origin::Execution).dates(100.0, 200.0).complete(50.0)];
//! let Trend::Curve(series) = generate(&tasks, 150.0, &TrendConfig::default()) else {
//!     panic!("dated tasks produce a curve");
//! };
//! assert_eq!(series.current_progress, 50.0);
//! assert_eq!(series.points.first().map(|p| p.serial), Some(100.0));
//! ```

use canteiro_core::config::TrendConfig;
use canteiro_core::serial;
use canteiro_core::status::DeviationStatus;
use canteiro_core::{Serial, Task};
use chrono::NaiveDate;
use serde::Serialize;

// ============================================================================
// Series
// ============================================================================

/// One sample of the curve
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendPoint {
    pub serial: Serial,
    pub date: Option<NaiveDate>,
    pub planned: f64,
    /// Defined up to and including today
    pub actual: Option<f64>,
    /// Defined strictly after today
    pub projected: Option<f64>,
    /// Change in `planned` since the previous sample
    pub velocity_planned: f64,
    /// Change in `actual` since the previous sample
    pub velocity_actual: Option<f64>,
    /// Milestones finished with an end date on or before this sample
    pub milestones_accumulated: usize,
    /// Milestones whose planned end falls on or before this sample
    pub milestones_planned: usize,
    /// `actual - planned`, in percentage points
    pub deviation: Option<f64>,
}

/// Sampled curve plus figures derived at `today`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendSeries {
    pub points: Vec<TrendPoint>,
    pub today: Serial,
    /// Earliest actual start among dated tasks
    pub start: Serial,
    pub end: Serial,
    /// Actual progress at today
    pub current_progress: f64,
    /// Average progress points per day since `start`
    pub velocity: f64,
    /// Serial at which the projection reaches 100, `None` without velocity
    pub forecast_completion: Option<Serial>,
    /// Deviation at the latest sample not after today
    pub current_deviation: Option<f64>,
    pub deviation_status: Option<DeviationStatus>,
}

impl TrendSeries {
    pub fn forecast_date(&self) -> Option<NaiveDate> {
        self.forecast_completion.and_then(serial::to_date)
    }
}

/// Result of trend generation
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Trend {
    /// No task has both dates
    InsufficientData,
    Curve(TrendSeries),
}

impl Trend {
    pub fn series(&self) -> Option<&TrendSeries> {
        match self {
            Trend::InsufficientData => None,
            Trend::Curve(series) => Some(series),
        }
    }
}

// ============================================================================
// Curves
// ============================================================================

/// Smoothstep `3t² - 2t³` on `[0, 1]`
pub fn s_curve(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Planned cumulative progress at `day` for a baseline window
pub fn planned_progress_at(day: Serial, baseline_start: Serial, baseline_end: Serial) -> f64 {
    if baseline_end <= baseline_start {
        return if day >= baseline_start { 100.0 } else { 0.0 };
    }
    if day <= baseline_start {
        0.0
    } else if day >= baseline_end {
        100.0
    } else {
        100.0 * s_curve((day - baseline_start) / (baseline_end - baseline_start))
    }
}

/// Duration-weighted actual progress at `day`; 0 when no task has a positive span
pub fn actual_progress_at(tasks: &[&Task], day: Serial) -> f64 {
    let mut total_weight = 0.0;
    let mut weighted = 0.0;

    for task in tasks {
        let weight = (task.end - task.start).max(0.0);
        total_weight += weight;
        if weight == 0.0 || day <= task.start {
            continue;
        }
        let pct = task.percent_complete.clamp(0.0, 100.0);
        let reached = if day >= task.end {
            pct
        } else {
            let elapsed = (day - task.start) / weight;
            (elapsed * 100.0).min(pct)
        };
        weighted += weight * reached;
    }

    if total_weight > 0.0 {
        weighted / total_weight
    } else {
        0.0
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Generate the trend for a task list as seen on `today`
pub fn generate<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    today: Serial,
    config: &TrendConfig,
) -> Trend {
    let tasks: Vec<&Task> = tasks.into_iter().filter(|t| t.has_dates()).collect();
    if tasks.is_empty() {
        return Trend::InsufficientData;
    }

    let start = fold(&tasks, f64::min, |t| t.start);
    let latest_end = fold(&tasks, f64::max, |t| t.end);
    let latest_baseline = fold(&tasks, f64::max, |t| t.baseline_end);
    let end = latest_end
        .max(latest_baseline)
        .max(today + f64::from(config.horizon_days));

    let baseline_start = fold(&tasks, f64::min, |t| t.planned_start());
    let baseline_end = fold(&tasks, f64::max, |t| t.planned_end());

    let current_progress = actual_progress_at(&tasks, today);
    let velocity = if today > start {
        current_progress / (today - start)
    } else {
        0.0
    };
    let forecast_completion = if velocity > 0.0 {
        Some(today + (100.0 - current_progress).max(0.0) / velocity)
    } else {
        None
    };

    let milestones: Vec<&Task> = tasks.iter().copied().filter(|t| t.is_milestone()).collect();

    let mut points: Vec<TrendPoint> = Vec::new();
    for day in serial::range(start, end, f64::from(config.sample_interval_days)) {
        let planned = planned_progress_at(day, baseline_start, baseline_end);
        let actual = (day <= today).then(|| actual_progress_at(&tasks, day));
        let projected =
            (day > today).then(|| (current_progress + velocity * (day - today)).min(100.0));

        let (velocity_planned, velocity_actual) = match points.last() {
            Some(prev) => (
                planned - prev.planned,
                actual.zip(prev.actual).map(|(a, p)| a - p),
            ),
            None => (0.0, actual.map(|_| 0.0)),
        };

        points.push(TrendPoint {
            serial: day,
            date: serial::to_date(day),
            planned,
            actual,
            projected,
            velocity_planned,
            velocity_actual,
            milestones_accumulated: milestones
                .iter()
                .filter(|m| m.end <= day && m.is_complete())
                .count(),
            milestones_planned: milestones.iter().filter(|m| m.planned_end() <= day).count(),
            deviation: actual.map(|a| a - planned),
        });
    }

    let current_deviation = points
        .iter()
        .rev()
        .find(|p| p.serial <= today)
        .and_then(|p| p.deviation);

    Trend::Curve(TrendSeries {
        points,
        today,
        start,
        end,
        current_progress,
        velocity,
        forecast_completion,
        current_deviation,
        deviation_status: current_deviation.map(DeviationStatus::from_deviation),
    })
}

fn fold(tasks: &[&Task], pick: fn(f64, f64) -> f64, field: impl Fn(&Task) -> Serial) -> Serial {
    tasks
        .iter()
        .map(|t| field(*t))
        .filter(|v| *v > 0.0)
        .reduce(pick)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canteiro_core::Origin;
    use pretty_assertions::assert_eq;

    fn task(start: Serial, end: Serial, pct: f64) -> Task {
        Task::new("t", Origin::Execution).level(3).dates(start, end).complete(pct)
    }

    #[test]
    fn s_curve_shape() {
        assert_eq!(s_curve(0.0), 0.0);
        assert_eq!(s_curve(0.5), 0.5);
        assert_eq!(s_curve(1.0), 1.0);
        assert!(s_curve(0.25) < 0.25);
        assert!(s_curve(0.75) > 0.75);
    }

    #[test]
    fn planned_outside_window() {
        assert_eq!(planned_progress_at(90.0, 100.0, 200.0), 0.0);
        assert_eq!(planned_progress_at(150.0, 100.0, 200.0), 50.0);
        assert_eq!(planned_progress_at(250.0, 100.0, 200.0), 100.0);
        // degenerate window steps at its start
        assert_eq!(planned_progress_at(99.0, 100.0, 100.0), 0.0);
        assert_eq!(planned_progress_at(100.0, 100.0, 100.0), 100.0);
    }

    #[test]
    fn actual_is_capped_by_reported_completion() {
        let t = task(100.0, 200.0, 50.0);
        let tasks = vec![&t];
        assert_eq!(actual_progress_at(&tasks, 150.0), 50.0);
        assert_eq!(actual_progress_at(&tasks, 180.0), 50.0);
        assert_eq!(actual_progress_at(&tasks, 250.0), 50.0);
    }

    #[test]
    fn actual_is_capped_by_elapsed_time() {
        let t = task(100.0, 200.0, 50.0);
        assert_eq!(actual_progress_at(&[&t], 120.0), 20.0);
        assert_eq!(actual_progress_at(&[&t], 100.0), 0.0);
    }

    #[test]
    fn actual_weighs_by_duration() {
        let long = task(100.0, 400.0, 100.0);
        let short = task(100.0, 200.0, 0.0);
        assert_eq!(actual_progress_at(&[&long, &short], 500.0), 75.0);
    }

    #[test]
    fn zero_weight_is_zero_progress() {
        let t = task(100.0, 100.0, 100.0);
        assert_eq!(actual_progress_at(&[&t], 150.0), 0.0);
    }

    #[test]
    fn undated_tasks_are_insufficient() {
        let tasks = vec![
            Task::new("a", Origin::Oversight).complete(100.0),
            Task::new("b", Origin::Oversight).dates(45000.0, 0.0),
        ];
        assert_eq!(
            generate(&tasks, 45100.0, &TrendConfig::default()),
            Trend::InsufficientData
        );
        assert!(Trend::InsufficientData.series().is_none());
    }

    #[test]
    fn samples_from_start_to_horizon() {
        let tasks = vec![task(100.0, 200.0, 50.0)];
        let trend = generate(&tasks, 150.0, &TrendConfig::default());
        let series = trend.series().unwrap();

        // today + 90 is past every end date
        assert_eq!(series.end, 240.0);
        let serials: Vec<Serial> = series.points.iter().map(|p| p.serial).collect();
        assert_eq!(serials.first(), Some(&100.0));
        assert_eq!(serials.last(), Some(&240.0));
        assert_eq!(serials.len(), 15);
    }

    #[test]
    fn actual_defined_until_today_projection_after() {
        let tasks = vec![task(100.0, 200.0, 50.0)];
        let series = generate(&tasks, 150.0, &TrendConfig::default())
            .series()
            .cloned()
            .unwrap();

        let at = |s: Serial| series.points.iter().find(|p| p.serial == s).unwrap();
        assert_eq!(at(120.0).actual, Some(20.0));
        assert_eq!(at(150.0).actual, Some(50.0));
        assert_eq!(at(150.0).projected, None);
        assert_eq!(at(160.0).actual, None);
        assert_eq!(at(160.0).deviation, None);

        // 50 points over 50 days
        assert_eq!(series.velocity, 1.0);
        assert_eq!(at(160.0).projected, Some(60.0));
        assert_eq!(at(240.0).projected, Some(100.0));
        assert_eq!(series.forecast_completion, Some(200.0));
    }

    #[test]
    fn velocities_are_first_differences() {
        let tasks = vec![task(100.0, 200.0, 100.0)];
        let series = generate(&tasks, 130.0, &TrendConfig::default())
            .series()
            .cloned()
            .unwrap();

        assert_eq!(series.points[0].velocity_planned, 0.0);
        assert_eq!(series.points[0].velocity_actual, Some(0.0));
        assert_eq!(series.points[1].velocity_actual, Some(10.0));
        let diff = series.points[2].planned - series.points[1].planned;
        assert_eq!(series.points[2].velocity_planned, diff);
        assert_eq!(series.points[4].velocity_actual, None);
    }

    #[test]
    fn deviation_status_at_latest_past_sample() {
        // planned reaches 50 at the midpoint; actual is stuck at 10
        let tasks = vec![task(100.0, 200.0, 10.0)];
        let series = generate(&tasks, 155.0, &TrendConfig::default())
            .series()
            .cloned()
            .unwrap();

        assert_eq!(series.current_deviation, Some(-40.0));
        assert_eq!(series.deviation_status, Some(DeviationStatus::Behind));
    }

    #[test]
    fn baseline_drives_planned_curve() {
        let tasks = vec![task(100.0, 200.0, 100.0).baseline(100.0, 140.0)];
        let series = generate(&tasks, 300.0, &TrendConfig::default())
            .series()
            .cloned()
            .unwrap();
        let at = |s: Serial| series.points.iter().find(|p| p.serial == s).unwrap();
        assert_eq!(at(120.0).planned, 50.0);
        assert_eq!(at(140.0).planned, 100.0);
    }

    #[test]
    fn milestone_accumulation() {
        let tasks = vec![
            task(100.0, 120.0, 100.0).milestone(true),
            task(100.0, 150.0, 40.0).milestone(true).baseline(100.0, 130.0),
            task(100.0, 200.0, 100.0),
        ];
        let series = generate(&tasks, 200.0, &TrendConfig::default())
            .series()
            .cloned()
            .unwrap();
        let at = |s: Serial| series.points.iter().find(|p| p.serial == s).unwrap();

        assert_eq!(at(110.0).milestones_accumulated, 0);
        assert_eq!(at(120.0).milestones_accumulated, 1);
        assert_eq!(at(120.0).milestones_planned, 1);
        assert_eq!(at(130.0).milestones_planned, 2);
        assert_eq!(at(200.0).milestones_accumulated, 1);
    }

    #[test]
    fn no_velocity_means_no_forecast() {
        let tasks = vec![task(100.0, 200.0, 0.0)];
        let series = generate(&tasks, 150.0, &TrendConfig::default())
            .series()
            .cloned()
            .unwrap();
        assert_eq!(series.velocity, 0.0);
        assert_eq!(series.forecast_completion, None);
        assert_eq!(series.forecast_date(), None);
    }

    #[test]
    fn today_before_start_projects_flat() {
        let tasks = vec![task(100.0, 200.0, 0.0)];
        let series = generate(&tasks, 50.0, &TrendConfig::default())
            .series()
            .cloned()
            .unwrap();
        assert!(series.points.iter().all(|p| p.actual.is_none()));
        assert_eq!(series.points[0].projected, Some(0.0));
        assert_eq!(series.current_deviation, None);
        assert_eq!(series.end, 200.0);
    }
}
