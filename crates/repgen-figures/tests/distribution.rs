use repgen_core::models::template::Language;
use repgen_figures::distribution::{
    DistributionPlot, Kde, PlotSettings, axis_range, percentile, render_distribution,
    tick_spacing, trim_outliers,
};
use repgen_figures::error::FigureError;

const HEALTHY: &[f64] = &[-1.2, -0.9, -0.8, -0.6, -0.5, -0.4, -0.3, -0.1, 0.0, 0.2];
const AFFECTED: &[f64] = &[0.1, 0.3, 0.5, 0.6, 0.8, 0.9, 1.1, 1.4, 1.7, 2.3];

fn small() -> PlotSettings {
    PlotSettings {
        width_px: 400,
        height_px: 300,
        ..PlotSettings::default()
    }
}

fn plot(lang: Language, score: f64) -> DistributionPlot<'static> {
    DistributionPlot {
        model: "CKD",
        healthy: HEALTHY,
        affected: AFFECTED,
        healthy_share: 0.88,
        affected_share: 0.12,
        trim_outliers: false,
        patient_score: score,
        lang,
    }
}

fn count_pixels(png: &[u8], matches: impl Fn(&image::Rgb<u8>) -> bool) -> usize {
    image::load_from_memory(png)
        .unwrap()
        .to_rgb8()
        .pixels()
        .filter(|p| matches(p))
        .count()
}

#[test]
fn percentile_interpolates_between_ranks() {
    let values = [4.0, 1.0, 3.0, 2.0, 5.0];
    assert_eq!(percentile(&values, 0.0), Some(1.0));
    assert_eq!(percentile(&values, 50.0), Some(3.0));
    assert_eq!(percentile(&values, 100.0), Some(5.0));
    assert!((percentile(&values, 4.0).unwrap() - 1.16).abs() < 1e-12);
    assert_eq!(percentile(&[], 50.0), None);
}

#[test]
fn trimming_keeps_the_inner_band() {
    let values: Vec<f64> = (0..=100).map(f64::from).collect();
    let trimmed = trim_outliers(&values, 4.0, 96.0);
    assert_eq!(trimmed.first(), Some(&4.0));
    assert_eq!(trimmed.last(), Some(&96.0));
    assert_eq!(trimmed.len(), 93);
}

#[test]
fn axis_rounds_outwards() {
    assert_eq!(axis_range(&[-0.74, 1.26], 0.5), Some((-1.0, 1.5)));
    assert_eq!(axis_range(&[1.0, 1.0], 0.5), Some((1.0, 1.5)));
    assert_eq!(axis_range(&[], 0.5), None);
}

#[test]
fn ticks_widen_on_long_axes() {
    assert_eq!(tick_spacing(3.0, 0.5), 0.5);
    assert_eq!(tick_spacing(12.0, 0.5), 1.0);
    assert_eq!(tick_spacing(40.0, 0.5), 4.0);
}

#[test]
fn kde_is_a_density() {
    let kde = Kde::new(HEALTHY, 0.5).unwrap();
    let step = 0.01;
    let area: f64 = (0..1000)
        .map(|i| kde.density(-5.0 + step * i as f64) * step)
        .sum();
    assert!((area - 1.0).abs() < 1e-3, "area {area}");
    assert!(kde.density(-0.5) > kde.density(2.0));
}

#[test]
fn kde_handles_degenerate_samples() {
    assert!(Kde::new(&[], 0.5).is_none());

    let single = Kde::new(&[0.3], 0.5).unwrap();
    assert!(single.bandwidth() > 0.0);
    assert!(single.density(0.3).is_finite());

    let flat = Kde::new(&[1.0, 1.0, 1.0], 0.5).unwrap();
    assert!(flat.bandwidth() > 0.0);
}

#[test]
fn renders_both_groups_and_the_patient_marker() {
    let png = render_distribution(&plot(Language::De, 0.4), &small()).unwrap();

    let img = image::load_from_memory(&png).unwrap();
    assert_eq!((img.width(), img.height()), (400, 300));
    assert!(count_pixels(&png, |p| p[1] > 200 && p[0] < 60 && p[2] < 60) > 50);
    assert!(count_pixels(&png, |p| p[0] > 200 && p[1] < 60 && p[2] < 60) > 50);
    assert!(count_pixels(&png, |p| p[2] > 200 && p[0] < 60 && p[1] < 60) > 20);
}

#[test]
fn labels_follow_language() {
    let de = render_distribution(&plot(Language::De, 0.4), &small()).unwrap();
    let en = render_distribution(&plot(Language::En, 0.4), &small()).unwrap();
    assert_ne!(de, en);
}

#[test]
fn score_outside_the_reference_range_is_not_marked() {
    let png = render_distribution(&plot(Language::En, 9.0), &small()).unwrap();
    assert_eq!(
        count_pixels(&png, |p| p[2] > 200 && p[0] < 60 && p[1] < 60),
        0
    );
}

#[test]
fn trimmed_plot_still_renders() {
    let mut trimmed = plot(Language::De, 0.4);
    trimmed.trim_outliers = true;
    assert!(render_distribution(&trimmed, &small()).is_ok());
}

#[test]
fn empty_group_is_an_error() {
    let mut empty = plot(Language::De, 0.4);
    empty.affected = &[];
    match render_distribution(&empty, &small()).unwrap_err() {
        FigureError::EmptyReference { model, group } => {
            assert_eq!(model, "CKD");
            assert_eq!(group, "affected");
        }
        other => panic!("expected EmptyReference, got {other:?}"),
    }
}
