use proptest::prelude::*;
use s5_core::numerics::{distance_weighted_mean, linear_grid};
use s5_core::profile::{ClipPolicy, KPH_MAX, KPH_MIN, ProfileShaper};

fn non_decreasing_grid(steps: Vec<f64>) -> Vec<f64> {
    let mut position = 0.0;
    std::iter::once(0.0)
        .chain(steps.into_iter().map(|step| {
            position += step;
            position
        }))
        .collect()
}

fn samples() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (2usize..60).prop_flat_map(|count| {
        (
            prop::collection::vec(-150.0f64..150.0, count),
            prop::collection::vec(prop_oneof![Just(0.0), 0.01f64..25.0], count - 1),
        )
            .prop_filter_map("distance must span a range", |(values, steps)| {
                let x = non_decreasing_grid(steps);
                (x[x.len() - 1] > 0.0).then_some((values, x))
            })
    })
}

#[test]
fn ramp_is_shifted_to_centre_on_target() {
    let x = linear_grid(0.0, 10.0, 101).expect("grid");
    let shaped = ProfileShaper::default()
        .set_mean(&x, 10.0, &x, 4, ClipPolicy::Unclipped)
        .expect("shape");
    let expected = linear_grid(5.0, 15.0, 101).expect("grid");

    for (index, (expected, actual)) in expected.iter().zip(&shaped.values).enumerate() {
        assert!(
            (expected - actual).abs() <= 1.0e-12,
            "index={index} expected={expected} actual={actual}"
        );
    }
}

proptest! {
    #[test]
    fn set_mean_hits_target_on_uneven_grids(
        (values, x) in samples(),
        target in -1.0e6f64..1.0e6,
    ) {
        let shaped = ProfileShaper::default()
            .set_mean(&values, target, &x, 4, ClipPolicy::Unclipped)
            .expect("unclipped shaping converges");
        let mean = distance_weighted_mean(&shaped.values, &x).expect("mean");
        prop_assert!((mean - target).abs() <= 1.0e-9, "mean={} target={}", mean, target);
    }

    #[test]
    fn kph_clip_bounds_values_and_keeps_mean(
        (values, x) in samples(),
        target in 30.0f64..100.0,
    ) {
        // Keep the profile narrower than the clip band so a solution always
        // leaves a sizeable unclipped share.
        let values: Vec<f64> = values.iter().map(|value| 70.0 + value / 3.0).collect();
        let shaped = ProfileShaper::default()
            .set_mean(&values, target, &x, 8, ClipPolicy::KphRange)
            .expect("target inside the clip range converges");

        prop_assert!(shaped.values.iter().all(|value| (KPH_MIN..=KPH_MAX).contains(value)));
        let mean = distance_weighted_mean(&shaped.values, &x).expect("mean");
        prop_assert!((mean - target).abs() <= 1.0e-9, "mean={} target={}", mean, target);
    }

    #[test]
    fn zero_spread_gives_constant_target(
        (driver, x) in samples(),
        target in 0.0f64..150.0,
    ) {
        let target = (target * 1.0e4).round() / 1.0e4;
        let shaped = ProfileShaper::default()
            .rescale_to_target(&driver, 0.0, target, &x, ClipPolicy::Unclipped)
            .expect("zero spread never fails");
        prop_assert_eq!(shaped.values.len(), driver.len());
        prop_assert!(shaped.values.iter().all(|value| *value == target));
    }
}
