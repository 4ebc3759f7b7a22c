//! Property-based tests for the metric calculators

use chrono::NaiveDate;
use proptest::prelude::*;
use squadrs::flags::{detect_red_flags, RedFlagInputs, RedFlagKind};
use squadrs::models::WellnessEntry;
use squadrs::wellness::{readiness_score, wellness_average_from_row, ReadinessInputs};
use squadrs::{monotony, session_load, sleep_duration_hours, strain};

fn clock(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

proptest! {
    #[test]
    fn sleep_duration_is_within_a_day(bed in 0u32..1440, wake in 0u32..1440) {
        let hours = sleep_duration_hours(Some(&clock(bed)), Some(&clock(wake))).unwrap();
        prop_assert!(hours > 0.0);
        prop_assert!(hours <= 24.0);
    }

    #[test]
    fn same_bed_and_wake_time_is_a_full_day(minutes in 0u32..1440) {
        let time = clock(minutes);
        prop_assert_eq!(sleep_duration_hours(Some(&time), Some(&time)), Some(24.0));
    }

    #[test]
    fn session_load_is_never_negative(duration in 1.0f64..300.0, rpe in 1.0f64..10.0) {
        let load = session_load(duration, rpe);
        prop_assert!(load >= 0.0);
        prop_assert!((load - duration * rpe).abs() < 0.0051);
    }

    #[test]
    fn monotony_is_never_negative(loads in prop::collection::vec(0.0f64..2000.0, 1..14)) {
        let value = monotony(&loads);
        prop_assert!(value >= 0.0);
        prop_assert!(value.is_finite());
    }

    #[test]
    fn constant_load_has_monotony_of_one(load in 0.0f64..2000.0, days in 1usize..14) {
        prop_assert_eq!(monotony(&vec![load; days]), 1.0);
    }

    #[test]
    fn strain_scales_with_weekly_load(weekly in 0.0f64..10000.0, value in 0.0f64..5.0) {
        prop_assert!(strain(weekly, value) >= 0.0);
        prop_assert!(strain(weekly * 2.0, value) >= strain(weekly, value));
    }

    #[test]
    fn readiness_stays_in_bounds(
        sleep_quality in prop::option::of(1u8..=10),
        soreness in prop::option::of(1u8..=10),
        fatigue in prop::option::of(1u8..=10),
        stress in prop::option::of(1u8..=10),
        mood in prop::option::of(1u8..=10),
        sleep_hours in prop::option::of(0.0f64..16.0),
    ) {
        let inputs = ReadinessInputs { sleep_quality, soreness, fatigue, stress, mood, sleep_hours };
        let answered = [sleep_quality, soreness, fatigue, stress, mood]
            .iter()
            .any(Option::is_some) || sleep_hours.is_some();

        match readiness_score(&inputs) {
            Some(score) => prop_assert!(score <= 100),
            None => prop_assert!(!answered),
        }
    }

    #[test]
    fn more_fatigue_never_raises_readiness(fatigue in 1u8..10) {
        let base = ReadinessInputs { sleep_quality: Some(7), mood: Some(7), ..Default::default() };
        let lower = readiness_score(&ReadinessInputs { fatigue: Some(fatigue), ..base }).unwrap();
        let higher = readiness_score(&ReadinessInputs { fatigue: Some(fatigue + 1), ..base }).unwrap();
        prop_assert!(higher <= lower);
    }

    #[test]
    fn flags_are_unique_and_deterministic(
        wellness_average in prop::option::of(1.0f64..10.0),
        avg_sleep_hours in prop::option::of(0.0f64..12.0),
        monotony_value in prop::option::of(0.0f64..5.0),
        weekly_load in prop::option::of(0.0f64..5000.0),
        previous_week_load in prop::option::of(0.0f64..5000.0),
        fatigue in prop::option::of(1u8..=10),
    ) {
        let inputs = RedFlagInputs {
            wellness_average,
            avg_sleep_hours,
            monotony_value,
            weekly_load,
            previous_week_load,
            fatigue,
        };

        let flags = detect_red_flags(&inputs);
        prop_assert!(flags.len() <= 5);
        prop_assert_eq!(&flags, &detect_red_flags(&inputs));

        let mut kinds: Vec<RedFlagKind> = flags.iter().map(|f| f.kind).collect();
        kinds.dedup();
        prop_assert_eq!(kinds.len(), flags.len());
    }

    #[test]
    fn calculators_are_idempotent(
        bed in 0u32..1440,
        wake in 0u32..1440,
        answers in prop::collection::vec(prop::option::of(1u8..=10), 6),
        sleep_hours in prop::option::of(0.0f64..16.0),
        loads in prop::collection::vec(0.0f64..2000.0, 0..14),
    ) {
        let (bed, wake) = (clock(bed), clock(wake));
        prop_assert_eq!(
            sleep_duration_hours(Some(&bed), Some(&wake)),
            sleep_duration_hours(Some(&bed), Some(&wake))
        );

        let entry = WellnessEntry {
            sleep_quality: answers[0],
            fatigue: answers[1],
            soreness: answers[2],
            stress: answers[3],
            mood: answers[4],
            motivation: answers[5],
            sleep_hours,
            ..WellnessEntry::new("p1", NaiveDate::from_ymd_opt(2024, 9, 23).unwrap())
        };
        prop_assert_eq!(wellness_average_from_row(&entry), wellness_average_from_row(&entry));

        let inputs = ReadinessInputs::from(&entry);
        prop_assert_eq!(readiness_score(&inputs), readiness_score(&inputs));

        prop_assert_eq!(monotony(&loads), monotony(&loads));
    }
}
