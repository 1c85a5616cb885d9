#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use stridelog::utils::haversine_m;
    use stridelog::{
        LiveSession, RoutePoint, TrackingOptions, WorkoutError, WorkoutStore, WorkoutType,
    };

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 21, 8, 0, 0).unwrap() + Duration::seconds(secs)
    }

    // Roughly 111 m per step north along a meridian.
    fn fix(secs: i64, step: u32) -> RoutePoint {
        RoutePoint::new(t(secs), 48.0 + f64::from(step) * 0.001, -3.0)
    }

    #[test]
    fn test_session_tracks_distance_steps_and_pauses() {
        let mut store = WorkoutStore::open_in_memory().unwrap();
        let options = TrackingOptions {
            body_mass_kg: Some(70.0),
            auto_lap_distance_m: None,
            ..TrackingOptions::default()
        };
        let mut session = LiveSession::begin(&mut store, WorkoutType::Running, t(0), options).unwrap();

        session.on_steps(1000).unwrap();
        session.on_location(fix(0, 0)).unwrap();
        session.on_location(fix(10, 1)).unwrap();
        session.on_steps(1030).unwrap();

        session.pause(t(20));
        session.on_location(fix(25, 5)).unwrap();
        session.on_steps(1100).unwrap();
        session.resume(t(50)).unwrap();

        session.on_location(fix(60, 2)).unwrap();
        session.on_steps(1120).unwrap();
        let record = session.finish(t(1830)).unwrap();

        assert!(record.is_completed());
        assert_eq!(record.route().len(), 3);
        assert_eq!(record.pause_ms(), 30_000);
        assert_eq!(record.steps(), 50);
        let expected = haversine_m(&fix(0, 0), &fix(10, 1)) + haversine_m(&fix(10, 1), &fix(60, 2));
        assert!((record.distance_m() - expected).abs() < 1e-6);
        assert_eq!(record.elapsed_active_duration(), Duration::minutes(30));
        assert!((record.energy_kcal().unwrap() - 385.0).abs() < 1e-6);

        let stored = store.get(record.id().unwrap()).unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[test]
    fn test_auto_laps() {
        let mut store = WorkoutStore::open_in_memory().unwrap();
        let options = TrackingOptions {
            auto_lap_distance_m: Some(300.0),
            ..TrackingOptions::default()
        };
        let mut session = LiveSession::begin(&mut store, WorkoutType::Walking, t(0), options).unwrap();

        for step in 0..=6 {
            session.on_location(fix(i64::from(step) * 60, step)).unwrap();
        }

        // ~111 m per fix: laps close on the 3rd and 6th segment
        let laps = session.record().laps();
        assert_eq!(laps.len(), 2);
        assert_eq!(laps[0].start, t(0));
        assert_eq!(laps[0].end, t(180));
        assert_eq!(laps[1].start, t(180));
        assert_eq!(laps[1].end, t(360));
        assert!(laps.iter().all(|l| l.distance_m >= 300.0));
    }

    #[test]
    fn test_out_of_order_fix_is_reported() {
        let mut store = WorkoutStore::open_in_memory().unwrap();
        let mut session =
            LiveSession::begin(&mut store, WorkoutType::Biking, t(0), TrackingOptions::default()).unwrap();

        session.on_location(fix(30, 0)).unwrap();
        let err = session.on_location(fix(20, 1)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkoutError>(),
            Some(WorkoutError::OutOfOrderSample { .. })
        ));
        assert_eq!(session.record().route().len(), 1);
        assert_eq!(session.record().distance_m(), 0.0);
    }

    #[test]
    fn test_fix_with_bad_coordinates_is_rejected() {
        let mut store = WorkoutStore::open_in_memory().unwrap();
        let mut session =
            LiveSession::begin(&mut store, WorkoutType::Running, t(0), TrackingOptions::default()).unwrap();

        session.on_location(fix(0, 0)).unwrap();
        for bad in [
            RoutePoint::new(t(10), f64::NAN, -3.0),
            RoutePoint::new(t(10), 48.0, f64::INFINITY),
            RoutePoint::new(t(10), 91.0, -3.0),
        ] {
            let err = session.on_location(bad).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<WorkoutError>(),
                Some(WorkoutError::InvalidInput(_))
            ));
        }
        assert_eq!(session.record().route().len(), 1);
        assert_eq!(session.record().distance_m(), 0.0);

        session.on_location(fix(20, 1)).unwrap();
        let distance = session.record().distance_m();
        assert!((distance - haversine_m(&fix(0, 0), &fix(20, 1))).abs() < 1e-6);
        let id = session.record().id().unwrap();
        drop(session);

        let stored = store.get(id).unwrap().unwrap();
        assert_eq!(stored.route().len(), 2);
        assert!(stored.distance_m().is_finite());
        assert!((stored.distance_m() - distance).abs() < 1e-6);
    }

    #[test]
    fn test_step_counter_reset_keeps_steps() {
        let mut store = WorkoutStore::open_in_memory().unwrap();
        let mut session =
            LiveSession::begin(&mut store, WorkoutType::Walking, t(0), TrackingOptions::default()).unwrap();

        session.on_steps(500).unwrap();
        session.on_steps(650).unwrap();
        session.on_steps(40).unwrap();
        session.on_steps(100).unwrap();

        assert_eq!(session.record().steps(), 150 + 40 + 60);
    }

    #[test]
    fn test_begin_refused_while_another_is_live() {
        let mut store = WorkoutStore::open_in_memory().unwrap();
        let session =
            LiveSession::begin(&mut store, WorkoutType::Running, t(0), TrackingOptions::default()).unwrap();
        let first_id = session.record().id().unwrap();
        drop(session);

        let err = LiveSession::begin(&mut store, WorkoutType::Yoga, t(10), TrackingOptions::default())
            .err()
            .unwrap();
        assert_eq!(
            err.downcast_ref::<WorkoutError>(),
            Some(&WorkoutError::DuplicateActiveWorkout {
                active_id: first_id
            })
        );
    }

    #[test]
    fn test_recover_resumes_persisted_workout() {
        let mut store = WorkoutStore::open_in_memory().unwrap();
        assert!(LiveSession::recover(&mut store, TrackingOptions::default()).unwrap().is_none());

        {
            let mut session =
                LiveSession::begin(&mut store, WorkoutType::Hiking, t(0), TrackingOptions::default())
                    .unwrap();
            session.on_location(fix(0, 0)).unwrap();
            session.on_location(fix(60, 1)).unwrap();
        }

        let mut session = LiveSession::recover(&mut store, TrackingOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(session.record().route().len(), 2);
        session.on_location(fix(120, 2)).unwrap();
        let record = session.finish(t(180)).unwrap();

        assert_eq!(record.route().len(), 3);
        assert!(record.distance_m() > 220.0);
        assert!(store.active().unwrap().is_none());
        assert_eq!(store.get(record.id().unwrap()).unwrap().unwrap().route().len(), 3);
    }
}
