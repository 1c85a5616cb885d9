#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use stridelog::{RoutePoint, WorkoutError, WorkoutStore, WorkoutType};

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 18, 30, 0).unwrap() + Duration::seconds(secs)
    }

    fn workout_error(err: &anyhow::Error) -> Option<&WorkoutError> {
        err.downcast_ref::<WorkoutError>()
    }

    #[test]
    fn test_start_assigns_id_and_blocks_second_active() {
        let mut store = WorkoutStore::open_in_memory().unwrap();

        let first = store.start_workout(WorkoutType::Running, t(0)).unwrap();
        let first_id = first.id().unwrap();
        assert!(first_id > 0);

        let err = store.start_workout(WorkoutType::Walking, t(60)).unwrap_err();
        assert_eq!(
            workout_error(&err),
            Some(&WorkoutError::DuplicateActiveWorkout {
                active_id: first_id
            })
        );
        assert_eq!(store.list_summaries().unwrap().len(), 1);

        let mut active = store.active().unwrap().unwrap();
        assert_eq!(active.id(), Some(first_id));
        active.finish(t(600)).unwrap();
        store.save(&mut active).unwrap();

        assert!(store.active().unwrap().is_none());
        let second = store.start_workout(WorkoutType::Walking, t(700)).unwrap();
        assert_ne!(second.id(), Some(first_id));
    }

    #[test]
    fn test_save_and_reload_full_record() {
        let mut store = WorkoutStore::open_in_memory().unwrap();
        let mut record = store.start_workout(WorkoutType::Hiking, t(0)).unwrap();

        let mut p = RoutePoint::new(t(10), 45.8326, 6.8652);
        p.ele = Some(1035.0);
        record.append_route_sample(p).unwrap();
        record.append_route_sample(RoutePoint::new(t(20), 45.8330, 6.8655)).unwrap();
        record.add_distance(50.0).unwrap();
        record.add_steps(72).unwrap();
        record.close_lap(t(20)).unwrap();
        record.record_pause(1500).unwrap();
        store.save(&mut record).unwrap();

        record.append_route_sample(RoutePoint::new(t(30), 45.8334, 6.8659)).unwrap();
        record.finish(t(40)).unwrap();
        record.set_title(Some("Aiguillette".to_string()));
        record.estimate_energy(65.0, t(40)).unwrap();
        let id = store.save(&mut record).unwrap();

        let loaded = store.get(id).unwrap().unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.route().len(), 3);
        assert_eq!(loaded.route()[0].ele, Some(1035.0));
        assert_eq!(loaded.laps().len(), 1);
        assert_eq!(loaded.pause_ms(), 1500);
    }

    #[test]
    fn test_summaries_ordered_by_start_desc() {
        let mut store = WorkoutStore::open_in_memory().unwrap();
        for (offset, kind) in [
            (0, WorkoutType::Yoga),
            (7200, WorkoutType::Tennis),
            (3600, WorkoutType::SwimmingPool),
        ] {
            let mut r = store.start_workout(kind, t(offset)).unwrap();
            r.finish(t(offset + 1800)).unwrap();
            store.save(&mut r).unwrap();
        }

        let kinds: Vec<_> = store
            .list_summaries()
            .unwrap()
            .into_iter()
            .map(|s| s.workout_type)
            .collect();
        assert_eq!(
            kinds,
            vec![
                WorkoutType::Tennis,
                WorkoutType::SwimmingPool,
                WorkoutType::Yoga
            ]
        );
    }

    #[test]
    fn test_stale_copy_cannot_reopen_completed_workout() {
        let mut store = WorkoutStore::open_in_memory().unwrap();
        let mut record = store.start_workout(WorkoutType::Running, t(0)).unwrap();
        let id = record.id().unwrap();
        let mut stale = record.clone();

        record.finish(t(600)).unwrap();
        store.save(&mut record).unwrap();

        stale
            .append_route_sample(RoutePoint::new(t(30), 47.0, -1.5))
            .unwrap();
        let err = store.save(&mut stale).unwrap_err();
        assert_eq!(workout_error(&err), Some(&WorkoutError::AlreadyCompleted));

        let stored = store.get(id).unwrap().unwrap();
        assert!(stored.is_completed());
        assert_eq!(stored.end_time(), Some(t(600)));
        assert!(stored.route().is_empty());
        assert!(store.active().unwrap().is_none());
    }

    #[test]
    fn test_delete_removes_workout_and_points() {
        let mut store = WorkoutStore::open_in_memory().unwrap();
        let mut record = store.start_workout(WorkoutType::Running, t(0)).unwrap();
        record.append_route_sample(RoutePoint::new(t(1), 0.0, 0.0)).unwrap();
        let id = store.save(&mut record).unwrap();

        assert!(store.delete(id).unwrap());
        assert!(store.get(id).unwrap().is_none());
        assert!(!store.delete(id).unwrap());

        // the slot for an active workout is free again
        store.start_workout(WorkoutType::Running, t(100)).unwrap();
    }

    #[test]
    fn test_completed_workouts_do_not_block_each_other() {
        let mut store = WorkoutStore::open_in_memory().unwrap();
        let mut live = store.start_workout(WorkoutType::Running, t(0)).unwrap();

        let mut imported = stridelog::WorkoutRecord::start(WorkoutType::Biking, t(-7200));
        imported.finish(t(-3600)).unwrap();
        store.save(&mut imported).unwrap();

        live.finish(t(60)).unwrap();
        store.save(&mut live).unwrap();
        assert_eq!(store.list_summaries().unwrap().len(), 2);
    }

    #[test]
    fn test_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workouts.sqlite");

        let id = {
            let mut store = WorkoutStore::open(&path).unwrap();
            store.start_workout(WorkoutType::Skiing, t(0)).unwrap().id().unwrap()
        };

        let store = WorkoutStore::open(&path).unwrap();
        let active = store.active().unwrap().unwrap();
        assert_eq!(active.id(), Some(id));
        assert_eq!(active.workout_type(), WorkoutType::Skiing);
        assert!(!active.is_completed());
    }
}
