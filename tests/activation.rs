mod support;

mod tests {
    use obegraensad_core::storage::KEY_CURRENT_PLUGIN;
    use obegraensad_core::{
        CoreConfig, EffectId, FrameBuffer, KeyValueStore, MemoryStore, NullStore, Overlay,
        PixelSurface, PluginManager, StatusFlag, SystemStatus,
    };
    use serde_json::json;

    use super::support::{
        CallLog, CountingYield, RecordingEffect, assert_idle, manager_with, ms,
    };

    const NAMESPACE: &str = "led-wall";

    fn id(raw: u16) -> EffectId {
        EffectId::new(raw).unwrap()
    }

    fn store_with_current(raw: i32) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.begin(NAMESPACE, false).unwrap();
        store.put_i32(KEY_CURRENT_PLUGIN, raw).unwrap();
        store.end();
        store
    }

    #[test]
    fn test_activate_by_id_sets_active() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, MemoryStore::new(), &["A", "B", "C"], &log);

        manager.activate_by_id(id(2), Overlay::Skip);

        assert_eq!(manager.active_effect().map(|d| d.id()), Some(id(2)));
        assert_eq!(log.entries(), vec!["setup:B"]);
        assert_idle(&status);
    }

    #[test]
    fn test_teardown_precedes_setup() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, MemoryStore::new(), &["A", "B"], &log);

        manager.activate_by_id(id(1), Overlay::Skip);
        manager.activate_by_id(id(2), Overlay::Skip);

        assert_eq!(log.entries(), vec!["setup:A", "teardown:A", "setup:B"]);
    }

    #[test]
    fn test_status_is_loading_during_switch() {
        static STATUS: StatusFlag = StatusFlag::new();
        let log = CallLog::default();
        let mut manager = PluginManager::new(
            &STATUS,
            NullStore,
            FrameBuffer::new(),
            CountingYield::default(),
            CoreConfig::default(),
        );
        manager.register(RecordingEffect::watching_status("A", &log, &STATUS));
        manager.register(RecordingEffect::watching_status("B", &log, &STATUS));

        manager.activate_by_id(id(1), Overlay::Skip);
        manager.activate_by_id(id(2), Overlay::Skip);

        assert_eq!(
            log.entries(),
            vec![
                "setup:A",
                "setup-status:LOADING",
                "teardown:A",
                "teardown-status:LOADING",
                "setup:B",
                "setup-status:LOADING",
            ]
        );
        assert_eq!(STATUS.load(), SystemStatus::None);
    }

    #[test]
    fn test_unknown_id_keeps_active_effect() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, MemoryStore::new(), &["A", "B"], &log);
        manager.activate_by_id(id(2), Overlay::Skip);
        log.clear();

        manager.activate_by_id(id(42), Overlay::Skip);

        assert_eq!(manager.active_effect().map(|d| d.id()), Some(id(2)));
        assert!(log.entries().is_empty());
        assert_idle(&status);
    }

    #[test]
    fn test_unknown_id_without_active_falls_back_to_first() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, MemoryStore::new(), &["A", "B"], &log);

        manager.activate_by_id(id(42), Overlay::Skip);

        assert_eq!(manager.active_effect().map(|d| d.id()), Some(id(1)));
        assert_eq!(log.entries(), vec!["setup:A"]);
    }

    #[test]
    fn test_unknown_id_on_empty_registry_is_harmless() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, MemoryStore::new(), &[], &log);

        manager.activate_by_id(id(1), Overlay::Skip);
        manager.activate_next(Overlay::Skip);
        manager.activate_persisted(Overlay::Skip);

        assert!(manager.active_effect().is_none());
        assert_eq!(manager.persisted_id(), None);
        assert_idle(&status);
    }

    #[test]
    fn test_unknown_name_leaves_no_active_effect() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, MemoryStore::new(), &["A", "B"], &log);
        manager.activate_by_name("B", Overlay::Skip);

        manager.activate_by_name("Missing", Overlay::Skip);

        assert!(manager.active_effect().is_none());
        assert_eq!(log.entries(), vec!["setup:B", "teardown:B"]);
        assert_idle(&status);
    }

    #[test]
    fn test_activate_by_name_picks_first_duplicate() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) =
            manager_with(&status, MemoryStore::new(), &["Clock", "Clock"], &log);

        manager.activate_by_name("Clock", Overlay::Skip);

        assert_eq!(manager.active_effect().map(|d| d.id()), Some(id(1)));
    }

    #[test]
    fn test_activate_next_wraps_around() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, MemoryStore::new(), &["A", "B", "C"], &log);

        manager.activate_next(Overlay::Skip);
        assert_eq!(manager.active_effect().map(|d| d.id()), Some(id(1)));

        manager.activate_next(Overlay::Skip);
        manager.activate_next(Overlay::Skip);
        assert_eq!(manager.active_effect().map(|d| d.id()), Some(id(3)));

        manager.activate_next(Overlay::Skip);
        assert_eq!(manager.active_effect().map(|d| d.id()), Some(id(1)));
    }

    #[test]
    fn test_activation_persists_id() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, MemoryStore::new(), &["A", "B", "C"], &log);

        manager.activate_by_id(id(3), Overlay::Skip);

        assert_eq!(manager.store().peek_i32(NAMESPACE, KEY_CURRENT_PLUGIN), Some(3));
        assert_eq!(manager.persisted_id(), Some(id(3)));
    }

    #[test]
    fn test_init_restores_persisted_effect() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, store_with_current(2), &["A", "B"], &log);

        manager.init();

        assert_eq!(manager.active_effect().map(|d| d.name()), Some("B"));
        assert_idle(&status);
    }

    #[test]
    fn test_init_with_stale_persisted_id_falls_back_to_first() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, store_with_current(17), &["A", "B"], &log);

        manager.init();

        assert_eq!(manager.active_effect().map(|d| d.id()), Some(id(1)));
    }

    #[test]
    fn test_init_with_corrupt_persisted_id_uses_first() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, store_with_current(-5), &["A", "B"], &log);

        assert_eq!(manager.persisted_id(), Some(id(1)));
        manager.init();
        assert_eq!(manager.active_effect().map(|d| d.id()), Some(id(1)));
    }

    #[test]
    fn test_disabled_storage_uses_first_effect() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let mut manager = PluginManager::new(
            &status,
            NullStore,
            FrameBuffer::new(),
            CountingYield::default(),
            CoreConfig::default(),
        );
        manager.register(RecordingEffect::boxed("A", &log));
        manager.register(RecordingEffect::boxed("B", &log));

        manager.activate_by_id(id(2), Overlay::Skip);
        assert_eq!(manager.persisted_id(), Some(id(1)));

        manager.activate_persisted(Overlay::Skip);
        assert_eq!(manager.active_effect().map(|d| d.id()), Some(id(1)));
    }

    #[test]
    fn test_init_without_effects_leaves_nothing_active() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, pacer) = manager_with(&status, MemoryStore::new(), &[], &log);

        manager.init();

        assert!(manager.active_effect().is_none());
        assert_eq!(pacer.calls(), 0);
        assert_idle(&status);
    }

    #[test]
    fn test_overlay_yields_for_its_duration() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, pacer) = manager_with(&status, MemoryStore::new(), &["A"], &log);

        manager.activate_by_id(id(1), Overlay::Show);

        assert_eq!(pacer.calls(), 80);
        assert_eq!(pacer.total_micros(), 800_000);
        // the recording effect draws nothing in setup, so the overlay remains
        assert!(manager.display().lit_count() > 0);
    }

    #[test]
    fn test_skipped_overlay_does_not_wait() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, pacer) = manager_with(&status, MemoryStore::new(), &["A"], &log);

        manager.activate_by_id(id(1), Overlay::Skip);

        assert_eq!(pacer.calls(), 0);
        assert_eq!(manager.display().lit_count(), 0);
    }

    #[test]
    fn test_run_active_is_gated_by_status() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, MemoryStore::new(), &["A"], &log);
        assert!(!manager.run_active(ms(0)));

        manager.activate_by_id(id(1), Overlay::Skip);
        log.clear();

        status.store(SystemStatus::Update);
        assert!(!manager.run_active(ms(1)));
        status.store(SystemStatus::WsBinary);
        assert!(!manager.run_active(ms(2)));
        assert!(log.entries().is_empty());

        status.store(SystemStatus::None);
        assert!(manager.run_active(ms(3)));
        assert_eq!(log.entries(), vec!["run:A"]);
        assert_eq!(manager.display().render_buffer()[0], 1);
    }

    #[test]
    fn test_events_reach_active_effect_only() {
        let status = StatusFlag::new();
        let log = CallLog::default();
        let (mut manager, _) = manager_with(&status, MemoryStore::new(), &["A", "B"], &log);
        assert!(!manager.dispatch_event(&json!({"text": "hi"})));

        manager.activate_by_id(id(2), Overlay::Skip);
        log.clear();
        assert!(manager.dispatch_event(&json!({"text": "hi"})));

        assert_eq!(log.entries(), vec![r#"event:B:{"text":"hi"}"#]);
    }
}
