mod tests {
    use obegraensad_core::{StatusFlag, SystemStatus};

    #[test]
    fn test_starts_idle() {
        let status = StatusFlag::new();
        assert_eq!(status.load(), SystemStatus::None);
        assert!(status.load().allows_render());
    }

    #[test]
    fn test_only_idle_allows_render() {
        assert!(SystemStatus::None.allows_render());
        assert!(!SystemStatus::Loading.allows_render());
        assert!(!SystemStatus::Update.allows_render());
        assert!(!SystemStatus::WsBinary.allows_render());
    }

    #[test]
    fn test_raw_values() {
        for status in [
            SystemStatus::None,
            SystemStatus::Loading,
            SystemStatus::Update,
            SystemStatus::WsBinary,
        ] {
            assert_eq!(SystemStatus::from_raw(status as u8), Some(status));
        }
        assert_eq!(SystemStatus::from_raw(4), None);
    }

    #[test]
    fn test_guard_restores_idle() {
        let status = StatusFlag::new();
        {
            let _guard = status.begin_loading();
            assert!(status.is(SystemStatus::Loading));
        }
        assert!(status.is(SystemStatus::None));
    }

    #[test]
    fn test_guard_restores_idle_on_panic() {
        let status = StatusFlag::new();
        let result = std::panic::catch_unwind(|| {
            let _guard = status.begin_loading();
            panic!("effect setup failed");
        });
        assert!(result.is_err());
        assert!(status.is(SystemStatus::None));
    }

    #[test]
    fn test_serializes_as_wire_names() {
        assert_eq!(serde_json::to_string(&SystemStatus::None).unwrap(), r#""NONE""#);
        assert_eq!(serde_json::to_string(&SystemStatus::Loading).unwrap(), r#""LOADING""#);
        assert_eq!(serde_json::to_string(&SystemStatus::Update).unwrap(), r#""UPDATE""#);
        assert_eq!(serde_json::to_string(&SystemStatus::WsBinary).unwrap(), r#""WSBINARY""#);
        assert_eq!(SystemStatus::WsBinary.as_str(), "WSBINARY");
    }

    #[test]
    fn test_store_is_visible_across_threads() {
        static STATUS: StatusFlag = StatusFlag::new();

        std::thread::spawn(|| STATUS.store(SystemStatus::Update))
            .join()
            .unwrap();

        assert_eq!(STATUS.load(), SystemStatus::Update);
    }
}
