//! Host-based end-to-end tests for the Roomba dashboard
//! These wire the poll loop, dispatcher and projector together against the
//! in-memory robot; no serial device is needed.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use roomba_core::commands::{RADIUS_STRAIGHT, TURN_CW};
    use roomba_core::config::{DriveConfig, Eviction, HistoryConfig};
    use roomba_core::display_state::LabelSlot;
    use roomba_core::{Command, DashConfig, DisplayState};
    use roomba_dash::app::demo_transport;
    use roomba_dash::poll_loop::{poll_headless_once, poll_interactive_once, run_interactive};
    use roomba_dash::{CommandDispatcher, Intent, MockTransport, RobotLink, ShutdownSignal};

    /// Group 3 with the given battery charge out of 2700 mAh
    fn group_3(charge: u16) -> Vec<u8> {
        let [hi, lo] = charge.to_be_bytes();
        vec![2, 0x3A, 0x98, 0xFF, 0x9C, 0xE7, hi, lo, 0x0A, 0x8C]
    }

    #[test]
    fn test_battery_history_follows_cadence() {
        let mock = MockTransport::new();
        mock.set_payload(3, group_3(1350));
        let link = RobotLink::new(mock);
        let state = Mutex::new(DisplayState::new(HistoryConfig {
            sample_every: 5,
            capacity: 3,
            eviction: Eviction::Reset,
        }));

        for _ in 0..14 {
            poll_interactive_once(&link, &[3], &state);
        }
        {
            let state = state.lock().unwrap();
            assert_eq!(state.battery_history.len(), 2);
            assert_eq!(state.battery_history.latest(), Some(50.0));
        }

        // The third point fills the chart, which is wiped
        poll_interactive_once(&link, &[3], &state);
        assert!(state.lock().unwrap().battery_history.is_empty());

        for _ in 0..5 {
            poll_interactive_once(&link, &[3], &state);
        }
        let state = state.lock().unwrap();
        assert_eq!(state.battery_history.len(), 1);
        assert_eq!(state.battery_history.resets(), 1);
        assert_eq!(state.samples_projected, 20);
    }

    #[test]
    fn test_default_groups_fill_the_panel() {
        let config = DashConfig::default();
        let link = RobotLink::new(demo_transport(&config.poll.groups));
        let state = Mutex::new(DisplayState::default());

        assert_eq!(poll_interactive_once(&link, &config.poll.groups, &state), 2);

        let state = state.lock().unwrap();
        assert_eq!(state.label(LabelSlot::Mode), "Passive");
        assert_eq!(state.label(LabelSlot::ChargingState), "Trickle Charging");
        assert_eq!(state.battery.percent, 50.0);
        assert_eq!(state.charging_source_flags, [false, true]);
        assert_eq!(state.current_ma, -120);
        assert!(!state.has_alert());
    }

    #[test]
    fn test_headless_report_covers_every_packet() {
        let config = DashConfig::default();
        let link = RobotLink::new(demo_transport(&config.poll.groups));
        let mut out = Vec::new();

        poll_headless_once(&link, &config.poll.groups, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        // timestamp plus packets 7..=58
        assert_eq!(text.lines().count(), 1 + 52);
        assert!(text.lines().any(|l| l.trim_start() == "Battery Charge:  1350"));
        assert!(text.lines().any(|l| l.trim_start() == "Stasis:  0"));
    }

    #[test]
    fn test_drive_while_polling_keeps_commands_ordered() {
        let mock = demo_transport(&[6, 101]);
        let link = RobotLink::new(mock.clone());
        let shutdown = ShutdownSignal::new();
        let state = Arc::new(Mutex::new(DisplayState::default()));
        let mut config = DashConfig::default();
        config.poll.interactive_period_ms = 5;

        let poller = {
            let (link, state, shutdown, poll) =
                (link.clone(), state.clone(), shutdown.clone(), config.poll.clone());
            thread::spawn(move || run_interactive(&link, &poll, &state, &shutdown))
        };

        let dispatcher = CommandDispatcher::new(
            link,
            DriveConfig {
                auto_stop_ms: 30,
                ..DriveConfig::default()
            },
            shutdown.clone(),
        )
        .unwrap();

        dispatcher.dispatch(Intent::MoveForward).unwrap();
        thread::sleep(Duration::from_millis(10));
        dispatcher.dispatch(Intent::TurnRight).unwrap();
        thread::sleep(Duration::from_millis(120));
        dispatcher.dispatch(Intent::Quit).unwrap();

        poller.join().unwrap();
        assert_eq!(
            mock.sent_commands(),
            vec![
                Command::drive(100, RADIUS_STRAIGHT),
                Command::drive(50, TURN_CW),
                Command::halt(),
            ]
        );
        assert!(mock.reads().len() >= 4);
        assert!(state.lock().unwrap().samples_projected >= 4);
    }

    #[test]
    fn test_power_down_stops_polling() {
        let mock = demo_transport(&[6]);
        let link = RobotLink::new(mock.clone());
        let shutdown = ShutdownSignal::new();
        let state = Arc::new(Mutex::new(DisplayState::default()));
        let mut config = DashConfig::default();
        config.poll.groups = vec![6];
        config.poll.interactive_period_ms = 5;

        let poller = {
            let (link, state, shutdown, poll) =
                (link.clone(), state.clone(), shutdown.clone(), config.poll.clone());
            thread::spawn(move || run_interactive(&link, &poll, &state, &shutdown))
        };
        let dispatcher = CommandDispatcher::new(link, config.drive, shutdown.clone()).unwrap();

        thread::sleep(Duration::from_millis(20));
        dispatcher.dispatch(Intent::PowerDown).unwrap();
        poller.join().unwrap();

        let reads_after_stop = mock.reads().len();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(mock.reads().len(), reads_after_stop);
        assert_eq!(mock.sent_commands(), vec![Command::Power]);
    }

    #[test]
    fn test_snapshot_json_matches_state() {
        let mock = MockTransport::new();
        mock.set_payload(3, group_3(2700));
        let link = RobotLink::new(mock);
        let state = Mutex::new(DisplayState::default());
        poll_interactive_once(&link, &[3], &state);

        let json = state.lock().unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["battery"]["percent"], 100.0);
        assert_eq!(value["temperature_c"], -25);
        assert_eq!(value["charging_state"], "Full Charging");
    }
}
