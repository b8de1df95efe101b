mod support;

use std::sync::Arc;
use std::time::Duration;

use collector_core::StoredSettings;
use collector_engine::{
    Agent, AgentError, AgentEvent, AgentHandle, AgentParts, AgentSettings, ConfigStore,
    MemoryConfigStore, RenderedItem, ScanAck, Scanner, SubmitFailure, Submitter,
};
use pretty_assertions::assert_eq;
use support::{extractor, item, settings, FakeTransport, RecordingSink, SwitchableView};
use tokio::task::JoinHandle;
use tokio::time::sleep;

struct Rig {
    handle: AgentHandle,
    task: JoinHandle<()>,
    transport: Arc<FakeTransport>,
    store: Arc<MemoryConfigStore>,
    sink: Arc<RecordingSink>,
    view: Arc<SwitchableView>,
}

impl Rig {
    fn start(transport: FakeTransport, stored: StoredSettings, items: Vec<RenderedItem>) -> Self {
        Self::start_with(transport, stored, items, AgentSettings::default())
    }

    fn start_with(
        transport: FakeTransport,
        stored: StoredSettings,
        items: Vec<RenderedItem>,
        agent_settings: AgentSettings,
    ) -> Self {
        let transport = Arc::new(transport);
        let store = Arc::new(MemoryConfigStore::new(stored));
        let sink = Arc::new(RecordingSink::default());
        let view = Arc::new(SwitchableView::new(items));
        let submitter = Submitter::new(transport.clone(), store.clone(), sink.clone());

        let agent = Agent::new(AgentParts {
            scanner: Scanner::new(Box::new(extractor())),
            view: view.clone(),
            store: store.clone(),
            submitter: Arc::new(submitter),
            sink: sink.clone(),
            settings: agent_settings,
        });
        let (handle, run) = agent.into_task();
        Self {
            handle,
            task: tokio::spawn(run),
            transport,
            store,
            sink,
            view,
        }
    }

    fn set_enabled(&self, enabled: bool) {
        self.store.set_enabled(enabled).unwrap();
        self.handle.config_changed();
    }

    async fn stop(&mut self) {
        self.handle.shutdown();
        (&mut self.task).await.unwrap();
    }
}

const SETTLE: Duration = Duration::from_millis(10);

#[tokio::test(start_paused = true)]
async fn enabling_scans_immediately() {
    let rig = Rig::start(
        FakeTransport::default(),
        settings(&["broken"], &[], true),
        vec![item("42", "this is broken"), item("43", "all good")],
    );
    sleep(SETTLE).await;

    assert_eq!(rig.transport.sent_ids(), vec![vec!["42".to_string()]]);
    assert_eq!(
        rig.sink.take(),
        vec![AgentEvent::Started, AgentEvent::Collected(1)]
    );
    assert_eq!(rig.store.load().unwrap().collected_count, 1);
}

#[tokio::test(start_paused = true)]
async fn starts_on_config_change() {
    let rig = Rig::start(
        FakeTransport::default(),
        settings(&["bug"], &[], false),
        vec![item("1", "found a bug")],
    );
    sleep(Duration::from_secs(30)).await;
    assert_eq!(rig.transport.calls(), 0);

    rig.set_enabled(true);
    sleep(SETTLE).await;
    assert_eq!(rig.transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn periodic_scan_picks_up_new_items() {
    let rig = Rig::start(
        FakeTransport::default(),
        settings(&["bug"], &[], true),
        vec![item("1", "bug one")],
    );
    sleep(SETTLE).await;
    rig.view
        .replace(vec![item("1", "bug one"), item("2", "bug two")]);

    sleep(Duration::from_secs(9)).await;
    assert_eq!(rig.transport.calls(), 1);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(
        rig.transport.sent_ids(),
        vec![vec!["1".to_string()], vec!["2".to_string()]]
    );
}

#[tokio::test(start_paused = true)]
async fn disabling_stops_automatic_scans() {
    let rig = Rig::start(
        FakeTransport::default(),
        settings(&["bug"], &[], true),
        vec![item("1", "bug one")],
    );
    sleep(SETTLE).await;
    rig.set_enabled(false);
    sleep(SETTLE).await;

    rig.view.replace(vec![item("2", "bug two")]);
    rig.handle.scrolled();
    sleep(Duration::from_secs(60)).await;

    assert_eq!(rig.transport.calls(), 1);
    assert_eq!(
        rig.sink.take(),
        vec![
            AgentEvent::Started,
            AgentEvent::Collected(1),
            AgentEvent::Stopped
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn scroll_burst_triggers_one_scan_after_quiet_period() {
    let rig = Rig::start(
        FakeTransport::default(),
        settings(&["bug"], &[], true),
        vec![item("1", "bug one")],
    );
    sleep(SETTLE).await;
    rig.view
        .replace(vec![item("1", "bug one"), item("2", "bug two")]);

    for _ in 0..3 {
        rig.handle.scrolled();
        sleep(Duration::from_millis(500)).await;
    }
    // Last scroll was 500ms ago; quiet period is 2s.
    sleep(Duration::from_millis(1400)).await;
    assert_eq!(rig.transport.calls(), 1);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(rig.transport.calls(), 2);
    assert_eq!(rig.transport.sent_ids()[1], vec!["2".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn scan_now_works_while_disabled() {
    let rig = Rig::start(
        FakeTransport::default(),
        settings(&["bug"], &[], false),
        vec![item("1", "bug one"), item("2", "bug two")],
    );

    let ack = rig.handle.scan_now().await.unwrap();
    assert_eq!(ack, ScanAck { collected: 2 });
    sleep(SETTLE).await;
    assert_eq!(rig.transport.calls(), 1);
    assert!(rig.store.load().unwrap().last_sync.is_some());

    let again = rig.handle.scan_now().await.unwrap();
    assert_eq!(again, ScanAck { collected: 0 });
    sleep(SETTLE).await;
    assert_eq!(rig.transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_batch_is_not_retried() {
    let rig = Rig::start(
        FakeTransport::failing(SubmitFailure::Network),
        settings(&["bug"], &[], false),
        vec![item("1", "bug one")],
    );

    assert_eq!(rig.handle.scan_now().await.unwrap().collected, 1);
    sleep(SETTLE).await;
    assert_eq!(rig.handle.scan_now().await.unwrap().collected, 0);
    sleep(SETTLE).await;

    assert_eq!(rig.transport.calls(), 1);
    assert_eq!(rig.store.load().unwrap().collected_count, 0);
    let events = rig.sink.take();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], AgentEvent::Error(_)));
}

#[tokio::test(start_paused = true)]
async fn in_flight_submission_finishes_after_disable() {
    let rig = Rig::start(
        FakeTransport::slow(Duration::from_secs(5)),
        settings(&["bug"], &[], true),
        vec![item("1", "bug one")],
    );
    sleep(SETTLE).await;
    rig.set_enabled(false);
    sleep(SETTLE).await;
    assert_eq!(rig.sink.take(), vec![AgentEvent::Started, AgentEvent::Stopped]);

    sleep(Duration::from_secs(6)).await;
    assert_eq!(rig.sink.take(), vec![AgentEvent::Collected(1)]);
    assert_eq!(rig.store.load().unwrap().collected_count, 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_waits_for_in_flight_submissions() {
    let mut rig = Rig::start(
        FakeTransport::slow(Duration::from_secs(5)),
        settings(&["bug"], &[], true),
        vec![item("1", "bug one")],
    );
    sleep(SETTLE).await;

    rig.stop().await;
    assert_eq!(
        rig.sink.take(),
        vec![
            AgentEvent::Started,
            AgentEvent::Stopped,
            AgentEvent::Collected(1)
        ]
    );
    assert_eq!(rig.handle.scan_now().await, Err(AgentError::Closed));
}

#[tokio::test(start_paused = true)]
async fn timer_does_not_scan_once_store_says_disabled() {
    let rig = Rig::start_with(
        FakeTransport::default(),
        settings(&["bug"], &[], true),
        vec![item("1", "bug one")],
        AgentSettings {
            config_poll: Duration::from_secs(3),
            ..AgentSettings::default()
        },
    );
    sleep(SETTLE).await;
    rig.view
        .replace(vec![item("1", "bug one"), item("2", "bug two")]);

    // Last poll ran at 9s; nobody signals the change.
    sleep(Duration::from_millis(9390)).await;
    rig.store.set_enabled(false).unwrap();
    sleep(Duration::from_millis(800)).await;

    assert_eq!(rig.transport.sent_ids(), vec![vec!["1".to_string()]]);
    assert_eq!(
        rig.sink.take(),
        vec![
            AgentEvent::Started,
            AgentEvent::Collected(1),
            AgentEvent::Stopped
        ]
    );

    sleep(Duration::from_secs(30)).await;
    assert_eq!(rig.transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn view_failure_is_reported_and_scheduling_continues() {
    let rig = Rig::start(
        FakeTransport::default(),
        settings(&["bug"], &[], true),
        vec![item("1", "bug one")],
    );
    rig.view.set_failing(true);
    sleep(SETTLE).await;

    let err = rig.handle.scan_now().await.unwrap_err();
    assert!(matches!(err, AgentError::View(_)));
    assert_eq!(rig.transport.calls(), 0);

    rig.view.set_failing(false);
    sleep(Duration::from_secs(10)).await;
    assert_eq!(rig.transport.sent_ids(), vec![vec!["1".to_string()]]);
    // View errors stay out of the notification stream.
    assert_eq!(
        rig.sink.take(),
        vec![AgentEvent::Started, AgentEvent::Collected(1)]
    );
}

#[tokio::test(start_paused = true)]
async fn keyword_change_applies_to_next_scan() {
    let rig = Rig::start(
        FakeTransport::default(),
        settings(&["bug"], &[], true),
        vec![item("1", "bug one")],
    );
    sleep(SETTLE).await;

    let mut config = rig.store.config().unwrap();
    config.keywords = vec!["lag".to_string()];
    rig.store.save(&config).unwrap();
    rig.view.replace(vec![
        item("1", "bug one"),
        item("2", "lag spike"),
        item("3", "bug two"),
    ]);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(
        rig.transport.sent_ids(),
        vec![vec!["1".to_string()], vec!["2".to_string()]]
    );
}
