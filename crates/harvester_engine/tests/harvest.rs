use std::fs;
use std::io::{self, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use harvester_engine::{
    FailureKind, HarvestConfig, HarvestError, HarvestEvent, Harvester, LedgerOrder, ProbeError,
    ProbeResponse, ProbeTarget, Prober, ProgressSink, ReqwestProber, SessionConfig, UserId,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    engine_logging::initialize_for_tests();
}

/// Answers from the ID alone; higher IDs finish first so completion order is scrambled.
struct ScriptedProber {
    end_id: UserId,
}

impl ScriptedProber {
    fn expected(id: UserId) -> Option<String> {
        if id % 3 == 0 {
            None
        } else if id % 2 == 0 {
            Some(format!("user{id}"))
        } else {
            None
        }
    }
}

#[async_trait::async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, target: &ProbeTarget) -> Result<ProbeResponse, ProbeError> {
        let delay = (self.end_id - target.id) * 3;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        let id = target.id;
        if id % 3 == 0 {
            return Err(ProbeError {
                kind: FailureKind::Network,
                message: "scripted failure".into(),
            });
        }
        let location = (id % 2 == 0).then(|| format!("https://voz.vn/u/user{id}.{id}/"));
        Ok(ProbeResponse {
            status: if location.is_some() { 303 } else { 200 },
            location,
        })
    }
}

/// Panics on one ID and resolves every other ID to `u{id}`.
struct PanickingProber {
    panic_on: UserId,
}

#[async_trait::async_trait]
impl Prober for PanickingProber {
    async fn probe(&self, target: &ProbeTarget) -> Result<ProbeResponse, ProbeError> {
        if target.id == self.panic_on {
            panic!("prober blew up on id {}", target.id);
        }
        Ok(ProbeResponse {
            status: 303,
            location: Some(format!("https://voz.vn/u/u{0}.{0}/", target.id)),
        })
    }
}

/// Tracks how many probes are in flight at once.
#[derive(Default)]
struct GaugeProber {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait::async_trait]
impl Prober for GaugeProber {
    async fn probe(&self, _target: &ProbeTarget) -> Result<ProbeResponse, ProbeError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(15)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(ProbeResponse {
            status: 200,
            location: None,
        })
    }
}

#[derive(Default)]
struct CollectingSink {
    events: Mutex<Vec<HarvestEvent>>,
}

impl ProgressSink for CollectingSink {
    fn emit(&self, event: HarvestEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(ToOwned::to_owned)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct BrokenWriter;

impl Write for BrokenWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn config(start: UserId, end: UserId, workers: usize, order: LedgerOrder) -> HarvestConfig {
    HarvestConfig {
        base_url: "https://voz.vn/u/dummy".to_string(),
        start_id: start,
        end_id: end,
        max_workers: workers,
        order,
    }
}

fn expected_lines(start: UserId, end: UserId) -> Vec<String> {
    (start..=end)
        .map(|id| ScriptedProber::expected(id).unwrap_or_default())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_id_gets_exactly_one_line_despite_failures() {
    init_logging();
    let harvester = Harvester::new(
        config(1, 30, 5, LedgerOrder::Completion),
        Arc::new(ScriptedProber { end_id: 30 }),
    )
    .unwrap();
    let buffer = SharedBuffer::default();

    let summary = harvester.run(buffer.clone()).await.unwrap();

    let mut lines = buffer.lines();
    let mut expected = expected_lines(1, 30);
    assert_eq!(lines.len(), 30);
    lines.sort();
    expected.sort();
    assert_eq!(lines, expected);
    assert_eq!(summary.total, 30);
    assert_eq!(summary.resolved + summary.failed, 30);
    assert_eq!(summary.resolved, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn ascending_ledger_matches_line_to_id() {
    let harvester = Harvester::new(
        config(7, 40, 8, LedgerOrder::Ascending),
        Arc::new(ScriptedProber { end_id: 40 }),
    )
    .unwrap();
    let buffer = SharedBuffer::default();

    harvester.run(buffer.clone()).await.unwrap();

    assert_eq!(buffer.lines(), expected_lines(7, 40));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn progress_sink_sees_every_probe() {
    let sink = Arc::new(CollectingSink::default());
    let harvester = Harvester::new(
        config(1, 12, 3, LedgerOrder::Completion),
        Arc::new(ScriptedProber { end_id: 12 }),
    )
    .unwrap()
    .with_progress_sink(sink.clone());

    harvester.run(SharedBuffer::default()).await.unwrap();

    let mut ids: Vec<_> = sink
        .events
        .lock()
        .unwrap()
        .iter()
        .map(|HarvestEvent::ProbeCompleted(result)| result.id)
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=12).collect::<Vec<_>>());
}

#[tokio::test]
async fn more_workers_than_ids_is_fine() {
    let harvester = Harvester::new(
        config(5, 5, 20, LedgerOrder::Completion),
        Arc::new(ScriptedProber { end_id: 5 }),
    )
    .unwrap();
    let buffer = SharedBuffer::default();

    let summary = harvester.run(buffer.clone()).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(buffer.lines(), vec![String::new()]);
}

#[tokio::test]
async fn unwritable_ledger_is_fatal() {
    let harvester = Harvester::new(
        config(1, 50, 4, LedgerOrder::Completion),
        Arc::new(ScriptedProber { end_id: 50 }),
    )
    .unwrap();

    let err = harvester.run(BrokenWriter).await.unwrap_err();

    assert!(matches!(err, HarvestError::Ledger(_)));
}

#[test]
fn invalid_configs_are_rejected_before_dispatch() {
    let prober = Arc::new(ScriptedProber { end_id: 1 });

    let inverted = Harvester::new(config(10, 9, 4, LedgerOrder::Completion), prober.clone());
    assert!(matches!(
        inverted,
        Err(HarvestError::InvalidRange { start: 10, end: 9 })
    ));

    let no_workers = Harvester::new(config(1, 2, 0, LedgerOrder::Completion), prober.clone());
    assert!(matches!(no_workers, Err(HarvestError::ZeroWorkers)));

    let mut bad_url = config(1, 2, 4, LedgerOrder::Completion);
    bad_url.base_url = "not a url".to_string();
    assert!(matches!(
        Harvester::new(bad_url, prober),
        Err(HarvestError::InvalidBaseUrl { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn http_harvest_writes_usernames_and_placeholders() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u/dummy.1/"))
        .respond_with(
            ResponseTemplate::new(303).insert_header("Location", "https://voz.vn/u/alice.123/"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/u/dummy.2/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/u/dummy.4/"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let ledger = temp.path().join("vozer_crawler.txt");
    fs::write(&ledger, "stale\n").unwrap();
    let mut harvest_config = config(1, 4, 20, LedgerOrder::Ascending);
    harvest_config.base_url = format!("{}/u/dummy", server.uri());
    let prober = ReqwestProber::new(&SessionConfig::default()).unwrap();
    let harvester = Harvester::new(harvest_config, Arc::new(prober)).unwrap();

    let summary = harvester.run_to_file(&ledger).await.unwrap();

    assert_eq!(fs::read_to_string(&ledger).unwrap(), "alice\n\n\n\n");
    assert_eq!(summary.resolved, 1);
    assert_eq!(summary.failed, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unreachable_host_still_completes_batch() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let temp = TempDir::new().unwrap();
    let ledger = temp.path().join("out.txt");
    let mut harvest_config = config(1, 6, 3, LedgerOrder::Completion);
    harvest_config.base_url = format!("http://127.0.0.1:{port}/u/dummy");
    let prober = ReqwestProber::new(&SessionConfig::default()).unwrap();
    let harvester = Harvester::new(harvest_config, Arc::new(prober)).unwrap();

    let summary = harvester.run_to_file(&ledger).await.unwrap();

    assert_eq!(fs::read_to_string(&ledger).unwrap(), "\n".repeat(6));
    assert_eq!(summary.failed, 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panic_on_one_id_leaves_rest_of_backlog_harvested() {
    init_logging();
    let harvester = Harvester::new(
        config(1, 6, 1, LedgerOrder::Ascending),
        Arc::new(PanickingProber { panic_on: 3 }),
    )
    .unwrap();
    let buffer = SharedBuffer::default();

    let summary = harvester.run(buffer.clone()).await.unwrap();

    assert_eq!(buffer.lines(), vec!["u1", "u2", "", "u4", "u5", "u6"]);
    assert_eq!(summary.resolved, 5);
    assert_eq!(summary.failed, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_requests_never_exceed_worker_count() {
    let prober = Arc::new(GaugeProber::default());
    let harvest_config = config(1, 40, 4, LedgerOrder::Completion);
    let harvester = Harvester::new(harvest_config, prober.clone()).unwrap();
    let buffer = SharedBuffer::default();

    let summary = harvester.run(buffer.clone()).await.unwrap();

    assert_eq!(summary.total, 40);
    assert_eq!(buffer.lines().len(), 40);
    assert_eq!(prober.peak.load(Ordering::SeqCst), 4);
    assert_eq!(prober.in_flight.load(Ordering::SeqCst), 0);
}
