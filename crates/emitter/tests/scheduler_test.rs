use async_trait::async_trait;
use datagen_emitter::{
    interrupt_token, EmitterConfig, EmitterError, Scheduler, SchedulerError, Throughput,
};
use datagen_producer::{LocalRegistry, PluginPool, ProduceResponse, Producer, ProducerError};
use datagen_random::RandomSource;
use datagen_state::GenerationState;
use datagen_template::{DataDirs, TemplateSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Records everything it is asked to produce.
#[derive(Default)]
struct Recorder {
    records: Mutex<Vec<(String, String, HashMap<String, String>)>>,
    closed: AtomicUsize,
    fail_every: Option<usize>,
    calls: AtomicUsize,
}

impl Recorder {
    fn failing_every(n: usize) -> Self {
        Self {
            fail_every: Some(n),
            ..Default::default()
        }
    }

    fn values(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(_, value, _)| value.clone())
            .collect()
    }

    fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl Producer for Recorder {
    async fn produce(
        &self,
        key: &[u8],
        value: &[u8],
        headers: &HashMap<String, String>,
        _config_params: &HashMap<String, String>,
    ) -> Result<ProduceResponse, ProducerError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(n) = self.fail_every {
            if call % n == 0 {
                return Err(ProducerError::Produce(format!("call {call} rejected")));
            }
        }
        self.records.lock().unwrap().push((
            String::from_utf8_lossy(key).into_owned(),
            String::from_utf8_lossy(value).into_owned(),
            headers.clone(),
        ));
        Ok(ProduceResponse::new(value.len() as u64, "ok"))
    }

    async fn close(&self) -> Result<(), ProducerError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Harness {
    scheduler: Scheduler,
    recorder: Arc<Recorder>,
    created: Arc<AtomicUsize>,
    _dir: TempDir,
}

fn harness_with(recorder: Recorder, random: RandomSource) -> Harness {
    let dir = TempDir::new().unwrap();
    let recorder = Arc::new(recorder);
    let created = Arc::new(AtomicUsize::new(0));

    let registry = LocalRegistry::empty();
    let (r, c) = (recorder.clone(), created.clone());
    registry.register(
        "recorder",
        Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
            r.clone() as Arc<dyn Producer>
        }),
    );
    let dirs = DataDirs::new(dir.path().join("user"), dir.path().join("system"));
    let pool = PluginPool::with_registry(Arc::new(registry), dirs.plugins_dirs().to_vec());
    let shared = Arc::new(GenerationState::new(random));

    Harness {
        scheduler: Scheduler::new(shared, Arc::new(pool), dirs),
        recorder,
        created,
        _dir: dir,
    }
}

fn harness() -> Harness {
    harness_with(Recorder::default(), RandomSource::unseeded())
}

fn config(name: &str, value: &str) -> EmitterConfig {
    let mut config = EmitterConfig::new(name, TemplateSource::inline(value));
    config.output = "recorder".to_string();
    config
}

fn single_shot(name: &str, value: &str, num: usize) -> EmitterConfig {
    let mut config = config(name, value);
    config.tick.num = num;
    config.tick.frequency = Duration::ZERO;
    config
}

#[tokio::test]
async fn test_single_shot_emits_num_records() {
    let h = harness();
    let report = h
        .scheduler
        .run(
            vec![single_shot("one", "v{{counter \"c\" 0 1}}", 5)],
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(h.recorder.values(), vec!["v0", "v1", "v2", "v3", "v4"]);
    let emitter = report.emitter("one").unwrap();
    assert_eq!(emitter.produced, 5);
    assert_eq!(emitter.ticks, 1);
    assert_eq!(report.execution.generated_objects, 5);
    assert_eq!(report.execution.generated_bytes, 10);
    assert_eq!(h.recorder.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_same_output_is_opened_once_for_all_emitters() {
    let h = harness();
    let report = h
        .scheduler
        .run(
            vec![single_shot("a", "a", 3), single_shot("b", "b", 2)],
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(h.created.load(Ordering::SeqCst), 1);
    assert_eq!(h.recorder.count(), 5);
    assert_eq!(h.recorder.closed.load(Ordering::SeqCst), 1);
    assert_eq!(report.plugins.closed, 1);
    assert_eq!(report.produced(), 5);
}

#[tokio::test]
async fn test_key_headers_and_output_template() {
    let h = harness();
    let mut config = single_shot("full", "{{counter \"n\" 1 1}}", 2);
    config.key = TemplateSource::inline("k-{{.V}}");
    config.header = Some(TemplateSource::inline(r#"{"source":"test"}"#));
    config.output_template = TemplateSource::inline("{\"key\":{{.K}},\"value\":{{.V}}}");

    h.scheduler
        .run(vec![config], CancellationToken::new())
        .await
        .unwrap();

    let records = h.recorder.records.lock().unwrap().clone();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].0, "k-");
    assert_eq!(records[0].1, r#"{"key":k-,"value":1}"#);
    assert_eq!(records[1].1, r#"{"key":k-,"value":2}"#);
    assert_eq!(records[0].2["source"], "test");
}

#[tokio::test]
async fn test_oneline_strips_newlines() {
    let h = harness();
    let mut config = single_shot("lines", "a\nb\r\nc", 1);
    config.oneline = true;

    h.scheduler
        .run(vec![config], CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(h.recorder.values(), vec!["abc"]);
}

#[tokio::test]
async fn test_preload_runs_before_first_tick() {
    let h = harness();
    let mut config = single_shot("pre", "{{counter \"p\" 0 1}}", 2);
    config.preload = 3;

    let report = h
        .scheduler
        .run(vec![config], CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(h.recorder.values(), vec!["0", "1", "2", "3", "4"]);
    assert_eq!(report.emitter("pre").unwrap().ticks, 1);
}

#[tokio::test]
async fn test_failed_records_do_not_stop_the_emitter() {
    let h = harness_with(Recorder::failing_every(2), RandomSource::unseeded());
    let report = h
        .scheduler
        .run(vec![single_shot("flaky", "x", 6)], CancellationToken::new())
        .await
        .unwrap();

    let emitter = report.emitter("flaky").unwrap();
    assert_eq!(emitter.produced, 3);
    assert_eq!(emitter.failed, 3);
    assert_eq!(report.execution.generated_objects, 3);
    assert_eq!(h.recorder.count(), 3);
}

#[tokio::test]
async fn test_render_errors_are_counted_per_record() {
    let h = harness();
    let report = h
        .scheduler
        .run(
            vec![single_shot("bad", "{{integer 5 1}}", 4)],
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.emitter("bad").unwrap().failed, 4);
    assert_eq!(h.recorder.count(), 0);
}

#[tokio::test]
async fn test_startup_errors_are_reported_before_any_tick() {
    let h = harness();
    let mut unknown = single_shot("missing-output", "x", 1);
    unknown.output = "/nonexistent/datagen-plugin".to_string();
    let configs = vec![
        single_shot("good", "x", 1),
        single_shot("broken", "{{nosuchfunction}}", 1),
        unknown,
    ];

    let err = h
        .scheduler
        .run(configs, CancellationToken::new())
        .await
        .unwrap_err();

    let SchedulerError::Startup(errors) = err;
    assert_eq!(errors.len(), 2);
    assert!(matches!(
        &errors[0],
        EmitterError::Template { emitter, field: "value", .. } if emitter == "broken"
    ));
    assert!(matches!(
        &errors[1],
        EmitterError::Output { emitter, .. } if emitter == "missing-output"
    ));
    assert_eq!(h.recorder.count(), 0);
    assert_eq!(h.recorder.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_allow_partial_runs_healthy_emitters() {
    let h = harness();
    let scheduler = h.scheduler.allow_partial(true);
    let report = scheduler
        .run(
            vec![single_shot("good", "x", 2), single_shot("broken", "{{", 1)],
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.emitters.len(), 1);
    assert_eq!(report.produced(), 2);
}

#[tokio::test]
async fn test_zero_num_is_rejected() {
    let h = harness();
    let err = h
        .scheduler
        .run(vec![single_shot("none", "x", 0)], CancellationToken::new())
        .await
        .unwrap_err();
    let SchedulerError::Startup(errors) = err;
    assert!(matches!(&errors[0], EmitterError::Invalid { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_duration_stops_periodic_emitter() {
    let h = harness();
    let mut config = config("timed", "t");
    config.tick.num = 2;
    config.tick.frequency = Duration::from_millis(100);
    config.tick.duration = Some(Duration::from_millis(550));

    let report = h
        .scheduler
        .run(vec![config], CancellationToken::new())
        .await
        .unwrap();

    let emitter = report.emitter("timed").unwrap();
    assert_eq!(emitter.ticks, 5);
    assert_eq!(emitter.produced, 10);
    assert_eq!(h.recorder.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_immediate_start_fires_at_zero() {
    let h = harness();
    let mut config = config("eager", "e");
    config.tick.frequency = Duration::from_millis(100);
    config.tick.duration = Some(Duration::from_millis(250));
    config.tick.immediate_start = true;

    let report = h
        .scheduler
        .run(vec![config], CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.emitter("eager").unwrap().ticks, 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_every_emitter_and_closes_plugins() {
    let h = harness();
    let mut slow = config("slow", "s");
    slow.tick.frequency = Duration::from_secs(1);
    let mut fast = config("fast", "f");
    fast.tick.frequency = Duration::from_millis(10);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        trigger.cancel();
    });

    let report = h.scheduler.run(vec![slow, fast], cancel).await.unwrap();

    assert_eq!(report.emitter("slow").unwrap().ticks, 2);
    assert!(report.emitter("fast").unwrap().ticks >= 200);
    assert_eq!(h.recorder.closed.load(Ordering::SeqCst), 1);
    assert_eq!(report.plugins.closed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_metered_throughput_sets_the_period() {
    let h = harness();
    // 10 byte records, 2 per tick, at 200 bytes/s: one tick every 100ms.
    let mut config = config("metered", "0123456789");
    config.tick.num = 2;
    config.tick.frequency = Duration::from_secs(60);
    config.tick.throughput = Throughput::bytes_per_second(200.0);
    config.tick.duration = Some(Duration::from_millis(1050));

    let report = h
        .scheduler
        .run(vec![config], CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.emitter("metered").unwrap().ticks, 10);
}

#[tokio::test(start_paused = true)]
async fn test_throughput_sample_leaves_counters_untouched() {
    let h = harness();
    // The sample renders "0": 3 bytes per tick at 300 bytes/s is one tick every 10ms.
    let mut config = single_shot("sampled", "{{counter \"s\" 0 1}}", 3);
    config.tick.throughput = Throughput::bytes_per_second(300.0);
    config.tick.duration = Some(Duration::from_millis(25));

    let report = h
        .scheduler
        .run(vec![config], CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.emitter("sampled").unwrap().ticks, 2);
    assert_eq!(h.recorder.values(), vec!["0", "1", "2", "3", "4", "5"]);
}

#[tokio::test]
async fn test_unrenderable_throughput_sample_fails_startup() {
    let h = harness();
    let mut config = config("unsized", "{{integer 5 5}}");
    config.tick.throughput = Throughput::bytes_per_second(10.0);

    let err = h
        .scheduler
        .run(vec![config], CancellationToken::new())
        .await
        .unwrap_err();

    let SchedulerError::Startup(errors) = err;
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        EmitterError::Invalid { emitter, message } => {
            assert_eq!(emitter, "unsized");
            assert!(message.contains("sample record"), "{message}");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(h.recorder.count(), 0);
    assert_eq!(h.recorder.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_seeded_runs_are_reproducible() {
    let template = "{{uuid}} {{integer 0 1000}} {{city}} {{name}}";

    let first = harness_with(Recorder::default(), RandomSource::seeded(42));
    first
        .scheduler
        .run(vec![single_shot("s", template, 20)], CancellationToken::new())
        .await
        .unwrap();

    let second = harness_with(Recorder::default(), RandomSource::seeded(42));
    second
        .scheduler
        .run(vec![single_shot("s", template, 20)], CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(first.recorder.values(), second.recorder.values());
    assert_eq!(first.recorder.count(), 20);
}

#[tokio::test]
async fn test_interrupt_token_drives_a_run() {
    let h = harness();
    let token = interrupt_token();
    assert!(!token.is_cancelled());

    let report = h
        .scheduler
        .run(vec![single_shot("once", "x", 2)], token.clone())
        .await
        .unwrap();
    assert_eq!(report.emitter("once").unwrap().produced, 2);
    assert!(!token.is_cancelled());

    token.cancel();
    tokio::task::yield_now().await;
    assert!(token.is_cancelled());
}
