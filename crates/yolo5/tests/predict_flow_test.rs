//! End-to-end tests for `POST /predict`
//!
//! S3 is an in-memory object store, YOLOv5 a fake detector that writes its
//! outputs into a temp project dir, MongoDB a recording store.
//! Run with: cargo test -p yolo5 --test predict_flow_test

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use polycore::{BlobStorage, PredictionSummary};
use pretty_assertions::assert_eq;
use tower::ServiceExt;
use yolo5::config::KeyLayout;
use yolo5::inference::{DetectError, DetectionOutput, DetectionRequest, Detector};
use yolo5::server::create_router;
use yolo5::store::{StoreError, SummaryStore};
use yolo5::{ClassTable, PredictionService};

/// What the fake detector leaves behind
#[derive(Clone, Copy)]
enum Run {
    Labels(&'static str),
    NoLabelFile,
    Crash,
}

struct FakeDetector {
    project_dir: PathBuf,
    run: Run,
    calls: AtomicUsize,
    sources: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl Detector for FakeDetector {
    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionOutput, DetectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sources.lock().unwrap().push(request.source.clone());
        let output = DetectionOutput::for_run(&self.project_dir, &request.run_name, &request.source);

        if let Run::Crash = self.run {
            return Err(DetectError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "CUDA out of memory".to_string(),
            });
        }

        let original = std::fs::read(&request.source)?;
        std::fs::create_dir_all(output.labels_file.parent().unwrap())?;
        std::fs::write(&output.annotated_image, [b"annotated:".as_slice(), &original].concat())?;
        if let Run::Labels(contents) = self.run {
            std::fs::write(&output.labels_file, contents)?;
        }
        Ok(output)
    }
}

#[derive(Default)]
struct RecordingStore {
    inserted: Mutex<Vec<PredictionSummary>>,
    fail: bool,
}

#[async_trait]
impl SummaryStore for RecordingStore {
    async fn insert(&self, summary: &PredictionSummary) -> Result<(), StoreError> {
        if self.fail {
            let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
            return Err(StoreError::Mongo(refused.into()));
        }
        self.inserted.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

struct Harness {
    router: Router,
    objects: Arc<InMemory>,
    detector: Arc<FakeDetector>,
    store: Arc<RecordingStore>,
    _dirs: tempfile::TempDir,
}

impl Harness {
    async fn new(run: Run, layout: KeyLayout, store: RecordingStore) -> Self {
        let dirs = tempfile::tempdir().unwrap();
        let objects = Arc::new(InMemory::new());
        objects
            .put(&ObjectPath::from("street.jpg"), PutPayload::from_static(b"jpeg-bytes"))
            .await
            .unwrap();

        let detector = Arc::new(FakeDetector {
            project_dir: dirs.path().join("runs"),
            run,
            calls: AtomicUsize::new(0),
            sources: Mutex::new(Vec::new()),
        });
        let store = Arc::new(store);
        let classes = ClassTable::new(vec!["person".to_string(), "bicycle".to_string(), "car".to_string()]);

        let service = PredictionService::new(
            BlobStorage::new(objects.clone(), "images"),
            detector.clone(),
            store.clone(),
            Arc::new(classes),
            dirs.path().join("images"),
            layout,
        );

        Self {
            router: create_router(Arc::new(service)),
            objects,
            detector,
            store,
            _dirs: dirs,
        }
    }

    async fn post(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn object(&self, key: &str) -> Option<Vec<u8>> {
        let result = self.objects.get(&ObjectPath::from(key)).await.ok()?;
        Some(result.bytes().await.unwrap().to_vec())
    }

    fn inserted(&self) -> Vec<PredictionSummary> {
        self.store.inserted.lock().unwrap().clone()
    }
}

async fn harness(run: Run) -> Harness {
    Harness::new(run, KeyLayout::PerPrediction, RecordingStore::default()).await
}

#[tokio::test]
async fn test_success_returns_and_stores_summary() {
    let h = harness(Run::Labels("2 0.1 0.2 0.3 0.4\n0 0.5 0.5 0.2 0.3 0.91\n")).await;

    let (status, body) = h.post("/predict?imgName=street.jpg").await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    let summary: PredictionSummary = serde_json::from_str(&body).unwrap();
    assert_eq!(summary.original_image, "street.jpg");
    assert_eq!(
        summary.predicted_image,
        format!("predictions/{}/street.jpg", summary.prediction_id)
    );
    let classes: Vec<&str> = summary.labels.iter().map(|l| l.class_name.as_str()).collect();
    assert_eq!(classes, vec!["car", "person"]);
    assert!(summary.time > 0.0);

    assert_eq!(
        h.object(&summary.predicted_image).await.unwrap(),
        b"annotated:jpeg-bytes".to_vec()
    );
    assert_eq!(h.inserted(), vec![summary]);
}

#[tokio::test]
async fn test_response_uses_stored_document_keys() {
    let h = harness(Run::Labels("1 0.25 0.75 0.1 0.1\n")).await;

    let (_, body) = h.post("/predict?imgName=street.jpg").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert_eq!(json["original_img_path"], "street.jpg");
    assert_eq!(json["labels"][0]["class"], "bicycle");
    assert_eq!(json["labels"][0]["cx"], 0.25);
    assert!(json["prediction_id"].is_string());
}

#[tokio::test]
async fn test_missing_image_is_500_without_inference() {
    let h = harness(Run::Labels("0 0.5 0.5 0.2 0.3\n")).await;

    let (status, body) = h.post("/predict?imgName=absent.jpg").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(
        json["error"].as_str().unwrap().starts_with("Failed to download image: "),
        "body: {}",
        body
    );
    assert_eq!(h.detector.calls.load(Ordering::SeqCst), 0);
    assert!(h.inserted().is_empty());
}

#[tokio::test]
async fn test_missing_label_file_is_404_without_store_write() {
    let h = harness(Run::NoLabelFile).await;

    let (status, body) = h.post("/predict?imgName=street.jpg").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.starts_with("prediction: "), "body: {}", body);
    assert!(body.ends_with("/street.jpg. prediction result not found"), "body: {}", body);
    assert!(h.inserted().is_empty());
}

#[tokio::test]
async fn test_zero_detections_is_200_with_empty_labels() {
    let h = harness(Run::Labels("")).await;

    let (status, body) = h.post("/predict?imgName=street.jpg").await;

    assert_eq!(status, StatusCode::OK);
    let summary: PredictionSummary = serde_json::from_str(&body).unwrap();
    assert!(summary.labels.is_empty());
    assert_eq!(h.inserted().len(), 1);
}

#[tokio::test]
async fn test_same_image_twice_gets_distinct_predictions() {
    let h = harness(Run::Labels("0 0.5 0.5 0.2 0.3\n")).await;

    let (_, first) = h.post("/predict?imgName=street.jpg").await;
    let (_, second) = h.post("/predict?imgName=street.jpg").await;

    let first: PredictionSummary = serde_json::from_str(&first).unwrap();
    let second: PredictionSummary = serde_json::from_str(&second).unwrap();
    assert_ne!(first.prediction_id, second.prediction_id);
    assert_eq!(h.inserted().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_requests_for_one_image_use_separate_local_files() {
    let h = harness(Run::Labels("0 0.5 0.5 0.2 0.3\n")).await;

    let (first, second) = tokio::join!(
        h.post("/predict?imgName=street.jpg"),
        h.post("/predict?imgName=street.jpg")
    );
    assert_eq!(first.0, StatusCode::OK, "body: {}", first.1);
    assert_eq!(second.0, StatusCode::OK, "body: {}", second.1);

    let sources = h.detector.sources.lock().unwrap().clone();
    assert_eq!(sources.len(), 2);
    assert_ne!(sources[0], sources[1]);
    for source in &sources {
        assert_eq!(source.file_name().unwrap(), "street.jpg");
        assert_eq!(std::fs::read(source).unwrap(), b"jpeg-bytes");
    }

    let summaries: Vec<PredictionSummary> = [first.1, second.1]
        .iter()
        .map(|body| serde_json::from_str(body).unwrap())
        .collect();
    for summary in &summaries {
        assert!(
            sources.iter().any(|s| s.parent().unwrap().ends_with(&summary.prediction_id)),
            "no local file for {}",
            summary.prediction_id
        );
    }
}

#[tokio::test]
async fn test_inference_failure_is_500() {
    let h = harness(Run::Crash).await;

    let (status, body) = h.post("/predict?imgName=street.jpg").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Inference failed: "), "body: {}", body);
    assert!(body.contains("CUDA out of memory"));
    assert!(h.inserted().is_empty());
}

#[tokio::test]
async fn test_unknown_class_index_is_500() {
    let h = harness(Run::Labels("9 0.5 0.5 0.2 0.3\n")).await;

    let (status, body) = h.post("/predict?imgName=street.jpg").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("class index 9"), "body: {}", body);
    assert!(h.inserted().is_empty());
}

#[tokio::test]
async fn test_store_failure_is_500() {
    let store = RecordingStore {
        fail: true,
        ..Default::default()
    };
    let h = Harness::new(Run::Labels("0 0.5 0.5 0.2 0.3\n"), KeyLayout::PerPrediction, store).await;

    let (status, body) = h.post("/predict?imgName=street.jpg").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    let message = json["error"].as_str().unwrap();
    assert!(message.starts_with("Failed to store prediction summary: "), "body: {}", body);
    assert!(message.contains("connection refused"), "body: {}", body);
}

#[tokio::test]
async fn test_flat_layout_key() {
    let h = Harness::new(Run::Labels("0 0.5 0.5 0.2 0.3\n"), KeyLayout::Flat, RecordingStore::default()).await;

    let (status, body) = h.post("/predict?imgName=street.jpg").await;

    assert_eq!(status, StatusCode::OK);
    let summary: PredictionSummary = serde_json::from_str(&body).unwrap();
    assert_eq!(summary.predicted_image, "predicted/street.jpg");
    assert!(h.object("predicted/street.jpg").await.is_some());
}

#[tokio::test]
async fn test_bad_image_names_are_400() {
    let h = harness(Run::Labels("0 0.5 0.5 0.2 0.3\n")).await;

    for uri in ["/predict", "/predict?imgName=", "/predict?imgName=..%2Fsecret.jpg"] {
        let (status, body) = h.post(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} -> {}", uri, body);
        assert!(body.contains("\"error\""));
    }
    assert_eq!(h.detector.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_health_check() {
    let h = harness(Run::NoLabelFile).await;

    let response = h
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
