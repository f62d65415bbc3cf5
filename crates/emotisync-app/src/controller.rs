//! Page controller — sequences acquire → size check → compress → encode →
//! submit → process → render, and owns the view state.

use crate::notify::{Notice, Notifier, ToastKind};
use emotisync_client::{HealthStatus, RecognitionClient, RequestError};
use emotisync_core::{
    processor, FaceDetection, MediaAsset, MediaKind, RecognitionRequest, RecognitionResponse,
};
use emotisync_media::acquire::{MediaAcquirer, MediaSource};
use emotisync_media::{compress, encode, overlay, Canvas};
use image::RgbImage;

/// Seam over the HTTP client so the flow can be driven by fakes in tests.
pub trait RecognitionService {
    async fn check_health(&self) -> HealthStatus;
    async fn submit(
        &self,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResponse, RequestError>;
}

impl RecognitionService for RecognitionClient {
    async fn check_health(&self) -> HealthStatus {
        RecognitionClient::check_health(self).await
    }

    async fn submit(
        &self,
        request: &RecognitionRequest,
    ) -> Result<RecognitionResponse, RequestError> {
        RecognitionClient::submit(self, request).await
    }
}

/// View state owned by the controller.
///
/// Mutated only through the controller's handlers; successor states come
/// from pure functions so the flow is testable without a UI harness.
#[derive(Debug, Clone, PartialEq)]
pub struct PageViewState {
    pub preview_image_path: String,
    pub detection_results: Option<Vec<FaceDetection>>,
    pub emotion_summary: String,
    pub has_result: bool,
    pub face_count: usize,
    pub is_processing: bool,
}

impl PageViewState {
    pub fn initial(preview: impl Into<String>) -> Self {
        Self {
            preview_image_path: preview.into(),
            detection_results: None,
            emotion_summary: String::new(),
            has_result: false,
            face_count: 0,
            is_processing: false,
        }
    }
}

/// Successor state after a successful recognition. The preview is replaced
/// only when the service echoed an annotated image.
fn with_result(
    state: &PageViewState,
    faces: Vec<FaceDetection>,
    summary: String,
    preview: Option<String>,
) -> PageViewState {
    PageViewState {
        preview_image_path: preview.unwrap_or_else(|| state.preview_image_path.clone()),
        face_count: faces.len(),
        detection_results: Some(faces),
        emotion_summary: summary,
        has_result: true,
        is_processing: state.is_processing,
    }
}

pub struct PageController<S, N> {
    service: S,
    notifier: N,
    canvas: Canvas,
    max_upload_bytes: u64,
    state: PageViewState,
}

impl<S: RecognitionService, N: Notifier> PageController<S, N> {
    pub fn new(service: S, notifier: N, canvas: Canvas, max_upload_bytes: u64) -> Self {
        Self {
            service,
            notifier,
            canvas,
            max_upload_bytes,
            state: PageViewState::initial("images/smile.jpg"),
        }
    }

    pub fn state(&self) -> &PageViewState {
        &self.state
    }

    /// Page-load hook: advisory health probe. Both outcomes surface as
    /// notices; neither gates later submissions.
    pub async fn on_load(&mut self) {
        let health = self.service.check_health().await;
        if health.reachable {
            self.notifier.notify(Notice::Toast {
                kind: ToastKind::Success,
                message: "服务器连接正常".to_string(),
            });
        } else {
            self.notifier.notify(Notice::Modal {
                title: "服务器连接失败".to_string(),
                message: format!("无法连接到服务器\n{}", health.detail),
            });
        }
    }

    /// Full pipeline for one user action. Returns the rendered overlay
    /// when recognition produced a result and the source could be drawn.
    pub async fn handle_capture<A: MediaAcquirer>(
        &mut self,
        acquirer: &A,
        kinds: &[MediaKind],
        sources: &[MediaSource],
    ) -> Option<RgbImage> {
        // The processing flag is authoritative: a second trigger while a
        // request is in flight is rejected, never interleaved.
        if self.state.is_processing {
            self.notifier.notify(Notice::Toast {
                kind: ToastKind::Plain,
                message: "正在处理中，请稍候".to_string(),
            });
            return None;
        }

        let asset = match acquirer.acquire(kinds, sources).await {
            Ok(asset) => asset,
            Err(err) => {
                tracing::error!(error = %err, "media acquisition failed");
                let message = if matches!(sources, [MediaSource::Camera]) {
                    "相机启动失败"
                } else {
                    "媒体选择失败"
                };
                self.toast_error(message);
                return None;
            }
        };

        tracing::info!(
            path = %asset.local_path.display(),
            kind = ?asset.kind,
            size_bytes = asset.size_bytes,
            "media acquired"
        );

        // The upload ceiling is pipeline policy, checked here before any
        // compression or encoding work is spent on an oversized file.
        if asset.size_bytes > self.max_upload_bytes {
            self.toast_error("文件大小超过限制 (4MB)");
            return None;
        }

        let asset = match asset.kind {
            MediaKind::Image => {
                match tokio::task::spawn_blocking(move || compress::compress(asset)).await {
                    Ok(compressed) => compressed,
                    Err(err) => {
                        tracing::error!(error = %err, "compression task failed");
                        self.toast_error("文件处理失败");
                        return None;
                    }
                }
            }
            MediaKind::Video => asset,
        };

        let mime = asset.mime_type.clone();
        let payload = match encode::encode(&asset, &mime).await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(error = %err, "encoding failed");
                self.toast_error(match asset.kind {
                    MediaKind::Image => "文件处理失败",
                    MediaKind::Video => "视频处理失败",
                });
                return None;
            }
        };

        let (request, loading_message) = match asset.kind {
            MediaKind::Image => (RecognitionRequest::image(payload), "正在分析表情..."),
            MediaKind::Video => (RecognitionRequest::video(payload), "正在分析视频表情..."),
        };

        self.state.is_processing = true;
        self.notifier.notify(Notice::Toast {
            kind: ToastKind::Loading,
            message: loading_message.to_string(),
        });

        let outcome = self.service.submit(&request).await;

        // Settle path: the loading notice and the processing flag clear
        // whether the request succeeded or failed.
        self.notifier.notify(Notice::HideLoading);
        self.state.is_processing = false;

        match outcome {
            Ok(response) => self.handle_response(response, &asset).await,
            Err(err) => {
                tracing::error!(kind = ?err, "recognition request failed");
                self.notifier.notify(Notice::Modal {
                    title: "表情识别失败".to_string(),
                    message: err.to_string(),
                });
                None
            }
        }
    }

    async fn handle_response(
        &mut self,
        response: RecognitionResponse,
        asset: &MediaAsset,
    ) -> Option<RgbImage> {
        if !response.success {
            let message = response.error.as_deref().unwrap_or("处理失败").to_string();
            self.toast_error(&message);
            return None;
        }

        let faces = response.faces.unwrap_or_default();
        if faces.is_empty() {
            self.notifier.notify(Notice::Toast {
                kind: ToastKind::Plain,
                message: "未检测到人脸，请尝试更清晰的图片".to_string(),
            });
            return None;
        }

        let report = processor::process(&faces);
        self.state = with_result(&self.state, faces.clone(), report.summary, response.image);
        self.notifier.notify(Notice::Toast {
            kind: ToastKind::Success,
            message: format!("检测到{}张人脸", self.state.face_count),
        });

        // Render from the local asset; the echoed preview is a base64
        // body, not a file path. Rendering is best-effort.
        let canvas = self.canvas.clone();
        let path = asset.local_path.clone();
        match tokio::task::spawn_blocking(move || overlay::render(&path, &faces, &canvas)).await {
            Ok(Ok(rendered)) => Some(rendered),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "overlay rendering failed");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "render task failed");
                None
            }
        }
    }

    fn toast_error(&mut self, message: &str) {
        self.notifier.notify(Notice::Toast {
            kind: ToastKind::Error,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emotisync_media::acquire::AcquireError;
    use image::Rgb;
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;
    use std::rc::Rc;

    struct FakeService {
        healthy: bool,
        result: Result<RecognitionResponse, RequestError>,
        calls: Rc<Cell<usize>>,
    }

    impl RecognitionService for FakeService {
        async fn check_health(&self) -> HealthStatus {
            HealthStatus {
                reachable: self.healthy,
                detail: "probe".to_string(),
            }
        }

        async fn submit(
            &self,
            _request: &RecognitionRequest,
        ) -> Result<RecognitionResponse, RequestError> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    struct RecordingNotifier(Rc<RefCell<Vec<Notice>>>);

    impl Notifier for RecordingNotifier {
        fn notify(&mut self, notice: Notice) {
            self.0.borrow_mut().push(notice);
        }
    }

    struct FakeAcquirer(RefCell<Option<Result<MediaAsset, AcquireError>>>);

    impl MediaAcquirer for FakeAcquirer {
        async fn acquire(
            &self,
            _kinds: &[MediaKind],
            _sources: &[MediaSource],
        ) -> Result<MediaAsset, AcquireError> {
            self.0.borrow_mut().take().expect("acquire called twice")
        }
    }

    struct Harness {
        controller: PageController<FakeService, RecordingNotifier>,
        calls: Rc<Cell<usize>>,
        notices: Rc<RefCell<Vec<Notice>>>,
    }

    fn harness(result: Result<RecognitionResponse, RequestError>) -> Harness {
        let calls = Rc::new(Cell::new(0));
        let notices = Rc::new(RefCell::new(Vec::new()));
        let service = FakeService {
            healthy: true,
            result,
            calls: Rc::clone(&calls),
        };
        let controller = PageController::new(
            service,
            RecordingNotifier(Rc::clone(&notices)),
            Canvas::new(300, 300),
            4 * 1024 * 1024,
        );
        Harness {
            controller,
            calls,
            notices,
        }
    }

    fn response(faces: Vec<FaceDetection>) -> RecognitionResponse {
        RecognitionResponse {
            success: true,
            faces: Some(faces),
            image: None,
            error: None,
        }
    }

    fn happy_face() -> FaceDetection {
        FaceDetection {
            bbox: [10.0, 20.0, 110.0, 120.0],
            expression: "Happy".to_string(),
            confidence: 0.9,
        }
    }

    fn png_asset(name: &str) -> MediaAsset {
        let path = std::env::temp_dir().join(format!(
            "emotisync-controller-{}-{name}.png",
            std::process::id()
        ));
        let mut img = image::RgbImage::new(32, 32);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([255, 255, 255]);
        }
        img.save(&path).unwrap();
        let size_bytes = std::fs::metadata(&path).unwrap().len();
        MediaAsset {
            local_path: path,
            kind: MediaKind::Image,
            size_bytes,
            mime_type: "image/png".to_string(),
        }
    }

    fn error_toasts(notices: &[Notice]) -> Vec<String> {
        notices
            .iter()
            .filter_map(|n| match n {
                Notice::Toast {
                    kind: ToastKind::Error,
                    message,
                } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_oversize_asset_rejected_before_submit() {
        let mut h = harness(Ok(response(vec![happy_face()])));
        let oversize = MediaAsset {
            local_path: PathBuf::from("/nonexistent/huge.png"),
            kind: MediaKind::Image,
            size_bytes: 5 * 1024 * 1024,
            mime_type: "image/png".to_string(),
        };
        let acquirer = FakeAcquirer(RefCell::new(Some(Ok(oversize))));
        let before = h.controller.state().clone();

        let rendered = h
            .controller
            .handle_capture(&acquirer, &[MediaKind::Image], &[MediaSource::Album])
            .await;

        assert!(rendered.is_none());
        assert_eq!(h.calls.get(), 0, "oversize input must never reach the client");
        assert_eq!(
            error_toasts(&h.notices.borrow()),
            vec!["文件大小超过限制 (4MB)".to_string()]
        );
        assert_eq!(*h.controller.state(), before);
    }

    #[tokio::test]
    async fn test_busy_controller_rejects_second_trigger() {
        let mut h = harness(Ok(response(vec![happy_face()])));
        h.controller.state.is_processing = true;
        let acquirer = FakeAcquirer(RefCell::new(Some(Ok(png_asset("busy")))));

        let rendered = h
            .controller
            .handle_capture(&acquirer, &[MediaKind::Image], &[MediaSource::Album])
            .await;

        assert!(rendered.is_none());
        assert_eq!(h.calls.get(), 0);
        assert!(h.notices.borrow().iter().any(|n| matches!(
            n,
            Notice::Toast { message, .. } if message == "正在处理中，请稍候"
        )));
    }

    #[tokio::test]
    async fn test_acquisition_failure_from_camera() {
        let mut h = harness(Ok(response(vec![])));
        let acquirer = FakeAcquirer(RefCell::new(Some(Err(AcquireError::PlatformDenied(
            "camera".to_string(),
        )))));

        h.controller
            .handle_capture(&acquirer, &[MediaKind::Image], &[MediaSource::Camera])
            .await;

        assert_eq!(error_toasts(&h.notices.borrow()), vec!["相机启动失败".to_string()]);
        assert_eq!(h.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_logical_failure_surfaces_error_untouched() {
        let mut h = harness(Ok(RecognitionResponse {
            success: false,
            faces: Some(vec![happy_face()]),
            image: None,
            error: Some("bad input".to_string()),
        }));
        let acquirer = FakeAcquirer(RefCell::new(Some(Ok(png_asset("logical")))));

        let rendered = h
            .controller
            .handle_capture(&acquirer, &[MediaKind::Image], &[MediaSource::Album])
            .await;

        assert!(rendered.is_none());
        assert_eq!(error_toasts(&h.notices.borrow()), vec!["bad input".to_string()]);
        let state = h.controller.state();
        assert!(state.detection_results.is_none());
        assert!(!state.has_result);
        assert!(!state.is_processing);
    }

    #[tokio::test]
    async fn test_empty_faces_keeps_previous_result_flag() {
        let mut h = harness(Ok(response(vec![])));
        h.controller.state.has_result = true;
        h.controller.state.emotion_summary = "中性".to_string();
        let acquirer = FakeAcquirer(RefCell::new(Some(Ok(png_asset("noface")))));

        let rendered = h
            .controller
            .handle_capture(&acquirer, &[MediaKind::Image], &[MediaSource::Album])
            .await;

        assert!(rendered.is_none());
        assert!(h.notices.borrow().iter().any(|n| matches!(
            n,
            Notice::Toast { message, .. } if message == "未检测到人脸，请尝试更清晰的图片"
        )));
        let state = h.controller.state();
        assert!(state.has_result, "has_result must be unchanged by a no-face outcome");
        assert_eq!(state.emotion_summary, "中性");
        assert!(!state.is_processing);
    }

    #[tokio::test]
    async fn test_success_updates_state_and_renders() {
        let mut h = harness(Ok(RecognitionResponse {
            success: true,
            faces: Some(vec![happy_face()]),
            image: Some("ZWNobw==".to_string()),
            error: None,
        }));
        let acquirer = FakeAcquirer(RefCell::new(Some(Ok(png_asset("success")))));

        let rendered = h
            .controller
            .handle_capture(&acquirer, &[MediaKind::Image], &[MediaSource::Album])
            .await;

        let state = h.controller.state();
        assert!(state.has_result);
        assert_eq!(state.face_count, 1);
        assert_eq!(state.emotion_summary, "开心");
        assert_eq!(state.preview_image_path, "ZWNobw==");
        assert_eq!(
            state.detection_results.as_deref(),
            Some(&[happy_face()][..])
        );
        assert!(!state.is_processing);

        let overlay = rendered.expect("success path renders the overlay");
        assert_eq!(overlay.dimensions(), (300, 300));

        assert!(h.notices.borrow().iter().any(|n| matches!(
            n,
            Notice::Toast { kind: ToastKind::Success, message } if message == "检测到1张人脸"
        )));
    }

    #[tokio::test]
    async fn test_request_failure_shows_modal_and_settles() {
        let mut h = harness(Err(RequestError::Timeout));
        let acquirer = FakeAcquirer(RefCell::new(Some(Ok(png_asset("timeout")))));

        let rendered = h
            .controller
            .handle_capture(&acquirer, &[MediaKind::Image], &[MediaSource::Album])
            .await;

        assert!(rendered.is_none());
        let notices = h.notices.borrow();
        assert!(notices.iter().any(|n| matches!(
            n,
            Notice::Modal { title, message }
                if title == "表情识别失败" && message == "请求超时，请检查网络连接或稍后重试"
        )));
        // Loading notice cleared on the failure path too.
        assert!(notices.iter().any(|n| matches!(n, Notice::HideLoading)));
        assert!(!h.controller.state().is_processing);
    }

    #[tokio::test]
    async fn test_on_load_reports_health_both_ways() {
        let mut h = harness(Ok(response(vec![])));
        h.controller.on_load().await;
        assert!(h.notices.borrow().iter().any(|n| matches!(
            n,
            Notice::Toast { kind: ToastKind::Success, message } if message == "服务器连接正常"
        )));

        let notices = Rc::new(RefCell::new(Vec::new()));
        let mut down = PageController::new(
            FakeService {
                healthy: false,
                result: Ok(response(vec![])),
                calls: Rc::new(Cell::new(0)),
            },
            RecordingNotifier(Rc::clone(&notices)),
            Canvas::new(300, 300),
            4 * 1024 * 1024,
        );
        down.on_load().await;
        assert!(notices.borrow().iter().any(|n| matches!(
            n,
            Notice::Modal { title, .. } if title == "服务器连接失败"
        )));
    }

    #[test]
    fn test_with_result_keeps_preview_when_no_echo() {
        let state = PageViewState::initial("original.png");
        let next = with_result(&state, vec![happy_face()], "开心".to_string(), None);
        assert_eq!(next.preview_image_path, "original.png");
        assert_eq!(next.face_count, 1);
        assert!(next.has_result);

        let echoed = with_result(
            &state,
            vec![happy_face()],
            "开心".to_string(),
            Some("echo.png".to_string()),
        );
        assert_eq!(echoed.preview_image_path, "echo.png");
    }
}
