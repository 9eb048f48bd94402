use crate::config::{AppConfig, InferenceMode};
use crate::domain::detection::{DetectionResult, RawDetection};
use crate::domain::input::ImageInput;
use crate::domain::payment::{Payment, PaymentEvent, PaymentSpec, PaymentState};
use crate::domain::ports::{
    ImageProducer, ModelLoaderBox, NotifierBox, PaymentServerBox, SdkLoaderBox, WalletSdkBox,
};
use crate::domain::session::{Session, User};
use crate::error::{AppError, Result};
use tokio_util::sync::CancellationToken;

pub const SIGN_IN_REQUIRED: &str = "Please sign in before paying.";
pub const IMAGE_REQUIRED: &str = "Please upload or capture an image first.";

/// Lifecycle of the wallet SDK handle. A failed load stays failed until `reload`.
enum SdkState {
    NotLoaded,
    Ready(WalletSdkBox),
    Failed(String),
}

/// Drives the whole app: SDK bootstrap, authentication, image selection,
/// analysis and the payment handshake.
///
/// Every operation takes `&mut self`, so session, image and payment state are
/// only ever touched by one in-flight operation.
pub struct UiController {
    config: AppConfig,
    loader: SdkLoaderBox,
    sdk: SdkState,
    server: PaymentServerBox,
    models: ModelLoaderBox,
    notifier: NotifierBox,
    session: Session,
    image: Option<ImageInput>,
    detections: DetectionResult,
    payment: Option<Payment>,
    cancel: CancellationToken,
}

impl UiController {
    /// Creates a controller with nothing loaded yet.
    ///
    /// # Arguments
    ///
    /// * `loader` - Fetches the wallet SDK on `start`.
    /// * `server` - Receives approval and completion requests for payments.
    /// * `models` - Loads the detection model for each analysis.
    /// * `notifier` - Shows alerts to the user.
    pub fn new(
        config: AppConfig,
        loader: SdkLoaderBox,
        server: PaymentServerBox,
        models: ModelLoaderBox,
        notifier: NotifierBox,
    ) -> Self {
        Self {
            config,
            loader,
            sdk: SdkState::NotLoaded,
            server,
            models,
            notifier,
            session: Session::new(),
            image: None,
            detections: DetectionResult::default(),
            payment: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn mode(&self) -> InferenceMode {
        self.config.inference_mode
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn image(&self) -> Option<&ImageInput> {
        self.image.as_ref()
    }

    pub fn detections(&self) -> &DetectionResult {
        &self.detections
    }

    pub fn payment(&self) -> Option<&Payment> {
        self.payment.as_ref()
    }

    /// Token handed to the wallet and the model with every call. The bundled
    /// adapters ignore it; cancelling has no effect on calls already issued.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Loads the SDK and authenticates.
    pub async fn start(&mut self) -> Result<User> {
        self.bootstrap().await?;
        self.authenticate().await
    }

    /// Loads and initializes the wallet SDK once. Later calls report the first outcome.
    pub async fn bootstrap(&mut self) -> Result<()> {
        match &self.sdk {
            SdkState::Ready(_) => return Ok(()),
            SdkState::Failed(reason) => return Err(AppError::SdkLoadFailure(reason.clone())),
            SdkState::NotLoaded => {}
        }

        let url = self.config.sdk.script_url.clone();
        log::info!("Loading wallet SDK from {url}");
        match self.load_sdk(&url).await {
            Ok(sdk) => {
                log::info!(
                    "Wallet SDK initialized (version {}, sandbox {})",
                    self.config.sdk.version,
                    self.config.sdk.sandbox
                );
                self.sdk = SdkState::Ready(sdk);
                self.session.sdk_ready = true;
                Ok(())
            }
            Err(e) => {
                let reason = match e {
                    AppError::SdkLoadFailure(reason) => reason,
                    other => other.to_string(),
                };
                log::error!("Pi SDK failed to load: {reason}");
                self.sdk = SdkState::Failed(reason.clone());
                self.session.fail();
                Err(AppError::SdkLoadFailure(reason))
            }
        }
    }

    async fn load_sdk(&self, url: &str) -> Result<WalletSdkBox> {
        let sdk = self.loader.load(url).await?;
        sdk.init(&self.config.sdk.init_params()).await?;
        Ok(sdk)
    }

    /// Runs the authentication handshake. Each call is a full new handshake.
    pub async fn authenticate(&mut self) -> Result<User> {
        let SdkState::Ready(sdk) = &self.sdk else {
            log::warn!("Authentication requested before the wallet SDK loaded");
            return Err(AppError::SdkLoadFailure("wallet SDK is not loaded".to_string()));
        };

        match sdk.authenticate(&self.config.scopes).await {
            Ok(outcome) => {
                if let Some(incomplete) = outcome.incomplete_payment {
                    log::info!("Incomplete payment found: {incomplete:?}");
                    self.session.acknowledged_incomplete.push(incomplete);
                }
                log::info!("Authenticated as {}", outcome.user.username);
                self.session.sign_in(outcome.user.clone());
                Ok(outcome.user)
            }
            Err(e) => {
                let reason = match e {
                    AppError::AuthenticationFailure(reason) => reason,
                    other => other.to_string(),
                };
                log::error!("Authentication failed: {reason}");
                self.session.fail();
                Err(AppError::AuthenticationFailure(reason))
            }
        }
    }

    /// Replaces the current image with one from `producer`.
    ///
    /// On failure the previous image and its detections are kept.
    pub async fn acquire_image(&mut self, producer: &dyn ImageProducer) -> Result<()> {
        match producer.produce().await {
            Ok(input) => {
                self.set_image(input);
                Ok(())
            }
            Err(e) => {
                log::error!("Could not acquire image: {e}");
                self.notifier.alert(&format!("Could not load image: {e}"));
                Err(e)
            }
        }
    }

    /// Shows `input` and drops the detections of the previous image.
    pub fn set_image(&mut self, input: ImageInput) {
        log::info!("Displaying {}", input.describe());
        self.detections = DetectionResult::default();
        self.image = Some(input);
    }

    /// Runs detection on the current image when the user asks for it.
    pub async fn analyze(&mut self) -> Result<&DetectionResult> {
        match self.config.inference_mode {
            InferenceMode::OnDemand => {}
            mode => {
                log::warn!("Analysis requested in {mode:?} mode");
                return Err(AppError::InferenceUnavailable(mode));
            }
        }
        self.run_inference().await?;
        Ok(&self.detections)
    }

    async fn run_inference(&mut self) -> Result<()> {
        let Some(image) = self.image.as_ref() else {
            log::warn!("Analysis skipped: no image selected");
            self.notifier.alert(IMAGE_REQUIRED);
            return Err(AppError::InferenceSkipped);
        };

        log::info!("Analyzing {}", image.describe());
        match self.detect(image).await {
            Ok(raw) => {
                self.detections = raw.into_iter().collect();
                log::info!("Detected {} object(s)", self.detections.len());
                Ok(())
            }
            Err(e) => {
                log::error!("Object detection failed: {e}");
                self.notifier.alert("Image analysis failed.");
                Err(e)
            }
        }
    }

    async fn detect(&self, image: &ImageInput) -> Result<Vec<RawDetection>> {
        let model = self.models.load().await?;
        model.detect(image, self.cancel.clone()).await
    }

    /// Pays the configured default amount.
    pub async fn pay(&mut self) -> Result<PaymentState> {
        let spec = self.config.payment.clone();
        self.pay_with(spec).await
    }

    /// Creates a payment and follows its callbacks until a terminal state.
    ///
    /// Returns `Completed` on success; cancellation and errors come back as
    /// `PaymentCancelled` and `PaymentError`.
    pub async fn pay_with(&mut self, spec: PaymentSpec) -> Result<PaymentState> {
        if !self.session.is_authenticated() {
            log::warn!("Payment rejected: user is not authenticated");
            self.notifier.alert(SIGN_IN_REQUIRED);
            return Err(AppError::NotAuthenticated);
        }
        let SdkState::Ready(sdk) = &self.sdk else {
            return Err(AppError::SdkLoadFailure("wallet SDK is not loaded".to_string()));
        };
        if let Some(active) = &self.payment
            && !active.state.is_terminal()
        {
            log::warn!("Payment rejected: {:?} is still {:?}", active.id, active.state);
            return Err(AppError::PaymentInProgress);
        }

        log::info!("Creating payment of {} Pi ({})", spec.amount, spec.memo);
        self.payment = Some(Payment::new(spec.clone()));
        let mut events = match sdk.create_payment(spec, self.cancel.clone()).await {
            Ok(events) => events,
            Err(e) => {
                log::error!("Payment error: {e}");
                if let Some(payment) = self.payment.as_mut() {
                    payment.fail(e.to_string());
                }
                return self.finish_payment().await;
            }
        };

        while let Some(event) = events.recv().await {
            self.handle_payment_event(event).await;
            if self.payment.as_ref().is_some_and(|p| p.state.is_terminal()) {
                break;
            }
        }

        if let Some(payment) = self.payment.as_mut()
            && !payment.state.is_terminal()
        {
            log::error!(
                "Payment error: callbacks stopped while {:?} ({:?})",
                payment.state,
                payment.id
            );
            payment.fail("payment callbacks ended before a terminal state");
        }

        self.finish_payment().await
    }

    async fn handle_payment_event(&mut self, event: PaymentEvent) {
        let Some(payment) = self.payment.as_mut() else {
            return;
        };
        if let Err(e) = payment.apply(&event) {
            log::error!("Payment error: rejected callback: {e}");
            payment.fail(e.to_string());
            return;
        }

        match event {
            PaymentEvent::ReadyForServerApproval(id) => {
                log::info!("Payment ready for approval: {id}");
                if let Err(e) = self.server.approve(&id).await {
                    log::error!("Payment error: server approval failed for {id}: {e}");
                    payment.fail(e.to_string());
                }
            }
            PaymentEvent::ReadyForServerCompletion(id, txid) => {
                log::info!("Payment ready for completion: {id} {txid}");
                let completed = match self.server.complete(&id, &txid).await {
                    Ok(()) => payment.complete(),
                    Err(e) => Err(e),
                };
                match completed {
                    Ok(()) => log::info!("Payment completed: {id} {txid}"),
                    Err(e) => {
                        log::error!("Payment error: server completion failed for {id}: {e}");
                        payment.fail(e.to_string());
                    }
                }
            }
            PaymentEvent::Cancelled(id) => {
                log::warn!("Payment canceled: {id}");
            }
            PaymentEvent::Failed { error, payment: id } => {
                log::error!("Payment error: {error} (payment {id:?})");
            }
        }
    }

    /// Reports the terminal state and runs any analysis gated on completion.
    async fn finish_payment(&mut self) -> Result<PaymentState> {
        let Some(payment) = self.payment.as_ref() else {
            return Err(AppError::PaymentError {
                payment_id: None,
                message: "no active payment".to_string(),
            });
        };

        let state = payment.state;
        match state {
            PaymentState::Completed => {
                if self.config.inference_mode == InferenceMode::AfterPayment {
                    // A failed analysis does not undo the completed payment.
                    if let Err(e) = self.run_inference().await {
                        log::warn!("Analysis after payment did not produce results: {e}");
                    }
                }
                Ok(PaymentState::Completed)
            }
            PaymentState::Cancelled => {
                self.notifier.alert("Payment was cancelled.");
                Err(AppError::PaymentCancelled(
                    payment.id.clone().unwrap_or_default(),
                ))
            }
            state => {
                let message = payment
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("payment stopped in {state:?}"));
                let payment_id = payment.id.clone();
                self.notifier.alert(&format!("Payment failed: {message}"));
                Err(AppError::PaymentError {
                    payment_id,
                    message,
                })
            }
        }
    }

    /// Drops all transient state, like reloading the page.
    pub fn reload(&mut self) {
        log::info!("Reloading: clearing session, image and payment");
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.sdk = SdkState::NotLoaded;
        self.session = Session::new();
        self.image = None;
        self.detections = DetectionResult::default();
        self.payment = None;
    }
}
