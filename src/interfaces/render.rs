//! Text rendering of the controller state, one line per on-screen element.

use crate::application::controller::UiController;
use crate::config::InferenceMode;
use crate::domain::session::SessionPhase;

pub const TITLE: &str = "Pi Network App";
pub const LOADING: &str = "Loading...";
pub const AUTH_FAILED: &str = "Authentication failed. Try reloading the page.";

pub fn render(controller: &UiController) -> Vec<String> {
    let mut lines = vec![TITLE.to_string()];
    let session = controller.session();
    let amount = controller.config().payment.amount;

    match (session.phase, &session.authenticated_user) {
        (SessionPhase::Loading, _) => lines.push(LOADING.to_string()),
        (SessionPhase::Ready, Some(user)) => {
            lines.push(format!("Welcome, {}!", user.username));
            match controller.mode() {
                InferenceMode::AfterPayment => lines.push(format!("[Pay {amount} Pi to Analyze]")),
                _ => lines.push(format!("[Pay {amount} Pi]")),
            }
        }
        _ => lines.push(AUTH_FAILED.to_string()),
    }

    if controller.mode() != InferenceMode::Disabled {
        match controller.image() {
            Some(image) => lines.push(format!("Image: {}", image.describe())),
            None => lines.push("No image selected".to_string()),
        }
        if controller.mode() == InferenceMode::OnDemand {
            lines.push("[Analyze]".to_string());
        }
        lines.extend(controller.detections().lines());
    }

    if let Some(payment) = controller.payment() {
        match &payment.id {
            Some(id) => lines.push(format!("Payment {id}: {:?}", payment.state)),
            None => lines.push(format!("Payment: {:?}", payment.state)),
        }
    }

    lines
}
