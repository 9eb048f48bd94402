use super::payment::PaymentId;
use serde::{Deserialize, Serialize};

/// Capabilities requested from the wallet during authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Payments,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Payments => "payments",
        }
    }
}

/// Identity returned by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub username: String,
}

/// A payment from an earlier session that the wallet reports as unfinished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncompletePayment {
    pub identifier: PaymentId,
    pub memo: String,
    pub txid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Loading,
    Ready,
    Failed,
}

/// Transient per-process session. Nothing here survives a reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub authenticated_user: Option<User>,
    pub sdk_ready: bool,
    pub phase: SessionPhase,
    /// Incomplete payments acknowledged during authentication; never resumed.
    pub acknowledged_incomplete: Vec<IncompletePayment>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&mut self, user: User) {
        self.authenticated_user = Some(user);
        self.phase = SessionPhase::Ready;
    }

    /// Ends loading without a user.
    pub fn fail(&mut self) {
        self.authenticated_user = None;
        self.phase = SessionPhase::Failed;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated_user.is_some()
    }
}
