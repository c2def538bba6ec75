use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::traits::{GatewayError, HostedSession, HostedSessionRequest, PaymentGateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeGatewayMode {
    Succeed,
    Fail,
    Hang(Duration),
}

/// An in-memory payment gateway that records every session request it receives.
#[derive(Debug, Clone)]
pub struct FakeGateway {
    mode: FakeGatewayMode,
    requests: Arc<Mutex<Vec<HostedSessionRequest>>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new(FakeGatewayMode::Succeed)
    }
}

impl FakeGateway {
    pub fn new(mode: FakeGatewayMode) -> Self {
        Self { mode, requests: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn failing() -> Self {
        Self::new(FakeGatewayMode::Fail)
    }

    pub fn requests(&self) -> Vec<HostedSessionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    pub fn session_url(order_id: &str) -> String {
        format!("https://pay.example.com/c/pay/cs_test_{order_id}")
    }
}

impl PaymentGateway for FakeGateway {
    async fn create_hosted_session(&self, request: HostedSessionRequest) -> Result<HostedSession, GatewayError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match self.mode {
            FakeGatewayMode::Succeed => Ok(HostedSession {
                session_id: format!("cs_test_{}", request.order_id),
                redirect_url: Self::session_url(request.order_id.as_str()),
            }),
            FakeGatewayMode::Fail => Err(GatewayError::Unavailable("connection refused".into())),
            FakeGatewayMode::Hang(delay) => {
                tokio::time::sleep(delay).await;
                Err(GatewayError::Unavailable("gave up".into()))
            },
        }
    }
}
