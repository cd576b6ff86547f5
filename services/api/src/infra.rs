use chrono::NaiveDate;
use course_adherence::workflows::dispatch::{
    validate_recipient, DispatchError, DispatchReceipt, Dispatcher, OutgoingMessage,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Keeps composed messages in memory instead of sending them.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryDispatcher {
    messages: Arc<Mutex<Vec<OutgoingMessage>>>,
}

impl Dispatcher for InMemoryDispatcher {
    fn dispatch(&self, message: &OutgoingMessage) -> Result<DispatchReceipt, DispatchError> {
        validate_recipient(&message.recipient)?;
        let mut guard = self.messages.lock().expect("dispatcher mutex poisoned");
        let message_id = format!("memory-{}", guard.len());
        guard.push(message.clone());
        Ok(DispatchReceipt {
            message_id,
            location: None,
        })
    }
}

impl InMemoryDispatcher {
    pub(crate) fn messages(&self) -> Vec<OutgoingMessage> {
        self.messages
            .lock()
            .expect("dispatcher mutex poisoned")
            .clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
