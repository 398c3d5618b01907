use std::sync::Mutex;

/// Moves the vendor to another page once authoring is over.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: &str);
}

/// Remembers the last destination so the HTTP layer can hand it back to the
/// browser as a redirect.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    last: Mutex<Option<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Option<String> {
        self.last.lock().ok().and_then(|mut guard| guard.take())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: &str) {
        tracing::info!(destination, "navigating away from test builder");
        if let Ok(mut guard) = self.last.lock() {
            *guard = Some(destination.to_string());
        }
    }
}
