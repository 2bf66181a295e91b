use tracing_subscriber::EnvFilter;

/// Log sink handed to collaborators that want to report progress.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
    fn debug_log(&self, message: &str);
}

/// Forwards to `tracing`, tagged with the component that owns the logger.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: &'static str,
}

impl TracingLogger {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::info!(component = self.component, "{}", message);
    }

    fn debug_log(&self, message: &str) {
        tracing::debug!(component = self.component, "{}", message);
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the `--debug` flag.
pub fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout is reserved for credential output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
pub mod test_support {
    use super::Logger;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingLogger {
        pub messages: Mutex<Vec<String>>,
    }

    impl RecordingLogger {
        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Logger for RecordingLogger {
        fn log(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }

        fn debug_log(&self, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push(format!("[DEBUG] {}", message));
        }
    }
}
