use mctrigger_core::MessageSink;

/// Sends every message to two sinks.
#[derive(Debug, Default)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: MessageSink, B: MessageSink> MessageSink for Tee<A, B> {
    fn info(&mut self, message: &str) {
        self.0.info(message);
        self.1.info(message);
    }

    fn warning(&mut self, message: &str) {
        self.0.warning(message);
        self.1.warning(message);
    }
}
