//! Putting a result on the system clipboard.

/// Anything that can receive copied text.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()>;
}

/// The desktop clipboard. The connection is opened on first use, so a
/// session that never copies never touches the display server.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
        let mut clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };
        let result = clipboard.set_text(text.to_string());
        self.inner = Some(clipboard);
        result?;
        tracing::debug!(chars = text.chars().count(), "Copied to clipboard");
        Ok(())
    }
}
