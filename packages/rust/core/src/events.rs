//! Page lifecycle events and pointer input.

use tokio::sync::broadcast;
use tracing::trace;
use url::Url;

/// Capacity of the lifecycle broadcast channel.
const EVENT_CAPACITY: usize = 64;

/// Broadcast to interested components when the page changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// A full document load finished and the page was hydrated.
    Loaded { url: Url },
    /// A soft navigation swapped the content region and re-hydrated it.
    ContentUpdated { url: Url },
}

impl PageEvent {
    pub fn url(&self) -> &Url {
        match self {
            Self::Loaded { url } | Self::ContentUpdated { url } => url,
        }
    }
}

/// Fan-out of [`PageEvent`]s. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PageEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }
}

impl EventBus {
    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: PageEvent) {
        // No subscribers is fine.
        if self.sender.send(event).is_err() {
            trace!("page event dropped, no subscribers");
        }
    }
}

// ---------------------------------------------------------------------------
// Pointer input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Primary,
    Auxiliary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.meta || self.ctrl || self.shift || self.alt
    }
}

/// The button and modifier keys of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pointer {
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl Pointer {
    /// A plain primary-button click.
    pub fn primary() -> Self {
        Self::default()
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// Whether the browser would open the link elsewhere instead.
    pub fn wants_new_context(&self) -> bool {
        self.button != MouseButton::Primary || self.modifiers.any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let url = Url::parse("https://docs.example.com/guide").unwrap();

        bus.emit(PageEvent::ContentUpdated { url: url.clone() });

        let event = rx.recv().await.unwrap();
        assert_eq!(event, PageEvent::ContentUpdated { url: url.clone() });
        assert_eq!(event.url(), &url);
    }

    #[test]
    fn emit_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.emit(PageEvent::Loaded {
            url: Url::parse("https://docs.example.com/").unwrap(),
        });
    }

    #[test]
    fn modified_or_secondary_clicks_want_new_context() {
        assert!(!Pointer::primary().wants_new_context());
        let ctrl = Modifiers {
            ctrl: true,
            ..Default::default()
        };
        assert!(Pointer::primary().with_modifiers(ctrl).wants_new_context());
        assert!(
            Pointer::primary()
                .with_button(MouseButton::Auxiliary)
                .wants_new_context()
        );
    }
}
