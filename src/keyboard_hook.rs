use crate::overlay::event::KeyEvent;
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError, TrySendError};
use std::sync::Arc;

pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Producer half of the hook queue. Cheap to clone; safe to use from the hook thread.
#[derive(Debug, Clone)]
pub struct KeyEventSender {
    tx: SyncSender<KeyEvent>,
    dropped: Arc<AtomicU64>,
}

impl KeyEventSender {
    /// Never blocks. Returns `false` when the event was discarded because the
    /// queue is full or the receiver is gone.
    pub fn send(&self, event: KeyEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Consumer half, drained on the thread that owns the grid.
#[derive(Debug)]
pub struct KeyEventReceiver {
    rx: Receiver<KeyEvent>,
    dropped: Arc<AtomicU64>,
    reported_dropped: u64,
}

impl KeyEventReceiver {
    pub fn drain(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let dropped = self.dropped.load(Ordering::Relaxed);
        if dropped > self.reported_dropped {
            tracing::warn!(
                dropped = dropped - self.reported_dropped,
                "key event queue overflowed; events were discarded"
            );
            self.reported_dropped = dropped;
        }
        events
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Bounded queue marshalling hook callbacks onto the render thread.
pub fn key_event_queue(capacity: usize) -> (KeyEventSender, KeyEventReceiver) {
    let (tx, rx) = sync_channel(capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));
    (
        KeyEventSender {
            tx,
            dropped: Arc::clone(&dropped),
        },
        KeyEventReceiver {
            rx,
            dropped,
            reported_dropped: 0,
        },
    )
}

/// Global keyboard hook forwarding every press and release into the queue.
///
/// Only Windows has a backend; elsewhere the hook is inert and events can be
/// fed through a [`KeyEventSender`] directly.
#[derive(Debug)]
pub struct KeyboardHook {
    active: bool,
    #[cfg_attr(not(windows), allow(dead_code))]
    sender: KeyEventSender,
    #[cfg(windows)]
    backend: platform::KeyboardHookBackend,
}

impl KeyboardHook {
    pub fn new(sender: KeyEventSender) -> Self {
        Self {
            active: false,
            sender,
            #[cfg(windows)]
            backend: platform::KeyboardHookBackend::default(),
        }
    }

    pub fn activate(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }

        #[cfg(windows)]
        self.backend.install(self.sender.clone())?;

        self.active = true;
        tracing::debug!("keyboard hook active");
        Ok(())
    }

    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }

        #[cfg(windows)]
        self.backend.uninstall();

        self.active = false;
        tracing::debug!("keyboard hook inactive");
    }

    pub fn is_active(&self) -> bool {
        #[cfg(windows)]
        {
            self.active && self.backend.is_installed()
        }
        #[cfg(not(windows))]
        {
            self.active
        }
    }
}

impl Drop for KeyboardHook {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(windows)]
mod platform {
    use super::KeyEventSender;
    use crate::keys;
    use crate::overlay::event::{Edge, KeyEvent, KeyId};
    use anyhow::{anyhow, Result};
    use rdev::{listen, EventType, Key};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    /// `rdev::listen` cannot be stopped once running, so the listener thread
    /// lives for the process and `forwarding` gates what reaches the queue.
    #[derive(Debug, Default)]
    pub struct KeyboardHookBackend {
        forwarding: Option<Arc<AtomicBool>>,
    }

    impl KeyboardHookBackend {
        pub fn install(&mut self, sender: KeyEventSender) -> Result<()> {
            if let Some(forwarding) = &self.forwarding {
                forwarding.store(true, Ordering::Release);
                return Ok(());
            }

            let forwarding = Arc::new(AtomicBool::new(true));
            let thread_flag = Arc::clone(&forwarding);
            thread::Builder::new()
                .name("key-overlay-hook".to_string())
                .spawn(move || loop {
                    let flag = Arc::clone(&thread_flag);
                    let sender = sender.clone();
                    let result = listen(move |event| {
                        if !flag.load(Ordering::Acquire) {
                            return;
                        }
                        let (key, edge) = match event.event_type {
                            EventType::KeyPress(key) => (key, Edge::Press),
                            EventType::KeyRelease(key) => (key, Edge::Release),
                            _ => return,
                        };
                        let Some(key_id) = key_id_from_rdev(key) else {
                            tracing::trace!(?key, "ignoring key without an id");
                            return;
                        };
                        sender.send(KeyEvent {
                            key: key_id,
                            edge,
                            timestamp: Instant::now(),
                        });
                    });

                    match result {
                        Ok(()) => tracing::warn!("keyboard listener exited unexpectedly, restarting shortly"),
                        Err(err) => tracing::warn!("keyboard listener failed: {:?}, retrying shortly", err),
                    }
                    thread::sleep(Duration::from_millis(500));
                })
                .map_err(|err| anyhow!("failed to spawn keyboard hook thread: {err}"))?;

            self.forwarding = Some(forwarding);
            Ok(())
        }

        pub fn uninstall(&mut self) {
            if let Some(forwarding) = &self.forwarding {
                forwarding.store(false, Ordering::Release);
            }
        }

        pub fn is_installed(&self) -> bool {
            self.forwarding
                .as_ref()
                .is_some_and(|forwarding| forwarding.load(Ordering::Acquire))
        }
    }

    fn key_id_from_rdev(key: Key) -> Option<KeyId> {
        let id = match key {
            Key::Escape => keys::ESCAPE,
            Key::F1 => keys::function(1)?,
            Key::F2 => keys::function(2)?,
            Key::F3 => keys::function(3)?,
            Key::F4 => keys::function(4)?,
            Key::F5 => keys::function(5)?,
            Key::F6 => keys::function(6)?,
            Key::F7 => keys::function(7)?,
            Key::F8 => keys::function(8)?,
            Key::F9 => keys::function(9)?,
            Key::F10 => keys::function(10)?,
            Key::F11 => keys::function(11)?,
            Key::F12 => keys::function(12)?,
            Key::BackQuote => keys::BACKQUOTE,
            Key::Num1 => keys::digit(1)?,
            Key::Num2 => keys::digit(2)?,
            Key::Num3 => keys::digit(3)?,
            Key::Num4 => keys::digit(4)?,
            Key::Num5 => keys::digit(5)?,
            Key::Num6 => keys::digit(6)?,
            Key::Num7 => keys::digit(7)?,
            Key::Num8 => keys::digit(8)?,
            Key::Num9 => keys::digit(9)?,
            Key::Num0 => keys::digit(0)?,
            Key::Minus => keys::MINUS,
            Key::Equal => keys::EQUAL,
            Key::KeyQ => keys::letter('Q')?,
            Key::KeyW => keys::letter('W')?,
            Key::KeyE => keys::letter('E')?,
            Key::KeyR => keys::letter('R')?,
            Key::KeyT => keys::letter('T')?,
            Key::KeyY => keys::letter('Y')?,
            Key::KeyU => keys::letter('U')?,
            Key::KeyI => keys::letter('I')?,
            Key::KeyO => keys::letter('O')?,
            Key::KeyP => keys::letter('P')?,
            Key::LeftBracket => keys::LEFT_BRACKET,
            Key::RightBracket => keys::RIGHT_BRACKET,
            Key::BackSlash => keys::BACKSLASH,
            Key::KeyA => keys::letter('A')?,
            Key::KeyS => keys::letter('S')?,
            Key::KeyD => keys::letter('D')?,
            Key::KeyF => keys::letter('F')?,
            Key::KeyG => keys::letter('G')?,
            Key::KeyH => keys::letter('H')?,
            Key::KeyJ => keys::letter('J')?,
            Key::KeyK => keys::letter('K')?,
            Key::KeyL => keys::letter('L')?,
            Key::SemiColon => keys::SEMICOLON,
            Key::Quote => keys::QUOTE,
            Key::ShiftLeft => keys::SHIFT_LEFT,
            Key::ShiftRight => keys::SHIFT_RIGHT,
            Key::KeyZ => keys::letter('Z')?,
            Key::KeyX => keys::letter('X')?,
            Key::KeyC => keys::letter('C')?,
            Key::KeyV => keys::letter('V')?,
            Key::KeyB => keys::letter('B')?,
            Key::KeyN => keys::letter('N')?,
            Key::KeyM => keys::letter('M')?,
            Key::Comma => keys::COMMA,
            Key::Dot => keys::DOT,
            Key::Slash => keys::SLASH,
            Key::ControlLeft => keys::CONTROL_LEFT,
            Key::ControlRight => keys::CONTROL_RIGHT,
            Key::Alt => keys::ALT_LEFT,
            Key::AltGr => keys::ALT_RIGHT,
            Key::Space => keys::SPACE,
            Key::Tab => keys::TAB,
            Key::CapsLock => keys::CAPS_LOCK,
            Key::Return => keys::RETURN,
            Key::Backspace => keys::BACKSPACE,
            Key::ScrollLock => keys::SCROLL_LOCK,
            Key::Insert => keys::INSERT,
            Key::Home => keys::HOME,
            Key::PageUp => keys::PAGE_UP,
            Key::Delete => keys::DELETE,
            Key::End => keys::END,
            Key::PageDown => keys::PAGE_DOWN,
            Key::LeftArrow => keys::LEFT,
            Key::UpArrow => keys::UP,
            Key::RightArrow => keys::RIGHT,
            Key::DownArrow => keys::DOWN,
            Key::Unknown(code) => KeyId(code),
            _ => return None,
        };
        Some(id)
    }
}
