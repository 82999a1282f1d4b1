use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::kernel::bridge::SurfaceEvent;

/// Cloneable handle the surface runtime uses from any thread.
#[derive(Clone)]
pub struct SurfaceEventSender {
    tx: Sender<SurfaceEvent>,
}

/// Drained on the control thread only.
pub struct SurfaceEventReceiver {
    rx: Receiver<SurfaceEvent>,
}

pub fn surface_bus() -> (SurfaceEventSender, SurfaceEventReceiver) {
    let (tx, rx) = mpsc::channel();
    (SurfaceEventSender { tx }, SurfaceEventReceiver { rx })
}

impl SurfaceEventSender {
    pub fn send(&self, event: SurfaceEvent) -> Result<(), mpsc::SendError<SurfaceEvent>> {
        self.tx.send(event)
    }

    /// Decodes a raw surface message and forwards it. Returns false if it was dropped.
    pub fn send_json(&self, raw: &str) -> bool {
        match SurfaceEvent::from_json(raw) {
            Some(event) => self.send(event).is_ok(),
            None => false,
        }
    }
}

impl SurfaceEventReceiver {
    pub fn try_recv(&mut self) -> Result<SurfaceEvent, TryRecvError> {
        self.rx.try_recv()
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/services/bus.rs"]
mod tests;
