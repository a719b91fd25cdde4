use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::warn;

use super::types::AudioCommand;

/// Central command bus from the control thread to the audio callback
pub struct CommandBus {
    tx: Sender<AudioCommand>,
    rx: Receiver<AudioCommand>,
}

impl CommandBus {
    pub fn new() -> Self {
        let (tx, rx) = bounded(256);
        Self { tx, rx }
    }

    /// Get a sender that can be cloned and shared
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Get a receiver (typically for the audio thread)
    pub fn receiver(&self) -> CommandReceiver {
        CommandReceiver {
            rx: self.rx.clone(),
        }
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable sender for dispatching commands
#[derive(Clone)]
pub struct CommandSender {
    tx: Sender<AudioCommand>,
}

impl CommandSender {
    /// Send a command (non-blocking, drops if buffer full)
    pub fn send(&self, cmd: AudioCommand) -> bool {
        match self.tx.try_send(cmd) {
            Ok(()) => true,
            Err(TrySendError::Full(cmd)) => {
                warn!("Audio command buffer full, dropping {:?}", cmd);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Receiver for consuming commands
#[derive(Clone)]
pub struct CommandReceiver {
    rx: Receiver<AudioCommand>,
}

impl CommandReceiver {
    /// Try to receive a command (non-blocking)
    pub fn try_recv(&self) -> Option<AudioCommand> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_bus_drops_instead_of_blocking() {
        let bus = CommandBus::new();
        let sender = bus.sender();
        for i in 0..256 {
            assert!(sender.send(AudioCommand::CancelFrom(i)));
        }
        assert!(!sender.send(AudioCommand::CancelFrom(999)));

        let rx = bus.receiver();
        assert_eq!(rx.try_recv(), Some(AudioCommand::CancelFrom(0)));
    }
}
