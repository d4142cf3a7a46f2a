//! # Tracker Queue Channel Wrappers
//!
//! Strongly-typed wrappers around the tracker's mpsc queue. The strong sender
//! belongs to handles held outside the tracker; the tracker's own
//! asynchronous work (task lookups, check streams) only holds the weak
//! sender, so dropping every external handle closes the queue and ends the
//! worker.

use tokio::sync::mpsc;

use super::commands::TrackerCommand;

/// Strongly-typed sender for tracker commands
#[derive(Debug, Clone)]
pub struct TrackerCommandSender(pub(crate) mpsc::Sender<TrackerCommand>);

/// Strongly-typed receiver for tracker commands, consumed by exactly one worker
#[derive(Debug)]
pub struct TrackerCommandReceiver(pub(crate) mpsc::Receiver<TrackerCommand>);

/// Weak sender used by continuations re-entering the queue
#[derive(Debug, Clone)]
pub struct WeakTrackerCommandSender(pub(crate) mpsc::WeakSender<TrackerCommand>);

impl TrackerCommandSender {
    /// Send a command through the channel.
    pub async fn send(
        &self,
        command: TrackerCommand,
    ) -> Result<(), mpsc::error::SendError<TrackerCommand>> {
        self.0.send(command).await
    }

    /// Check if the channel is closed.
    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }

    pub fn downgrade(&self) -> WeakTrackerCommandSender {
        WeakTrackerCommandSender(self.0.downgrade())
    }
}

impl WeakTrackerCommandSender {
    /// Upgrade to a strong sender if any external handle is still alive
    pub fn upgrade(&self) -> Option<TrackerCommandSender> {
        self.0.upgrade().map(TrackerCommandSender)
    }
}

impl TrackerCommandReceiver {
    /// Receive the next command from the channel.
    pub async fn recv(&mut self) -> Option<TrackerCommand> {
        self.0.recv().await
    }

    /// Close the receiver, preventing further sends.
    pub fn close(&mut self) {
        self.0.close()
    }
}

/// Factory for creating strongly-typed channel pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelFactory;

impl ChannelFactory {
    /// Create a tracker command channel pair.
    pub fn tracker_command_channel(
        buffer_size: usize,
    ) -> (TrackerCommandSender, TrackerCommandReceiver) {
        let (tx, rx) = mpsc::channel(buffer_size);
        (TrackerCommandSender(tx), TrackerCommandReceiver(rx))
    }
}
