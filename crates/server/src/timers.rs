use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use landcover_core::analysis::{TimerCommand, TimerTicket};
use landcover_core::shell::MapShell;
use tokio::task::JoinHandle;

pub type SharedShell = Arc<tokio::sync::Mutex<MapShell>>;

/// Runs dialog timers as tokio tasks.
///
/// A fired timer locks the shell, feeds the ticket back and applies the
/// commands that come out. Call [`TimerRunner::apply`] while still holding
/// the shell lock so commands are executed in the order they were issued.
#[derive(Clone, Default)]
pub struct TimerRunner {
    tasks: Arc<Mutex<HashMap<TimerTicket, JoinHandle<()>>>>,
}

impl TimerRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&self, shell: &SharedShell, commands: Vec<TimerCommand>) {
        for command in commands {
            match command {
                TimerCommand::Schedule { ticket, after } => {
                    tracing::debug!("timer {ticket:?} scheduled in {after:?}");
                    let runner = self.clone();
                    let task_shell = shell.clone();
                    let handle = tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let mut guard = task_shell.lock().await;
                        runner.forget(ticket);
                        let next = guard.timer_fired(ticket);
                        tracing::debug!("timer {ticket:?} fired, dialog step {:?}", guard.dialog().step());
                        runner.apply(&task_shell, next);
                    });
                    self.track(ticket, handle);
                }
                TimerCommand::Cancel(ticket) => {
                    if let Some(handle) = self.forget(ticket) {
                        tracing::debug!("timer {ticket:?} cancelled");
                        handle.abort();
                    }
                }
            }
        }
        tracing::trace!("{} dialog timers pending", self.pending());
    }

    /// Number of timers that have not fired yet.
    pub fn pending(&self) -> usize {
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.values().filter(|h| !h.is_finished()).count()
    }

    fn track(&self, ticket: TimerTicket, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|_, h| !h.is_finished());
        tasks.insert(ticket, handle);
    }

    fn forget(&self, ticket: TimerTicket) -> Option<JoinHandle<()>> {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&ticket)
    }
}
