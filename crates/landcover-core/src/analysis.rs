use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    #[default]
    Loading,
    Images,
    Analyzing,
    Results,
}

impl Step {
    /// Headline and detail line shown while the step is active.
    pub fn status_text(self) -> Option<(&'static str, &'static str)> {
        match self {
            Step::Loading => Some(("Finding satellite images...", "Accessing satellite databases...")),
            Step::Analyzing => Some((
                "Analyzing satellite images with machine learning...",
                "Processing NDVI and change detection...",
            )),
            Step::Images | Step::Results => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimerTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerKind {
    /// Loading → Images.
    Loading,
    /// Analyzing → Results.
    Analyzing,
    /// Step back to Loading after a close.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEvent {
    Open,
    Analyze,
    TimerFired(TimerTicket),
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Schedule { ticket: TimerTicket, after: Duration },
    Cancel(TimerTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogTimings {
    pub loading: Duration,
    pub analyzing: Duration,
    pub reset: Duration,
}

impl Default for DialogTimings {
    fn default() -> Self {
        Self {
            loading: Duration::from_millis(3500),
            analyzing: Duration::from_millis(4000),
            reset: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTimer {
    ticket: TimerTicket,
    kind: TimerKind,
}

/// Step sequence of the analysis dialog, run as a reducer.
///
/// [`AnalysisDialog::handle`] consumes a [`DialogEvent`] and returns the timer
/// work the caller must perform. Every scheduled timer carries a
/// [`TimerTicket`]; a fired ticket that is no longer the pending one is
/// dropped, so a close invalidates in-flight timers even if they were not
/// cancelled in time.
#[derive(Debug)]
pub struct AnalysisDialog {
    open: bool,
    step: Step,
    pending: Option<PendingTimer>,
    next_ticket: u64,
    timings: DialogTimings,
}

impl Default for AnalysisDialog {
    fn default() -> Self {
        Self::new(DialogTimings::default())
    }
}

impl AnalysisDialog {
    pub fn new(timings: DialogTimings) -> Self {
        Self {
            open: false,
            step: Step::Loading,
            pending: None,
            next_ticket: 0,
            timings,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn timings(&self) -> DialogTimings {
        self.timings
    }

    /// Kind of the timer currently awaited, if any.
    pub fn pending_timer(&self) -> Option<(TimerTicket, TimerKind)> {
        self.pending.map(|p| (p.ticket, p.kind))
    }

    pub fn handle(&mut self, event: DialogEvent) -> Vec<TimerCommand> {
        let mut commands = Vec::new();
        match event {
            DialogEvent::Open => {
                if self.open {
                    return commands;
                }
                self.cancel_pending(&mut commands);
                self.open = true;
                self.step = Step::Loading;
                self.schedule(TimerKind::Loading, &mut commands);
                log::debug!("analysis dialog opened");
            }
            DialogEvent::Analyze => {
                if !self.open || self.step != Step::Images {
                    log::debug!("analyze ignored in step {:?}", self.step);
                    return commands;
                }
                self.step = Step::Analyzing;
                self.schedule(TimerKind::Analyzing, &mut commands);
            }
            DialogEvent::TimerFired(ticket) => {
                let Some(pending) = self.pending.filter(|p| p.ticket == ticket) else {
                    log::debug!("stale timer {ticket:?} ignored");
                    return commands;
                };
                self.pending = None;
                match pending.kind {
                    TimerKind::Loading => self.step = Step::Images,
                    TimerKind::Analyzing => self.step = Step::Results,
                    TimerKind::Reset => self.step = Step::Loading,
                }
                log::debug!("dialog advanced to {:?}", self.step);
            }
            DialogEvent::Close => {
                if !self.open {
                    return commands;
                }
                self.cancel_pending(&mut commands);
                self.open = false;
                self.schedule(TimerKind::Reset, &mut commands);
                log::debug!("analysis dialog closed in step {:?}", self.step);
            }
        }
        commands
    }

    fn schedule(&mut self, kind: TimerKind, commands: &mut Vec<TimerCommand>) {
        self.next_ticket += 1;
        let ticket = TimerTicket(self.next_ticket);
        let after = match kind {
            TimerKind::Loading => self.timings.loading,
            TimerKind::Analyzing => self.timings.analyzing,
            TimerKind::Reset => self.timings.reset,
        };
        self.pending = Some(PendingTimer { ticket, kind });
        commands.push(TimerCommand::Schedule { ticket, after });
    }

    fn cancel_pending(&mut self, commands: &mut Vec<TimerCommand>) {
        if let Some(pending) = self.pending.take() {
            commands.push(TimerCommand::Cancel(pending.ticket));
        }
    }
}
