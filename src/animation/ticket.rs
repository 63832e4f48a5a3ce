//! Completion tracking for animation instructions.
//!
//! The engine never awaits anything. Every camera or fade instruction
//! returns an [`AnimationTicket`]; the host polls its status across ticks
//! and resolves or rejects whatever future it wrapped the call in.

use std::collections::VecDeque;

/// Settled outcomes remembered per canvas before the oldest are dropped.
const SETTLED_CAPACITY: usize = 64;

/// Identifier of one animation instruction on one canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationTicket(pub u64);

impl AnimationTicket {
    /// Raw value for the handle boundary.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Observable state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    /// Still running.
    Pending,
    /// Reached its end state.
    Completed,
    /// Superseded by a newer instruction on the same timeline, or cut short
    /// by the canvas being destroyed.
    Interrupted,
    /// Never issued here, or settled so long ago it was forgotten.
    Unknown,
}

impl AnimationStatus {
    /// Boundary code: 0 pending, 1 completed, 2 interrupted, -1 unknown.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Pending => 0,
            Self::Completed => 1,
            Self::Interrupted => 2,
            Self::Unknown => -1,
        }
    }
}

/// Issues tickets and remembers how recent ones settled.
#[derive(Debug, Default)]
pub(crate) struct TicketLog {
    next: u64,
    settled: VecDeque<(AnimationTicket, AnimationStatus)>,
}

impl TicketLog {
    /// Fresh ticket; numbering starts at 1.
    pub(crate) fn issue(&mut self) -> AnimationTicket {
        self.next += 1;
        AnimationTicket(self.next)
    }

    /// Record a final outcome.
    pub(crate) fn settle(&mut self, ticket: AnimationTicket, status: AnimationStatus) {
        if self.settled.len() == SETTLED_CAPACITY {
            let _ = self.settled.pop_front();
        }
        self.settled.push_back((ticket, status));
    }

    /// Issue a ticket that is already complete (zero-duration instructions).
    pub(crate) fn issue_completed(&mut self) -> AnimationTicket {
        let ticket = self.issue();
        self.settle(ticket, AnimationStatus::Completed);
        ticket
    }

    /// Status of a ticket that is not currently live.
    pub(crate) fn lookup(&self, ticket: AnimationTicket) -> AnimationStatus {
        if ticket.0 == 0 || ticket.0 > self.next {
            return AnimationStatus::Unknown;
        }
        self.settled
            .iter()
            .rev()
            .find(|(t, _)| *t == ticket)
            .map_or(AnimationStatus::Unknown, |(_, s)| *s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_are_unique_and_start_at_one() {
        let mut log = TicketLog::default();
        assert_eq!(log.issue(), AnimationTicket(1));
        assert_eq!(log.issue(), AnimationTicket(2));
    }

    #[test]
    fn test_lookup_reports_settled_outcomes() {
        let mut log = TicketLog::default();
        let a = log.issue();
        let b = log.issue_completed();
        log.settle(a, AnimationStatus::Interrupted);
        assert_eq!(log.lookup(a), AnimationStatus::Interrupted);
        assert_eq!(log.lookup(b), AnimationStatus::Completed);
        assert_eq!(log.lookup(AnimationTicket(99)), AnimationStatus::Unknown);
        assert_eq!(log.lookup(AnimationTicket(0)), AnimationStatus::Unknown);
    }

    #[test]
    fn test_old_outcomes_are_forgotten() {
        let mut log = TicketLog::default();
        let first = log.issue_completed();
        for _ in 0..SETTLED_CAPACITY {
            let _ = log.issue_completed();
        }
        assert_eq!(log.lookup(first), AnimationStatus::Unknown);
    }
}
