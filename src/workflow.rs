//! Status transition policy for intervention tickets.
//!
//! Transitions are fixed at compile time: each status exposes the set of
//! statuses it may move to, a direction classification against the linear
//! workflow order, and an optional confirmation prompt for sensitive
//! moves (reopening validated/completed work, reactivating cancelled
//! work). All lookups are pure.

use crate::types::Status;

/// Workflow order used to classify a transition as forward or backward.
/// `Cancelled` sits outside the line; moves into or out of it are lateral.
const STATUS_ORDER: &[Status] = &[
    Status::Pending,
    Status::Assigned,
    Status::InProgress,
    Status::OnHold,
    Status::Completed,
    Status::Validated,
];

/// Statuses reachable from `status` in a single step.
pub fn allowed_transitions(status: Status) -> &'static [Status] {
    match status {
        Status::Pending => &[Status::Assigned, Status::Cancelled],
        Status::Assigned => &[Status::Pending, Status::InProgress, Status::Cancelled],
        Status::InProgress => &[
            Status::Assigned,
            Status::OnHold,
            Status::Completed,
            Status::Cancelled,
        ],
        Status::OnHold => &[Status::InProgress, Status::Assigned, Status::Cancelled],
        Status::Completed => &[Status::InProgress, Status::Validated, Status::Cancelled],
        Status::Validated => &[Status::Completed],
        Status::Cancelled => &[Status::Pending, Status::Assigned],
    }
}

pub fn is_transition_allowed(from: Status, to: Status) -> bool {
    allowed_transitions(from).contains(&to)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Lateral,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
            Direction::Lateral => write!(f, "lateral"),
        }
    }
}

/// Classify a transition against the workflow order.
pub fn transition_direction(from: Status, to: Status) -> Direction {
    if to == Status::Cancelled || from == Status::Cancelled {
        return Direction::Lateral;
    }

    let from_index = STATUS_ORDER.iter().position(|s| *s == from);
    let to_index = STATUS_ORDER.iter().position(|s| *s == to);

    match (from_index, to_index) {
        (Some(f), Some(t)) if t > f => Direction::Forward,
        (Some(f), Some(t)) if t < f => Direction::Backward,
        _ => Direction::Lateral,
    }
}

/// Confirmation prompt for policy-sensitive transitions. `None` means the
/// transition applies without asking.
pub fn confirmation_message(from: Status, to: Status) -> Option<&'static str> {
    match (from, to) {
        (Status::Validated, Status::Completed) => {
            Some("Are you sure you want to reopen this validated intervention?")
        }
        (Status::Completed, Status::InProgress) => {
            Some("Are you sure you want to reopen this completed intervention?")
        }
        (Status::Cancelled, Status::Pending) | (Status::Cancelled, Status::Assigned) => {
            Some("Reactivate this cancelled intervention?")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[Status] = &[
        Status::Pending,
        Status::Assigned,
        Status::InProgress,
        Status::OnHold,
        Status::Completed,
        Status::Validated,
        Status::Cancelled,
    ];

    #[test]
    fn test_every_status_has_an_exit() {
        for s in ALL {
            assert!(
                !allowed_transitions(*s).is_empty(),
                "{s} has no outbound transitions"
            );
        }
    }

    #[test]
    fn test_lookups_are_stable() {
        for s in ALL {
            assert_eq!(allowed_transitions(*s), allowed_transitions(*s));
        }
    }

    #[test]
    fn test_allowed_transitions_match_policy() {
        assert!(is_transition_allowed(Status::Pending, Status::Assigned));
        assert!(is_transition_allowed(Status::Pending, Status::Cancelled));
        assert!(!is_transition_allowed(Status::Pending, Status::Completed));
        assert!(!is_transition_allowed(Status::Pending, Status::InProgress));

        assert!(is_transition_allowed(Status::InProgress, Status::OnHold));
        assert!(is_transition_allowed(Status::InProgress, Status::Completed));
        assert!(!is_transition_allowed(Status::InProgress, Status::Validated));

        assert!(is_transition_allowed(Status::Validated, Status::Completed));
        assert!(!is_transition_allowed(Status::Validated, Status::Cancelled));

        // Cancelled tickets can be reactivated.
        assert!(is_transition_allowed(Status::Cancelled, Status::Pending));
        assert!(is_transition_allowed(Status::Cancelled, Status::Assigned));
        assert!(!is_transition_allowed(Status::Cancelled, Status::InProgress));
    }

    #[test]
    fn test_no_self_transitions() {
        for s in ALL {
            assert!(!is_transition_allowed(*s, *s), "{s} transitions to itself");
        }
    }

    #[test]
    fn test_cancelled_is_always_lateral() {
        for s in ALL {
            assert_eq!(transition_direction(*s, Status::Cancelled), Direction::Lateral);
            assert_eq!(transition_direction(Status::Cancelled, *s), Direction::Lateral);
        }
    }

    #[test]
    fn test_direction_follows_workflow_order() {
        assert_eq!(
            transition_direction(Status::Pending, Status::Assigned),
            Direction::Forward
        );
        assert_eq!(
            transition_direction(Status::Assigned, Status::Completed),
            Direction::Forward
        );
        assert_eq!(
            transition_direction(Status::Completed, Status::InProgress),
            Direction::Backward
        );
        assert_eq!(
            transition_direction(Status::Validated, Status::Completed),
            Direction::Backward
        );
        assert_eq!(
            transition_direction(Status::Pending, Status::Pending),
            Direction::Lateral
        );
    }

    #[test]
    fn test_confirmation_pairs() {
        assert!(confirmation_message(Status::Validated, Status::Completed).is_some());
        assert!(confirmation_message(Status::Completed, Status::InProgress).is_some());
        assert!(confirmation_message(Status::Cancelled, Status::Pending).is_some());
        assert!(confirmation_message(Status::Cancelled, Status::Assigned).is_some());

        // Everything else applies silently.
        for from in ALL {
            for to in ALL {
                let sensitive = matches!(
                    (from, to),
                    (Status::Validated, Status::Completed)
                        | (Status::Completed, Status::InProgress)
                        | (Status::Cancelled, Status::Pending)
                        | (Status::Cancelled, Status::Assigned)
                );
                assert_eq!(confirmation_message(*from, *to).is_some(), sensitive);
            }
        }
    }
}
