//! Generic "stage, confirm, then commit or revert" container.
//!
//! Every field on the settings screen follows the same life cycle: the value
//! shown to the user may run ahead of the committed value, a proposed change
//! waits for confirmation, and only a successful remote apply moves the
//! committed value forward. A failed apply puts the committed value back on
//! screen.

use std::mem;

/// What happens to the displayed value when a confirmation is dismissed
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OnDismiss {
    /// Restore the value displayed before the proposal (toggles, pickers)
    Restore,
    /// Leave the proposed value on screen (text fields)
    Keep,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Phase<T> {
    Idle,
    Pending { previous: T, on_dismiss: OnDismiss },
    Applying,
}

/// A committed value together with the value currently displayed for it
#[derive(Clone, Debug)]
pub struct Staged<T> {
    committed: T,
    displayed: T,
    phase: Phase<T>,
}

impl<T> Staged<T>
where
    T: Clone + PartialEq,
{
    pub fn new(committed: T) -> Self {
        Self {
            displayed: committed.clone(),
            committed,
            phase: Phase::Idle,
        }
    }

    pub fn committed(&self) -> &T {
        &self.committed
    }

    pub fn displayed(&self) -> &T {
        &self.displayed
    }

    /// Replace the displayed value while no confirmation is outstanding.
    pub fn edit(&mut self, value: T) -> bool {
        if !self.is_idle() {
            return false;
        }

        self.displayed = value;
        true
    }

    /// Show the committed value again.
    pub fn revert(&mut self) -> bool {
        if !self.is_idle() {
            return false;
        }

        self.displayed = self.committed.clone();
        true
    }

    /// Display `value` right away and wait for a confirmation.
    pub fn propose(&mut self, value: T, on_dismiss: OnDismiss) -> bool {
        if !self.is_idle() {
            return false;
        }

        let previous = mem::replace(&mut self.displayed, value);
        self.phase = Phase::Pending {
            previous,
            on_dismiss,
        };
        true
    }

    /// Move a baseline that changed because of another field's apply.
    ///
    /// A displayed value that was not being edited follows the new baseline.
    pub fn rebase(&mut self, committed: T) {
        if self.displayed == self.committed {
            self.displayed = committed.clone();
        }

        if let Phase::Pending { previous, .. } = &mut self.phase {
            if *previous == self.committed {
                *previous = committed.clone();
            }
        }

        self.committed = committed;
    }

    fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }
}

/// Type-erased view of a [`Staged`] value, so a screen can drive all of its
/// fields through one code path regardless of their value types.
pub trait StagedControl {
    fn is_dirty(&self) -> bool;
    fn is_pending(&self) -> bool;
    fn is_applying(&self) -> bool;

    /// Pending confirmation accepted, apply about to start.
    fn begin_apply(&mut self) -> bool;

    /// Pending confirmation declined.
    fn dismiss(&mut self) -> bool;

    /// Apply finished. Success commits the displayed value, failure shows the
    /// committed value again.
    fn finish_apply(&mut self, success: bool) -> bool;
}

impl<T> StagedControl for Staged<T>
where
    T: Clone + PartialEq,
{
    fn is_dirty(&self) -> bool {
        self.displayed != self.committed
    }

    fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending { .. })
    }

    fn is_applying(&self) -> bool {
        matches!(self.phase, Phase::Applying)
    }

    fn begin_apply(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }

        self.phase = Phase::Applying;
        true
    }

    fn dismiss(&mut self) -> bool {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Pending {
                previous,
                on_dismiss,
            } => {
                if on_dismiss == OnDismiss::Restore {
                    self.displayed = previous;
                }
                true
            }
            phase => {
                self.phase = phase;
                false
            }
        }
    }

    fn finish_apply(&mut self, success: bool) -> bool {
        if !self.is_applying() {
            return false;
        }

        if success {
            self.committed = self.displayed.clone();
        } else {
            self.displayed = self.committed.clone();
        }
        self.phase = Phase::Idle;
        true
    }
}
