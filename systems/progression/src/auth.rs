use std::fmt;

use star_chart_core::Command;

/// Decides whether a command may run.
///
/// Only administrative commands are checked. Who holds the capability is an
/// embedding concern; the controller never handles credentials.
pub trait Authorizer: fmt::Debug {
    /// Reports whether the command is permitted.
    fn permits(&self, command: &Command) -> bool;
}

/// Permits every command.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn permits(&self, _command: &Command) -> bool {
        true
    }
}

/// Refuses every administrative command.
#[derive(Clone, Copy, Debug, Default)]
pub struct Deny;

impl Authorizer for Deny {
    fn permits(&self, command: &Command) -> bool {
        !command.is_administrative()
    }
}

/// Capability granted (or withheld) by the embedding adapter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdminCapability {
    granted: bool,
}

impl AdminCapability {
    /// Capability that permits administrative commands.
    #[must_use]
    pub const fn granted() -> Self {
        Self { granted: true }
    }

    /// Capability that refuses administrative commands.
    #[must_use]
    pub const fn withheld() -> Self {
        Self { granted: false }
    }
}

impl Authorizer for AdminCapability {
    fn permits(&self, command: &Command) -> bool {
        self.granted || !command.is_administrative()
    }
}
