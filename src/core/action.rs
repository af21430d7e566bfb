//! Actions a command resolves to

use crate::state::TokenKey;

/// What the app should do after a command ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action needed
    None,

    /// Switch screens
    Navigate(NavigateTarget),

    /// Show notification in status bar
    Notify(String, NotifyLevel),

    /// Open the help overlay
    Help,

    /// Request quit
    Quit,
}

/// Navigation targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigateTarget {
    Wallet,
    Watchlist,
    /// Details screen for one token
    Details(TokenKey),
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}
