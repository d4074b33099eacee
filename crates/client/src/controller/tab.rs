//! Top-level navigation tabs.

use quorum_core::User;

/// A page section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    /// Statistics and the most recent polls.
    #[default]
    Home,
    /// Browsable, votable poll list.
    Polls,
    /// Read-only results for every poll.
    Results,
    /// Polls the signed-in user voted on.
    MyVotes,
    /// Signed-in user's profile.
    Profile,
    /// Poll administration. Owner only.
    Admin,
}

impl Tab {
    pub const ALL: [Self; 6] = [
        Self::Home,
        Self::Polls,
        Self::Results,
        Self::MyVotes,
        Self::Profile,
        Self::Admin,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Polls => "Polls",
            Self::Results => "Results",
            Self::MyVotes => "My votes",
            Self::Profile => "Profile",
            Self::Admin => "Admin",
        }
    }

    /// Whether `user` may see this tab.
    #[must_use]
    pub const fn is_visible_to(self, user: Option<&User>) -> bool {
        match self {
            Self::Home | Self::Polls | Self::Results => true,
            Self::MyVotes | Self::Profile => user.is_some(),
            Self::Admin => match user {
                Some(u) => u.is_owner(),
                None => false,
            },
        }
    }

    /// Tabs visible to `user`, in display order.
    #[must_use]
    pub fn visible(user: Option<&User>) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|t| t.is_visible_to(user))
            .collect()
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
