//! Key routing while the suggestion list is open
//!
//! The router claims the configured select, dismiss and navigation keys at
//! [`Priority::High`], so it runs before any same-key binding the host
//! registered for its default behavior. Keys it does not consume fall
//! through to the next binding.

use hashtag_keybinds::{KeyCombo, KeyDisposition, Keybind, KeybindRegistry, Priority, RegistryError};

use crate::config::CompiledKeys;

pub const KEYBIND_CATEGORY: &str = "hashtag";

/// Actions the router can bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterAction {
    Select,
    Dismiss,
    Previous,
    Next,
    Space,
}

impl RouterAction {
    pub fn all() -> [RouterAction; 5] {
        [
            RouterAction::Select,
            RouterAction::Dismiss,
            RouterAction::Previous,
            RouterAction::Next,
            RouterAction::Space,
        ]
    }

    pub fn action_id(self) -> &'static str {
        match self {
            RouterAction::Select => "hashtag.select",
            RouterAction::Dismiss => "hashtag.dismiss",
            RouterAction::Previous => "hashtag.previous",
            RouterAction::Next => "hashtag.next",
            RouterAction::Space => "hashtag.space",
        }
    }

    pub fn from_action_id(action_id: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|action| action.action_id() == action_id)
    }

    pub fn description(self) -> &'static str {
        match self {
            RouterAction::Select => "Insert the highlighted hashtag",
            RouterAction::Dismiss => "Close the hashtag list",
            RouterAction::Previous => "Highlight the previous hashtag",
            RouterAction::Next => "Highlight the next hashtag",
            RouterAction::Space => "End the hashtag query",
        }
    }
}

/// What the session does for a routed key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Commit,
    Close,
    Previous,
    Next,
    /// Re-run detection as if the key's text were already inserted
    Revalidate,
    /// Leave the key to the host
    PassThrough,
}

impl Route {
    /// Whether the host's own handling of the key should be suppressed
    pub fn disposition(self) -> KeyDisposition {
        match self {
            Route::Commit | Route::Close | Route::Previous | Route::Next => {
                KeyDisposition::Handled
            }
            Route::Revalidate | Route::PassThrough => KeyDisposition::Unhandled,
        }
    }
}

/// Maps key combinations to router actions
#[derive(Debug, Clone)]
pub struct KeyBindingRouter {
    bindings: Vec<(KeyCombo, RouterAction)>,
}

impl KeyBindingRouter {
    pub fn new(keys: &CompiledKeys) -> Self {
        let groups = [
            (RouterAction::Select, &keys.select),
            (RouterAction::Dismiss, &keys.dismiss),
            (RouterAction::Previous, &keys.previous),
            (RouterAction::Next, &keys.next),
            (RouterAction::Space, &keys.space),
        ];

        let bindings = groups
            .into_iter()
            .flat_map(|(action, combos)| combos.iter().map(move |combo| (combo.clone(), action)))
            .collect();

        Self { bindings }
    }

    /// First action bound to a key combination
    pub fn action_for(&self, key: &KeyCombo) -> Option<RouterAction> {
        self.bindings
            .iter()
            .find(|(combo, _)| combo == key)
            .map(|(_, action)| *action)
    }

    /// Keybind records for every configured key, at high priority
    pub fn keybinds(&self) -> Vec<Keybind> {
        self.bindings
            .iter()
            .map(|(combo, action)| {
                Keybind::new(
                    action.action_id(),
                    combo.to_string(),
                    KEYBIND_CATEGORY,
                    action.description(),
                )
                .with_priority(Priority::High)
            })
            .collect()
    }

    /// Register the router's bindings ahead of the host's defaults
    pub fn register(&self, registry: &mut KeybindRegistry) -> Result<(), RegistryError> {
        registry.register_all(self.keybinds())
    }

    /// Decide how an action is handled given whether the list is open
    pub fn route(&self, action: RouterAction, is_open: bool) -> Route {
        match action {
            RouterAction::Space => Route::Revalidate,
            _ if !is_open => Route::PassThrough,
            RouterAction::Select => Route::Commit,
            RouterAction::Dismiss => Route::Close,
            RouterAction::Previous => Route::Previous,
            RouterAction::Next => Route::Next,
        }
    }
}
