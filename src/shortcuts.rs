//! Keyboard shortcut registry and contextual dispatch.
//!
//! A key press is matched by its combo string (`Alt+Ctrl+Shift+<key>`, modifiers in that fixed
//! order) and then filtered by where it happened: on the page, on the media player, or inside a
//! stamp's text editor. Editor-context actions act on the stamp whose editor the press came from,
//! which the host reports via [`Target::Editor`].

use crate::store::Boundary;

/// Where a key press landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Page,
    Player,
    /// The text editor of the stamp at `index` in the selected voice.
    Editor { index: usize },
}

impl Target {
    pub fn context(&self) -> Context {
        match self {
            Self::Page => Context::Page,
            Self::Player => Context::Player,
            Self::Editor { .. } => Context::Editor,
        }
    }

    /// Stamp index carried by an editor target.
    pub fn stamp_index(&self) -> Option<usize> {
        match *self {
            Self::Editor { index } => Some(index),
            _ => None,
        }
    }
}

/// Interaction context a shortcut may be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Page,
    Player,
    Editor,
}

/// A physical key press as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    /// Key name as the host reports it (`"Enter"`, `"ArrowUp"`, `" "`, `"d"`, ...).
    pub key: String,
    pub target: Target,
}

impl KeyPress {
    /// An unmodified press of `key` on `target`.
    pub fn new(key: impl Into<String>, target: Target) -> Self {
        Self {
            alt: false,
            ctrl: false,
            shift: false,
            key: key.into(),
            target,
        }
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Combo string used to look up a shortcut.
    ///
    /// Single letters are upper-cased so `Ctrl+d` and `Ctrl+D` are the same combo regardless of
    /// caps lock.
    pub fn combo(&self) -> String {
        let mut combo = String::new();
        if self.alt {
            combo.push_str("Alt+");
        }
        if self.ctrl {
            combo.push_str("Ctrl+");
        }
        if self.shift {
            combo.push_str("Shift+");
        }
        match self.key.as_str() {
            " " => combo.push_str("Space"),
            key if key.len() == 1 && key.chars().all(|c| c.is_ascii_alphabetic()) => {
                combo.push_str(&key.to_ascii_uppercase())
            }
            key => combo.push_str(key),
        }
        combo
    }
}

/// Editor command a shortcut triggers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    TogglePlayback,
    Open,
    Close,
    SpeedUp,
    SlowDown,
    FocusAbove,
    FocusBelow,
    Loop,
    Stop,
    Nudge { boundary: Boundary, delta_ms: i32 },
    Delete,
}

#[derive(Debug, Clone)]
pub struct Shortcut {
    pub combo: &'static str,
    pub title: &'static str,
    pub contexts: &'static [Context],
    pub action: Action,
}

impl Shortcut {
    pub fn allows(&self, context: Context) -> bool {
        self.contexts.contains(&context)
    }
}

/// A matched shortcut, ready to be performed on `target`.
///
/// Returning one of these means the host should suppress the key's default behavior and stop
/// its propagation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Invocation {
    pub action: Action,
    pub target: Target,
}

const EVERYWHERE: &[Context] = &[Context::Page, Context::Player, Context::Editor];
const OUTSIDE_EDITOR: &[Context] = &[Context::Page, Context::Player];
const EDITOR: &[Context] = &[Context::Editor];

const fn nudge(boundary: Boundary, delta_ms: i32) -> Action {
    Action::Nudge { boundary, delta_ms }
}

#[derive(Debug, Clone)]
pub struct ShortcutRegistry {
    shortcuts: Vec<Shortcut>,
}

impl ShortcutRegistry {
    pub fn new(shortcuts: Vec<Shortcut>) -> Self {
        Self { shortcuts }
    }

    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    /// Match a key press against the registry.
    ///
    /// `None` means the press is not ours and should propagate untouched: either no shortcut
    /// has this combo, or the one that does is not allowed in the press's context.
    pub fn dispatch(&self, press: &KeyPress) -> Option<Invocation> {
        let combo = press.combo();
        let shortcut = self.shortcuts.iter().find(|s| s.combo == combo)?;
        if !shortcut.allows(press.target.context()) {
            return None;
        }
        Some(Invocation {
            action: shortcut.action,
            target: press.target,
        })
    }

    pub fn find(&self, action: Action) -> Option<&Shortcut> {
        self.shortcuts.iter().find(|s| s.action == action)
    }

    /// Tooltip text for an action: `"<title> (<combo>)"`.
    pub fn describe(&self, action: Action) -> Option<String> {
        self.find(action)
            .map(|s| format!("{} ({})", s.title, s.combo))
    }

    /// Every binding, combo first with the title indented below it.
    pub fn help_text(&self) -> String {
        self.shortcuts
            .iter()
            .map(|s| format!("{}\n    {}\n", s.combo, s.title))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        use Boundary::{End, Start};

        let shortcut = |combo: &'static str,
                        title: &'static str,
                        contexts: &'static [Context],
                        action: Action| Shortcut {
            combo,
            title,
            contexts,
            action,
        };

        Self::new(vec![
            shortcut("Space", "Toggle playback", OUTSIDE_EDITOR, Action::TogglePlayback),
            shortcut("Enter", "Open a new stamp", EVERYWHERE, Action::Open),
            shortcut(
                "Escape",
                "Close longest open stamp prior to current time",
                EVERYWHERE,
                Action::Close,
            ),
            shortcut("Ctrl+ArrowUp", "Speed up the playback", EVERYWHERE, Action::SpeedUp),
            shortcut("Ctrl+ArrowDown", "Slow down the playback", EVERYWHERE, Action::SlowDown),
            shortcut("ArrowUp", "Go to the above text editor", EDITOR, Action::FocusAbove),
            shortcut("ArrowDown", "Go to the below text editor", EDITOR, Action::FocusBelow),
            shortcut("Shift+Enter", "Loop preview the current stamp", EDITOR, Action::Loop),
            shortcut("Shift+Escape", "Stop loop preview if playing", EDITOR, Action::Stop),
            shortcut(
                "Ctrl+ArrowLeft",
                "Remove 100 ms off the start time",
                EDITOR,
                nudge(Start, -100),
            ),
            shortcut("Shift+ArrowLeft", "Remove 10 ms off the start time", EDITOR, nudge(Start, -10)),
            shortcut("Shift+ArrowRight", "Add 10 ms to the start time", EDITOR, nudge(Start, 10)),
            shortcut("Ctrl+ArrowRight", "Add 100 ms to the start time", EDITOR, nudge(Start, 100)),
            shortcut(
                "Alt+Ctrl+ArrowLeft",
                "Remove 100 ms off the end time",
                EDITOR,
                nudge(End, -100),
            ),
            shortcut("Alt+ArrowLeft", "Remove 10 ms off the end time", EDITOR, nudge(End, -10)),
            shortcut("Alt+ArrowRight", "Add 10 ms to the end time", EDITOR, nudge(End, 10)),
            shortcut("Alt+Ctrl+ArrowRight", "Add 100 ms to the end time", EDITOR, nudge(End, 100)),
            shortcut("Ctrl+D", "Delete the current stamp", EDITOR, Action::Delete),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combo_orders_modifiers_and_names_space() {
        let press = KeyPress::new("ArrowLeft", Target::Page).shift().ctrl().alt();
        assert_eq!(press.combo(), "Alt+Ctrl+Shift+ArrowLeft");
        assert_eq!(KeyPress::new(" ", Target::Page).combo(), "Space");
        assert_eq!(KeyPress::new("d", Target::Page).ctrl().combo(), "Ctrl+D");
    }

    #[test]
    fn enter_opens_in_editor_and_page() {
        let registry = ShortcutRegistry::default();

        let editor = Target::Editor { index: 3 };
        let hit = registry.dispatch(&KeyPress::new("Enter", editor));
        assert_eq!(
            hit,
            Some(Invocation {
                action: Action::Open,
                target: editor
            })
        );

        let hit = registry.dispatch(&KeyPress::new("Enter", Target::Page));
        assert_eq!(hit.map(|i| i.action), Some(Action::Open));
    }

    #[test]
    fn editor_only_shortcuts_are_ignored_elsewhere() {
        let registry = ShortcutRegistry::default();
        let delete = KeyPress::new("d", Target::Page).ctrl();
        assert_eq!(registry.dispatch(&delete), None);

        let delete = KeyPress::new("d", Target::Player).ctrl();
        assert_eq!(registry.dispatch(&delete), None);

        let delete = KeyPress::new("d", Target::Editor { index: 0 }).ctrl();
        assert_eq!(registry.dispatch(&delete).map(|i| i.action), Some(Action::Delete));
    }

    #[test]
    fn space_does_not_fire_inside_editor() {
        let registry = ShortcutRegistry::default();
        assert_eq!(
            registry.dispatch(&KeyPress::new(" ", Target::Editor { index: 0 })),
            None
        );
        assert_eq!(
            registry
                .dispatch(&KeyPress::new(" ", Target::Player))
                .map(|i| i.action),
            Some(Action::TogglePlayback)
        );
    }

    #[test]
    fn unknown_combo_propagates() {
        let registry = ShortcutRegistry::default();
        assert_eq!(registry.dispatch(&KeyPress::new("q", Target::Page)), None);
        // Modifiers are part of the match.
        assert_eq!(
            registry.dispatch(&KeyPress::new("Enter", Target::Page).ctrl()),
            None
        );
    }

    #[test]
    fn end_nudges_move_the_end() {
        let registry = ShortcutRegistry::default();
        let editor = Target::Editor { index: 0 };
        let hit = registry.dispatch(&KeyPress::new("ArrowRight", editor).alt().ctrl());
        assert_eq!(
            hit.map(|i| i.action),
            Some(Action::Nudge {
                boundary: Boundary::End,
                delta_ms: 100
            })
        );
    }

    #[test]
    fn describe_formats_title_and_combo() {
        let registry = ShortcutRegistry::default();
        assert_eq!(
            registry.describe(Action::Loop).as_deref(),
            Some("Loop preview the current stamp (Shift+Enter)")
        );
    }

    #[test]
    fn help_text_lists_every_binding() {
        let registry = ShortcutRegistry::default();
        let help = registry.help_text();
        assert!(help.starts_with("Space\n    Toggle playback\n\nEnter\n"));
        assert!(help.ends_with('\n') && !help.ends_with("\n\n"));
        assert_eq!(help.matches("\n\n").count(), registry.shortcuts().len() - 1);
        for shortcut in registry.shortcuts() {
            assert!(help.contains(shortcut.combo));
        }
    }
}
