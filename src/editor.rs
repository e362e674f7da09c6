//! The editor session: one explicit state object that owns the timeline, the playback clock and
//! the snippet controller, and exposes every user command.
//!
//! Each command returns an immutable [`Snapshot`] and hands the same snapshot to every
//! subscriber, so a presentation layer only ever renders snapshots and never reaches into the
//! editor's state.
//!
//! Typical host loop:
//! - Construct once with a clock (the media element) and a session store.
//! - Forward file selections to `open_media` and key presses to `handle_key`.
//! - Call `tick` once per animation frame.

use std::io::Write;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::Result;
use crate::export;
use crate::media::{MediaFile, MediaKind, MediaSelection, Prompt, select_media};
use crate::opts::Opts;
use crate::output_type::OutputType;
use crate::persist::{SessionStore, load_voices, save_voices};
use crate::pivot::{covering_stamps, pivot_index, progress};
use crate::shortcuts::{Action, Invocation, KeyPress, ShortcutRegistry};
use crate::snippet::{SnippetController, SnippetState, TickOutcome};
use crate::stamp::Stamp;
use crate::store::{self, Boundary, ChronologyValidator, StampValidator, ValidationWarning};
use crate::timecode::describe_range;
use crate::timeline::Timeline;

const REPLACE_CONFIRMATION: &str = "Do you really want to abandon the existing collected timestamps?";
const CLOSE_CONFIRMATION: &str = "Do you really want to close the session with unsaved timestamps?";

/// A closed stamp that currently spans the playback position.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveStamp {
    pub index: usize,
    /// The stamp's text, or its time range when it has none.
    pub label: String,
    /// Fraction of the stamp already played, in `[0, 1]`.
    pub progress: Option<f64>,
}

/// What the snippet controller is doing, resolved to current positions.
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetView {
    pub voice: usize,
    pub index: usize,
    pub looping: bool,
    pub description: String,
}

/// Immutable view of the editor after a command or tick.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub timeline: Arc<Timeline>,
    pub media_kind: Option<MediaKind>,
    pub selected_voice: usize,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub playback_rate: f64,
    pub paused: bool,
    /// Pivot stamp of the selected voice.
    pub pivot: Option<usize>,
    /// Stamps of the selected voice covering the current time.
    pub covering: Vec<ActiveStamp>,
    pub snippet: Option<SnippetView>,
    /// Stamp editor the host should move keyboard focus to, if any.
    pub focus: Option<usize>,
    /// Findings of the stamp validator for the selected voice.
    pub warnings: Vec<ValidationWarning>,
}

impl Snapshot {
    pub fn stamps(&self) -> &[Stamp] {
        self.timeline.stamps(self.selected_voice)
    }
}

type Subscriber = Box<dyn FnMut(&Snapshot)>;

pub struct Editor<C: Clock, S: SessionStore> {
    clock: C,
    store: S,
    opts: Opts,
    timeline: Arc<Timeline>,
    media: Option<MediaSelection>,
    selected_voice: usize,
    snippet: SnippetController,
    shortcuts: ShortcutRegistry,
    validator: Box<dyn StampValidator>,
    warnings: Vec<ValidationWarning>,
    subscribers: Vec<Subscriber>,
    dirty: bool,
}

impl<C: Clock, S: SessionStore> Editor<C, S> {
    pub fn new(clock: C, store: S, opts: Opts) -> Self {
        let snippet = SnippetController::new(opts.preview_expiry);
        Self {
            clock,
            store,
            opts,
            timeline: Arc::new(Timeline::new("")),
            media: None,
            selected_voice: 0,
            snippet,
            shortcuts: ShortcutRegistry::default(),
            validator: Box::new(ChronologyValidator),
            warnings: Vec::new(),
            subscribers: Vec::new(),
            dirty: false,
        }
    }

    /// Replace the default chronology validator.
    pub fn with_validator(mut self, validator: impl StampValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Replace the default key bindings.
    pub fn with_shortcuts(mut self, shortcuts: ShortcutRegistry) -> Self {
        self.shortcuts = shortcuts;
        self
    }

    /// Register a callback that receives every published snapshot.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&Snapshot) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    pub fn timeline(&self) -> &Arc<Timeline> {
        &self.timeline
    }

    pub fn media(&self) -> Option<&MediaSelection> {
        self.media.as_ref()
    }

    pub fn shortcuts(&self) -> &ShortcutRegistry {
        &self.shortcuts
    }

    pub fn snippet_state(&self) -> SnippetState {
        self.snippet.state()
    }

    pub fn selected_voice(&self) -> usize {
        self.selected_voice
    }

    /// Whether there are edits the store has not seen yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn stamps(&self) -> &[Stamp] {
        self.timeline.stamps(self.selected_voice)
    }

    // Media

    /// Load a file picked by the user.
    ///
    /// Invalid selections are alerted through `prompt` and returned as errors. Replacing a
    /// session that has stamps needs the user's confirmation; declining returns `Ok(None)` and
    /// changes nothing. Stamps stored for a file of the same name are loaded.
    pub fn open_media<P: Prompt + ?Sized>(
        &mut self,
        files: &[MediaFile],
        prompt: &mut P,
    ) -> Result<Option<Snapshot>> {
        let selection = match select_media(files) {
            Ok(Some(selection)) => selection,
            Ok(None) => return Ok(None),
            Err(err) => {
                prompt.alert(&err.to_string());
                return Err(err);
            }
        };

        if !self.timeline.is_empty() && !prompt.confirm(REPLACE_CONFIRMATION) {
            debug!(media = %selection.name, "media replacement declined");
            return Ok(None);
        }

        let voices = load_voices(&self.store, &selection.name)?;
        let restored = voices.is_some();
        let timeline =
            Timeline::with_voices(selection.name.clone(), voices.unwrap_or_default())?;

        info!(
            media = %selection.name,
            kind = %selection.kind,
            restored,
            stamps = timeline.stamp_count(),
            "media opened"
        );

        self.timeline = Arc::new(timeline);
        self.media = Some(selection);
        self.selected_voice = 0;
        self.snippet.reset();
        self.dirty = false;
        self.revalidate();

        let focus = pivot_index(self.stamps(), self.clock.current_time());
        Ok(Some(self.publish(focus)))
    }

    /// Close the current session.
    ///
    /// Unsaved stamps need the user's confirmation; declining returns `false` and keeps the
    /// session.
    pub fn close_media<P: Prompt + ?Sized>(&mut self, prompt: &mut P) -> bool {
        if self.dirty && !self.timeline.is_empty() && !prompt.confirm(CLOSE_CONFIRMATION) {
            return false;
        }
        self.clock.pause();
        self.timeline = Arc::new(Timeline::new(""));
        self.media = None;
        self.selected_voice = 0;
        self.snippet.reset();
        self.warnings.clear();
        self.dirty = false;
        true
    }

    // Voices

    /// Add an empty voice and select it.
    pub fn add_voice(&mut self, name: impl Into<String>) -> Result<Snapshot> {
        let index = Arc::make_mut(&mut self.timeline).add_voice(name)?;
        self.selected_voice = index;
        self.dirty = true;
        self.revalidate();
        let saved = self.autosave();
        let snapshot = self.publish(None);
        saved.map(|()| snapshot)
    }

    pub fn select_voice(&mut self, index: usize) -> Snapshot {
        if index < self.timeline.voices().len() {
            self.selected_voice = index;
            self.revalidate();
        } else {
            debug!(index, "selecting a missing voice");
        }
        let focus = pivot_index(self.stamps(), self.clock.current_time());
        self.publish(focus)
    }

    // Stamps

    /// Start a new stamp at the current playback position.
    pub fn open_stamp(&mut self) -> Result<Snapshot> {
        let (stamps, index) = store::open_stamp(self.stamps(), self.clock.current_time());
        self.commit_and_publish(stamps, Some(index))
    }

    /// End the pivot stamp at the current playback position.
    pub fn close_stamp(&mut self) -> Result<Snapshot> {
        let (stamps, index) = store::close_stamp(self.stamps(), self.clock.current_time());
        if index.is_none() {
            return Ok(self.publish(None));
        }
        self.commit_and_publish(stamps, index)
    }

    /// Shift a boundary of the stamp at `index` and replay it.
    pub fn move_boundary(
        &mut self,
        index: usize,
        boundary: Boundary,
        delta_seconds: f64,
    ) -> Result<Snapshot> {
        if index >= self.stamps().len() {
            debug!(index, "boundary move on a missing stamp");
            return Ok(self.publish(None));
        }

        let stamps = store::move_boundary(self.stamps(), index, boundary, delta_seconds);
        let saved = self.commit(stamps);

        // Replay the adjusted stamp so the change can be heard right away.
        let stamp = self.stamps()[index].clone();
        self.snippet
            .retarget(&mut self.clock, self.selected_voice, &stamp);

        let snapshot = self.publish(Some(index));
        saved.map(|()| snapshot)
    }

    /// Shift a boundary by whole milliseconds.
    pub fn nudge(&mut self, index: usize, boundary: Boundary, delta_ms: i32) -> Result<Snapshot> {
        self.move_boundary(index, boundary, f64::from(delta_ms) / 1000.0)
    }

    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> Result<Snapshot> {
        if index >= self.stamps().len() {
            debug!(index, "text edit on a missing stamp");
            return Ok(self.publish(None));
        }
        let stamps = store::set_text(self.stamps(), index, text);
        self.commit_and_publish(stamps, Some(index))
    }

    pub fn delete_stamp(&mut self, index: usize) -> Result<Snapshot> {
        if index >= self.stamps().len() {
            debug!(index, "delete on a missing stamp");
            return Ok(self.publish(None));
        }
        let stamps = store::delete_stamp(self.stamps(), index);
        self.commit_and_publish(stamps, None)
    }

    // Playback

    /// Preview the stamp at `index` once, as when its editor is clicked.
    pub fn activate(&mut self, index: usize) -> Snapshot {
        let Some(stamp) = self.stamps().get(index).cloned() else {
            debug!(index, "preview of a missing stamp");
            return self.publish(None);
        };
        self.snippet
            .preview(&mut self.clock, self.selected_voice, &stamp);
        self.publish(Some(index))
    }

    /// Loop the stamp at `index` until stopped.
    pub fn loop_stamp(&mut self, index: usize) -> Snapshot {
        let Some(stamp) = self.stamps().get(index).cloned() else {
            debug!(index, "loop of a missing stamp");
            return self.publish(None);
        };
        self.snippet
            .loop_stamp(&mut self.clock, self.selected_voice, &stamp);
        self.publish(Some(index))
    }

    /// Stop any snippet and rewind to the beginning of the media.
    pub fn stop(&mut self) -> Snapshot {
        self.snippet.stop(&mut self.clock);
        self.publish(None)
    }

    pub fn toggle_playback(&mut self) -> Snapshot {
        if self.clock.paused() {
            self.clock.play();
        } else {
            self.clock.pause();
        }
        self.publish(None)
    }

    pub fn set_playback_rate(&mut self, rate: f64) -> Snapshot {
        let rate = self.opts.clamp_playback_rate(rate);
        self.clock.set_playback_rate(rate);
        self.publish(None)
    }

    /// Change the playback rate by `steps` multiples of the configured step.
    pub fn change_playback_rate(&mut self, steps: i32) -> Snapshot {
        let rate = self.clock.playback_rate() + f64::from(steps) * self.opts.playback_rate_step;
        self.set_playback_rate(rate)
    }

    /// Move to the stamp above `index` and preview it.
    pub fn focus_above(&mut self, index: usize) -> Snapshot {
        self.activate(index.saturating_sub(1))
    }

    /// Move to the stamp below `index` and preview it.
    pub fn focus_below(&mut self, index: usize) -> Snapshot {
        let last = self.stamps().len().saturating_sub(1);
        self.activate((index + 1).min(last))
    }

    // Keyboard

    /// Run the shortcut bound to `press`, if any.
    ///
    /// `Ok(None)` means no shortcut applies and the host should let the key through.
    pub fn handle_key(&mut self, press: &KeyPress) -> Result<Option<Snapshot>> {
        let Some(invocation) = self.shortcuts.dispatch(press) else {
            return Ok(None);
        };
        self.perform(invocation).map(Some)
    }

    /// Perform a dispatched shortcut.
    ///
    /// Stamp-bound actions take their stamp from the invocation target, never from any
    /// remembered selection.
    pub fn perform(&mut self, invocation: Invocation) -> Result<Snapshot> {
        let index = invocation.target.stamp_index();
        debug!(action = ?invocation.action, ?index, "performing shortcut");

        match (invocation.action, index) {
            (Action::TogglePlayback, _) => Ok(self.toggle_playback()),
            (Action::Open, _) => self.open_stamp(),
            (Action::Close, _) => self.close_stamp(),
            (Action::SpeedUp, _) => Ok(self.change_playback_rate(1)),
            (Action::SlowDown, _) => Ok(self.change_playback_rate(-1)),
            (Action::Stop, _) => Ok(self.stop()),
            (Action::FocusAbove, Some(index)) => Ok(self.focus_above(index)),
            (Action::FocusBelow, Some(index)) => Ok(self.focus_below(index)),
            (Action::Loop, Some(index)) => Ok(self.loop_stamp(index)),
            (Action::Nudge { boundary, delta_ms }, Some(index)) => {
                self.nudge(index, boundary, delta_ms)
            }
            (Action::Delete, Some(index)) => self.delete_stamp(index),
            (action, None) => {
                debug!(?action, "stamp action without a stamp editor target");
                Ok(self.publish(None))
            }
        }
    }

    // Frame loop

    /// Advance the snippet controller against the clock. Call once per frame.
    pub fn tick(&mut self) -> Snapshot {
        let outcome = self.snippet.tick(&mut self.clock, &self.timeline);
        if !matches!(outcome, TickOutcome::Idle | TickOutcome::Continue) {
            debug!(?outcome, current_time = self.clock.current_time(), "snippet transition");
        }
        self.publish(None)
    }

    /// Build a snapshot of the current state without notifying subscribers.
    pub fn snapshot(&self) -> Snapshot {
        self.build_snapshot(None)
    }

    // Output

    /// Write the session for the current media to the store.
    pub fn persist(&mut self) -> Result<()> {
        let Some(media) = self.media.as_ref() else {
            return Ok(());
        };
        save_voices(&mut self.store, &media.name, self.timeline.voices())?;
        self.dirty = false;
        Ok(())
    }

    pub fn export<W: Write>(&self, output_type: OutputType, w: W) -> Result<()> {
        export::export(&self.timeline, output_type, w)
    }

    // Internals

    fn commit_and_publish(&mut self, stamps: Vec<Stamp>, focus: Option<usize>) -> Result<Snapshot> {
        let saved = self.commit(stamps);
        let snapshot = self.publish(focus);
        saved.map(|()| snapshot)
    }

    /// Swap in the selected voice's new stamps, validate and autosave.
    ///
    /// The in-memory edit stands even when saving fails.
    fn commit(&mut self, stamps: Vec<Stamp>) -> Result<()> {
        Arc::make_mut(&mut self.timeline).replace_stamps(self.selected_voice, stamps);
        self.dirty = true;
        self.revalidate();
        self.autosave()
    }

    fn autosave(&mut self) -> Result<()> {
        if !self.opts.autosave {
            return Ok(());
        }
        self.persist().inspect_err(|err| {
            warn!(error = %err, "failed to persist stamps");
        })
    }

    fn revalidate(&mut self) {
        self.warnings = self.validator.validate(self.stamps());
        for warning in &self.warnings {
            warn!(?warning, voice = self.selected_voice, "stamp validation");
        }
    }

    fn publish(&mut self, focus: Option<usize>) -> Snapshot {
        let snapshot = self.build_snapshot(focus);
        for subscriber in &mut self.subscribers {
            subscriber(&snapshot);
        }
        snapshot
    }

    fn build_snapshot(&self, focus: Option<usize>) -> Snapshot {
        let current_time = self.clock.current_time();
        let stamps = self.stamps();

        let covering = covering_stamps(stamps, current_time)
            .into_iter()
            .map(|index| {
                let stamp = &stamps[index];
                let label = if stamp.text.is_empty() {
                    describe_range(stamp)
                } else {
                    stamp.text.clone()
                };
                ActiveStamp {
                    index,
                    label,
                    progress: progress(stamp, current_time),
                }
            })
            .collect();

        Snapshot {
            timeline: Arc::clone(&self.timeline),
            media_kind: self.media.as_ref().map(|m| m.kind),
            selected_voice: self.selected_voice,
            current_time,
            duration: self.clock.duration(),
            playback_rate: self.clock.playback_rate(),
            paused: self.clock.paused(),
            pivot: pivot_index(stamps, current_time),
            covering,
            snippet: self.snippet_view(),
            focus,
            warnings: self.warnings.clone(),
        }
    }

    fn snippet_view(&self) -> Option<SnippetView> {
        let (voice, id, looping) = match self.snippet.state() {
            SnippetState::Idle => return None,
            SnippetState::Previewing { voice, stamp } => (voice, stamp, false),
            SnippetState::Looping { voice, stamp } => (voice, stamp, true),
        };

        // A deleted stamp stays referenced until the next tick drops it.
        let index = self.timeline.voice(voice)?.index_of(id)?;
        let stamp = &self.timeline.stamps(voice)[index];

        let mut description = format!(
            "{} a snippet of a stamp #{index}",
            if looping { "Looping" } else { "Playing" }
        );
        if !stamp.text.is_empty() {
            description.push_str(&format!(" \"{}\"", stamp.text));
        }
        description.push_str(&describe_range(stamp));

        Some(SnippetView {
            voice,
            index,
            looping,
            description,
        })
    }
}
