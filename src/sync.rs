//! Keeps paired preview lists and the script selection consistent
//!
//! Hosts report user actions here and receive programmatic updates through
//! [`ListView`] and [`ScriptEditor`]. Views that echo a programmatic change
//! back as a user event are expected: each propagation records the echo it
//! will cause and swallows it when it arrives.

use tracing::{debug, trace};

use crate::preview::PreviewPair;
use crate::settings::{NamedScript, RenamingSettings};

/// Which of the two preview lists an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSide {
    Before,
    After,
}

impl ListSide {
    pub fn other(self) -> Self {
        match self {
            ListSide::Before => ListSide::After,
            ListSide::After => ListSide::Before,
        }
    }
}

/// A rendered list of preview rows
pub trait ListView {
    fn set_rows(&mut self, rows: &[String]);

    fn select_row(&mut self, row: usize);

    /// Make `top` the first visible row
    fn scroll_to(&mut self, top: usize);
}

/// The before and after views of one preview
pub struct ListPair<'a> {
    pub before: &'a mut dyn ListView,
    pub after: &'a mut dyn ListView,
}

impl<'a> ListPair<'a> {
    pub fn new(before: &'a mut dyn ListView, after: &'a mut dyn ListView) -> Self {
        Self { before, after }
    }

    fn side(&mut self, side: ListSide) -> &mut dyn ListView {
        match side {
            ListSide::Before => &mut *self.before,
            ListSide::After => &mut *self.after,
        }
    }
}

/// Single row and scroll cursor shared by both preview lists
#[derive(Debug, Clone, Default)]
pub struct SelectionSynchronizer {
    current_row: Option<usize>,
    scroll_top: usize,
    row_count: usize,
    pending_selection: Option<(ListSide, usize)>,
    pending_scroll: Option<(ListSide, usize)>,
}

impl SelectionSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active row, `None` when nothing is selected
    pub fn current_row(&self) -> Option<usize> {
        self.current_row
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Render both lists from one paired sequence and clear the selection
    pub fn display(&mut self, pairs: &[PreviewPair], views: &mut ListPair<'_>) {
        let before: Vec<String> = pairs.iter().map(|p| p.before.clone()).collect();
        let after: Vec<String> = pairs.iter().map(PreviewPair::after_text).collect();

        self.current_row = None;
        self.pending_selection = None;
        self.pending_scroll = None;
        self.row_count = pairs.len();
        self.scroll_top = self.scroll_top.min(self.row_count.saturating_sub(1));

        views.before.set_rows(&before);
        views.after.set_rows(&after);
        views.before.scroll_to(self.scroll_top);
        views.after.scroll_to(self.scroll_top);
        trace!(rows = self.row_count, "Displayed preview rows");
    }

    /// The user selected `row` in the "after" list
    pub fn selected_in_after(&mut self, row: usize, views: &mut ListPair<'_>) -> bool {
        self.selected_in(ListSide::After, row, views)
    }

    /// The user selected `row` in the "before" list
    pub fn selected_in_before(&mut self, row: usize, views: &mut ListPair<'_>) -> bool {
        self.selected_in(ListSide::Before, row, views)
    }

    /// Mirror a selection into the other list.
    ///
    /// Returns false when the event was an echo or out of range.
    pub fn selected_in(&mut self, side: ListSide, row: usize, views: &mut ListPair<'_>) -> bool {
        if self.pending_selection.take() == Some((side, row)) {
            trace!(?side, row, "Suppressed selection echo");
            return false;
        }
        if row >= self.row_count {
            return false;
        }

        self.current_row = Some(row);
        let target = side.other();
        self.pending_selection = Some((target, row));
        views.side(target).select_row(row);
        true
    }

    /// Keep both lists at the same topmost row
    pub fn scrolled(&mut self, side: ListSide, top: usize, views: &mut ListPair<'_>) -> bool {
        if self.pending_scroll.take() == Some((side, top)) {
            return false;
        }
        if top == self.scroll_top {
            return false;
        }

        self.scroll_top = top;
        let target = side.other();
        self.pending_scroll = Some((target, top));
        views.side(target).scroll_to(top);
        true
    }
}

/// The external script editing surface
pub trait ScriptEditor {
    fn selected_script_id(&self) -> &str;

    fn select_script(&mut self, id: &str);
}

/// Entries of the inline script selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorModel {
    pub titles: Vec<String>,
    pub current: Option<usize>,
}

impl SelectorModel {
    pub fn from_settings(settings: &RenamingSettings) -> Self {
        Self {
            titles: settings
                .naming_scripts
                .iter()
                .map(|s| s.title.clone())
                .collect(),
            current: settings.selected_index(),
        }
    }

    pub fn current_title(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.titles.get(i))
            .map(String::as_str)
    }
}

/// Two-way binding of `selected_script_id` between the inline selector and
/// the script editor
#[derive(Debug, Clone, Default)]
pub struct ScriptSelectionBinding {
    selector: SelectorModel,
    pending_editor_echo: Option<String>,
}

impl ScriptSelectionBinding {
    pub fn new(settings: &RenamingSettings) -> Self {
        Self {
            selector: SelectorModel::from_settings(settings),
            pending_editor_echo: None,
        }
    }

    pub fn selector(&self) -> &SelectorModel {
        &self.selector
    }

    /// The user picked a script in the inline selector.
    ///
    /// An empty id clears the selection. Unknown ids are ignored.
    pub fn selector_changed(
        &mut self,
        settings: &mut RenamingSettings,
        id: &str,
        editor: Option<&mut dyn ScriptEditor>,
    ) -> bool {
        if !id.is_empty() && !settings.naming_scripts.iter().any(|s| s.id == id) {
            debug!("Ignoring selection of unknown naming script '{}'", id);
            return false;
        }
        if settings.selected_script_id == id {
            return false;
        }

        select(settings, id);
        self.selector.current = settings.selected_index();

        if let Some(editor) = editor
            && editor.selected_script_id() != id
        {
            self.pending_editor_echo = Some(id.to_string());
            editor.select_script(id);
        }
        true
    }

    /// The editor changed its selection; returns the refreshed selector, or
    /// `None` if this was the echo of our own update
    pub fn editor_selection_changed(
        &mut self,
        settings: &mut RenamingSettings,
        id: &str,
    ) -> Option<&SelectorModel> {
        if self.pending_editor_echo.take().as_deref() == Some(id) {
            trace!(id, "Suppressed editor selection echo");
            return None;
        }

        select(settings, id);
        self.selector = SelectorModel::from_settings(settings);
        Some(&self.selector)
    }

    /// The editor added, removed or renamed scripts
    pub fn editor_scripts_changed(
        &mut self,
        settings: &mut RenamingSettings,
        scripts: Vec<NamedScript>,
    ) -> &SelectorModel {
        settings.naming_scripts = scripts;
        self.selector = SelectorModel::from_settings(settings);
        &self.selector
    }
}

/// Store the selection; a known script also becomes the active format
fn select(settings: &mut RenamingSettings, id: &str) {
    settings.selected_script_id = id.to_string();
    if let Some(body) = settings.selected_script().map(|s| s.body.clone()) {
        settings.naming_format = body;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PlatformDefaults;
    use std::collections::VecDeque;

    /// A view that reports programmatic changes back as user events
    #[derive(Default)]
    struct EchoingView {
        rows: Vec<String>,
        selected: Vec<usize>,
        scrolled: Vec<usize>,
        events: VecDeque<usize>,
    }

    impl ListView for EchoingView {
        fn set_rows(&mut self, rows: &[String]) {
            self.rows = rows.to_vec();
        }

        fn select_row(&mut self, row: usize) {
            self.selected.push(row);
            self.events.push_back(row);
        }

        fn scroll_to(&mut self, top: usize) {
            self.scrolled.push(top);
        }
    }

    fn pairs(n: usize) -> Vec<PreviewPair> {
        (0..n)
            .map(|row| PreviewPair {
                row,
                before: format!("before{row}"),
                after: Ok(format!("after{row}")),
            })
            .collect()
    }

    fn displayed(n: usize) -> (SelectionSynchronizer, EchoingView, EchoingView) {
        let mut sync = SelectionSynchronizer::new();
        let mut before = EchoingView::default();
        let mut after = EchoingView::default();
        sync.display(&pairs(n), &mut ListPair::new(&mut before, &mut after));
        (sync, before, after)
    }

    #[test]
    fn test_display_renders_paired_rows() {
        let (sync, before, after) = displayed(3);
        assert_eq!(before.rows, vec!["before0", "before1", "before2"]);
        assert_eq!(after.rows, vec!["after0", "after1", "after2"]);
        assert_eq!(sync.current_row(), None);
        assert_eq!(sync.row_count(), 3);
    }

    #[test]
    fn test_selection_echo_suppressed() {
        let (mut sync, mut before, mut after) = displayed(5);

        assert!(sync.selected_in_after(3, &mut ListPair::new(&mut before, &mut after)));
        assert_eq!(sync.current_row(), Some(3));
        assert_eq!(before.selected, vec![3]);

        // The before view reports its programmatic selection back
        while let Some(row) = before.events.pop_front() {
            assert!(!sync.selected_in_before(row, &mut ListPair::new(&mut before, &mut after)));
        }

        assert_eq!(before.selected, vec![3]);
        assert!(after.selected.is_empty());
        assert!(after.events.is_empty());
    }

    #[test]
    fn test_selection_mirrors_both_ways() {
        let (mut sync, mut before, mut after) = displayed(5);

        sync.selected_in_before(1, &mut ListPair::new(&mut before, &mut after));
        assert_eq!(after.selected, vec![1]);
        after.events.clear();

        sync.selected_in_after(4, &mut ListPair::new(&mut before, &mut after));
        assert_eq!(before.selected, vec![4]);
        assert_eq!(sync.current_row(), Some(4));
    }

    #[test]
    fn test_out_of_range_ignored() {
        let (mut sync, mut before, mut after) = displayed(2);
        assert!(!sync.selected_in_after(7, &mut ListPair::new(&mut before, &mut after)));
        assert_eq!(sync.current_row(), None);
        assert!(before.selected.is_empty());
    }

    #[test]
    fn test_redisplay_resets_selection() {
        let (mut sync, mut before, mut after) = displayed(4);
        sync.selected_in_after(2, &mut ListPair::new(&mut before, &mut after));
        sync.display(&pairs(4), &mut ListPair::new(&mut before, &mut after));
        assert_eq!(sync.current_row(), None);
    }

    #[test]
    fn test_scroll_lockstep() {
        let (mut sync, mut before, mut after) = displayed(20);
        let initial = after.scrolled.len();

        assert!(sync.scrolled(ListSide::Before, 6, &mut ListPair::new(&mut before, &mut after)));
        assert_eq!(after.scrolled.last(), Some(&6));
        assert_eq!(sync.scroll_top(), 6);

        // Echo from the after view
        assert!(!sync.scrolled(ListSide::After, 6, &mut ListPair::new(&mut before, &mut after)));
        assert_eq!(after.scrolled.len(), initial + 1);

        assert!(sync.scrolled(ListSide::After, 9, &mut ListPair::new(&mut before, &mut after)));
        assert_eq!(before.scrolled.last(), Some(&9));
    }

    struct Editor {
        selected: String,
        calls: usize,
    }

    impl ScriptEditor for Editor {
        fn selected_script_id(&self) -> &str {
            &self.selected
        }

        fn select_script(&mut self, id: &str) {
            self.selected = id.to_string();
            self.calls += 1;
        }
    }

    fn settings() -> RenamingSettings {
        let mut s = RenamingSettings::defaults(&PlatformDefaults {
            requires_windows_compatibility: false,
            music_dir: "/music".to_string(),
            naming_format: "%title%".to_string(),
        });
        s.naming_scripts = vec![
            NamedScript::new("script-A", "Album", "%album%/%title%"),
            NamedScript::new("script-B", "Artist", "%artist%/%title%"),
        ];
        s
    }

    #[test]
    fn test_selector_pushes_to_editor() {
        let mut s = settings();
        let mut binding = ScriptSelectionBinding::new(&s);
        let mut editor = Editor {
            selected: String::new(),
            calls: 0,
        };

        assert!(binding.selector_changed(&mut s, "script-A", Some(&mut editor)));
        assert_eq!(editor.selected_script_id(), "script-A");
        assert_eq!(s.selected_script_id, "script-A");
        assert_eq!(s.naming_format, "%album%/%title%");
        assert_eq!(binding.selector().current_title(), Some("Album"));

        // The editor's change notification is our own echo
        assert!(binding.editor_selection_changed(&mut s, "script-A").is_none());
        assert_eq!(editor.calls, 1);
    }

    #[test]
    fn test_editor_updates_selector() {
        let mut s = settings();
        let mut binding = ScriptSelectionBinding::new(&s);

        let selector = binding.editor_selection_changed(&mut s, "script-B").unwrap();
        assert_eq!(selector.current_title(), Some("Artist"));
        assert_eq!(selector.titles, vec!["Album", "Artist"]);
        assert_eq!(s.selected_script_id, "script-B");
        assert_eq!(s.naming_format, "%artist%/%title%");
    }

    #[test]
    fn test_unknown_and_repeated_selection() {
        let mut s = settings();
        let mut binding = ScriptSelectionBinding::new(&s);

        assert!(!binding.selector_changed(&mut s, "nope", None));
        assert_eq!(s.selected_script_id, "");

        assert!(binding.selector_changed(&mut s, "script-B", None));
        assert!(!binding.selector_changed(&mut s, "script-B", None));

        assert!(binding.selector_changed(&mut s, "", None));
        assert_eq!(binding.selector().current, None);
    }

    #[test]
    fn test_editor_dangling_selection_reads_as_none() {
        let mut s = settings();
        let mut binding = ScriptSelectionBinding::new(&s);
        let selector = binding.editor_selection_changed(&mut s, "deleted").unwrap();
        assert_eq!(selector.current, None);
        assert_eq!(s.naming_format, "%title%");
    }

    #[test]
    fn test_editor_scripts_changed() {
        let mut s = settings();
        s.selected_script_id = "script-B".to_string();
        let mut binding = ScriptSelectionBinding::new(&s);

        let selector = binding.editor_scripts_changed(
            &mut s,
            vec![NamedScript::new("script-B", "Artist", "%artist%/%title%")],
        );
        assert_eq!(selector.titles, vec!["Artist"]);
        assert_eq!(selector.current, Some(0));
    }
}
