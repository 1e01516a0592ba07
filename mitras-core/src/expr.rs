//! Expression records and the ordered list that owns them.
//!
//! The list is the only place analysis results are stored. Any edit re-runs
//! the analyzer over every record in order, threading the scope forward, so
//! no record ever holds a result computed against a stale scope.

use std::error::Error;
use std::fmt;

use mitras_graphics::types::DrawOptions;

use crate::analyze::{Analysis, analyze};
use crate::animation::{AnimationState, DEFAULT_DURATION_MS};
use crate::scope::Scope;

// ---------------------------------------------------------------------------
// Identifiers and errors
// ---------------------------------------------------------------------------

/// Stable record identifier, never reused within a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u64);

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A list operation named a record or position that doesn't exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    UnknownId(ExprId),
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownId(id) => write!(f, "no expression with id {id}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for {len} expressions")
            }
        }
    }
}

impl Error for ExprError {}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExprKind {
    #[default]
    Math,
    /// Free text; never analyzed or drawn.
    Comment,
}

/// One user expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprRecord {
    id: ExprId,
    pub kind: ExprKind,
    /// Markup as typed.
    pub source: String,
    /// Result of the latest analyzer pass.
    pub analysis: Analysis,
    pub options: DrawOptions,
    pub animation_duration_ms: f64,
    pub animation: AnimationState,
    tex_to_insert: Option<String>,
}

impl ExprRecord {
    /// A record with blank analysis.
    #[must_use]
    pub fn new(id: ExprId, kind: ExprKind, source: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            source: source.into(),
            analysis: Analysis::default(),
            options: DrawOptions::default(),
            animation_duration_ms: DEFAULT_DURATION_MS,
            animation: AnimationState::default(),
            tex_to_insert: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ExprId {
        self.id
    }

    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.kind == ExprKind::Comment
    }

    /// Visible, evaluated and not a comment.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        !self.is_comment() && self.options.visible && self.analysis.is_evaluated()
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// Ordered collection of expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprList {
    records: Vec<ExprRecord>,
    next_id: u64,
}

impl Default for ExprList {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprList {
    /// A list holding one blank math expression.
    #[must_use]
    pub fn new() -> Self {
        let mut list = Self {
            records: Vec::new(),
            next_id: 0,
        };
        list.new_expr(ExprKind::Math);
        list
    }

    /// Append a blank record.
    pub fn new_expr(&mut self, kind: ExprKind) -> ExprId {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        self.records.push(ExprRecord::new(id, kind, ""));
        id
    }

    #[must_use]
    pub fn get(&self, id: ExprId) -> Option<&ExprRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: ExprId) -> Result<&mut ExprRecord, ExprError> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ExprError::UnknownId(id))
    }

    /// Store new source text and re-run the analyzer pass.
    ///
    /// # Errors
    ///
    /// [`ExprError::UnknownId`] when `id` isn't in the list.
    pub fn set_source(&mut self, id: ExprId, text: impl Into<String>) -> Result<(), ExprError> {
        let record = self.get_mut(id)?;
        record.source = text.into();
        record.tex_to_insert = None;
        if !record.is_comment() {
            self.evaluate_all();
        }
        Ok(())
    }

    /// Queue a markup fragment for the input widget to insert.
    ///
    /// # Errors
    ///
    /// [`ExprError::UnknownId`] when `id` isn't in the list.
    pub fn insert_tex(&mut self, id: ExprId, fragment: impl Into<String>) -> Result<(), ExprError> {
        self.get_mut(id)?.tex_to_insert = Some(fragment.into());
        Ok(())
    }

    /// Hand the queued fragment to the input widget.
    pub fn take_tex_to_insert(&mut self, id: ExprId) -> Option<String> {
        self.get_mut(id).ok()?.tex_to_insert.take()
    }

    /// # Errors
    ///
    /// [`ExprError::UnknownId`] when `id` isn't in the list.
    pub fn set_options(&mut self, id: ExprId, options: DrawOptions) -> Result<(), ExprError> {
        self.get_mut(id)?.options = options;
        Ok(())
    }

    /// # Errors
    ///
    /// [`ExprError::UnknownId`] when `id` isn't in the list.
    pub fn set_animation_duration(&mut self, id: ExprId, ms: f64) -> Result<(), ExprError> {
        self.get_mut(id)?.animation_duration_ms = ms;
        Ok(())
    }

    /// Remove a record; later expressions are re-analyzed without its
    /// bindings.
    ///
    /// # Errors
    ///
    /// [`ExprError::UnknownId`] when `id` isn't in the list.
    pub fn delete(&mut self, id: ExprId) -> Result<ExprRecord, ExprError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(ExprError::UnknownId(id))?;
        let record = self.records.remove(index);
        self.evaluate_all();
        Ok(record)
    }

    /// Move the record at `from` to position `to`.
    ///
    /// # Errors
    ///
    /// [`ExprError::IndexOutOfRange`] when either index is past the end.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), ExprError> {
        let len = self.records.len();
        for index in [from, to] {
            if index >= len {
                return Err(ExprError::IndexOutOfRange { index, len });
            }
        }
        let record = self.records.remove(from);
        self.records.insert(to, record);
        self.evaluate_all();
        Ok(())
    }

    /// Replace the whole list, e.g. after an import.
    ///
    /// Ids are kept; new ids continue after the largest imported one.
    pub fn load(&mut self, records: Vec<ExprRecord>) {
        self.next_id = records.iter().map(|r| r.id.0 + 1).max().unwrap_or(0);
        self.records = records;
        self.evaluate_all();
    }

    /// Fold the analyzer over the list from an empty scope.
    pub fn evaluate_all(&mut self) {
        let mut scope = Scope::new();
        for record in &mut self.records {
            if record.is_comment() {
                record.analysis = Analysis::default();
                continue;
            }
            let (analysis, next) = analyze(&record.source, &scope);
            record.analysis = analysis;
            scope = next;
        }
    }

    /// Mark a record for animation on the next draw pass. Returns whether
    /// the record exists.
    pub fn request_animation(&mut self, id: ExprId) -> bool {
        match self.get_mut(id) {
            Ok(record) => {
                if !record.animation.request() {
                    log::debug!("expression {id} is already animating");
                }
                true
            }
            Err(err) => {
                log::warn!("cannot animate: {err}");
                false
            }
        }
    }

    #[must_use]
    pub fn records(&self) -> &[ExprRecord] {
        &self.records
    }

    /// Mutable access for the scene, which drives animation state.
    pub fn records_mut(&mut self) -> &mut [ExprRecord] {
        &mut self.records
    }

    /// Records the scene would draw.
    pub fn drawable(&self) -> impl Iterator<Item = &ExprRecord> {
        self.records.iter().filter(|r| r.is_drawable())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn list(sources: &[&str]) -> (ExprList, Vec<ExprId>) {
        let mut list = ExprList::new();
        let mut ids = vec![ExprId(0)];
        for _ in 1..sources.len() {
            ids.push(list.new_expr(ExprKind::Math));
        }
        for (id, source) in ids.iter().zip(sources) {
            list.set_source(*id, *source).unwrap();
        }
        (list, ids)
    }

    fn value(list: &ExprList, id: ExprId) -> Option<&Value> {
        list.get(id).unwrap().analysis.value.as_ref()
    }

    #[test]
    fn starts_with_one_blank_record() {
        let list = ExprList::new();
        assert_eq!(list.len(), 1);
        assert_eq!(list.records()[0].id(), ExprId(0));
        assert_eq!(list.drawable().count(), 0);
    }

    #[test]
    fn ids_are_monotonic_and_not_reused() {
        let mut list = ExprList::new();
        let a = list.new_expr(ExprKind::Math);
        list.delete(a).unwrap();
        let b = list.new_expr(ExprKind::Math);
        assert_eq!(a, ExprId(1));
        assert_eq!(b, ExprId(2));
    }

    #[test]
    fn edits_propagate_forward() {
        let (mut list, ids) = list(&["a=2", "a+1"]);
        assert_eq!(value(&list, ids[1]), Some(&Value::Number(3.0)));
        list.set_source(ids[0], "a=10").unwrap();
        assert_eq!(value(&list, ids[1]), Some(&Value::Number(11.0)));
    }

    #[test]
    fn delete_unbinds() {
        let (mut list, ids) = list(&["a=2", "a+1"]);
        list.delete(ids[0]).unwrap();
        assert_eq!(value(&list, ids[1]), None);
    }

    #[test]
    fn reorder_changes_visibility_of_bindings() {
        let (mut list, ids) = list(&["a=2", "a+1"]);
        list.reorder(1, 0).unwrap();
        assert_eq!(value(&list, ids[1]), None);
        assert_eq!(
            list.reorder(0, 5),
            Err(ExprError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn comments_are_skipped() {
        let mut list = ExprList::new();
        let note = list.new_expr(ExprKind::Comment);
        list.set_source(ExprId(0), "x=1").unwrap();
        list.set_source(note, "x+1 is two").unwrap();
        let record = list.get(note).unwrap();
        assert_eq!(record.analysis, Analysis::default());
        assert!(!record.is_drawable());
    }

    #[test]
    fn insert_tex_is_taken_once() {
        let mut list = ExprList::new();
        list.insert_tex(ExprId(0), r"\det").unwrap();
        assert_eq!(list.take_tex_to_insert(ExprId(0)).as_deref(), Some(r"\det"));
        assert_eq!(list.take_tex_to_insert(ExprId(0)), None);
    }

    #[test]
    fn load_bumps_id_counter() {
        let mut list = ExprList::new();
        list.load(vec![
            ExprRecord::new(ExprId(4), ExprKind::Math, "b=3"),
            ExprRecord::new(ExprId(7), ExprKind::Math, "2b"),
        ]);
        assert_eq!(value(&list, ExprId(7)), Some(&Value::Number(6.0)));
        assert_eq!(list.new_expr(ExprKind::Math), ExprId(8));
    }

    #[test]
    fn hidden_records_are_not_drawable() {
        let (mut list, ids) = list(&[r"\begin{bmatrix}1\\2\end{bmatrix}"]);
        assert_eq!(list.drawable().count(), 1);
        let hidden = DrawOptions {
            visible: false,
            ..DrawOptions::default()
        };
        list.set_options(ids[0], hidden).unwrap();
        assert_eq!(list.drawable().count(), 0);
    }

    #[test]
    fn animation_requests() {
        let mut list = ExprList::new();
        assert!(list.request_animation(ExprId(0)));
        assert!(list.records()[0].animation.is_requested());
        assert!(!list.request_animation(ExprId(9)));
        assert_eq!(
            list.set_source(ExprId(9), "1"),
            Err(ExprError::UnknownId(ExprId(9)))
        );
    }
}
