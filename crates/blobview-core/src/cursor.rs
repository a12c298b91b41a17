//! Backward-navigable cursor over forward-only continuation tokens.

use crate::token::ContinuationToken;

/// Paging state for one viewer session.
///
/// A storage listing can only move forward: given the token of a page it
/// returns that page and the token of the next one. `PageCursor` remembers
/// the token of every page before the current one, which is enough to step
/// back one page at a time.
///
/// The cursor is positioned at page `depth() + 1`. `stack[0]`, when present,
/// is always `None` because that is the token of the first page.
///
/// ```
/// use blobview_core::{ContinuationToken, PageCursor};
///
/// let mut cursor = PageCursor::new();
/// cursor.on_page_fetched(Some(ContinuationToken::new("t1")));
/// assert!(cursor.advance_fetched());
/// assert_eq!(cursor.current_token(), Some(&ContinuationToken::new("t1")));
///
/// cursor.retreat();
/// assert_eq!(cursor.current_token(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
    stack: Vec<Option<ContinuationToken>>,
    current: Option<ContinuationToken>,
    /// Next token reported by the last successful fetch of `current`.
    /// The outer `None` means nothing has been fetched at this position yet.
    fetched_next: Option<Option<ContinuationToken>>,
}

impl PageCursor {
    /// Creates a cursor positioned at the first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns to the first page and forgets all history.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.current = None;
        self.fetched_next = None;
    }

    /// Records the next token returned by a successful fetch of the current
    /// page. Position and history are unchanged; moving past the page only
    /// happens on [`advance`](Self::advance).
    pub fn on_page_fetched(&mut self, next: Option<ContinuationToken>) {
        self.fetched_next = Some(next);
    }

    /// Moves forward to the page identified by `next`.
    ///
    /// The current token is pushed onto the history, so the history grows by
    /// exactly one entry. `None` is accepted and requests the first page
    /// again; callers disable forward navigation once the listing reports no
    /// further pages. Any page reached through [`retreat`](Self::retreat) and
    /// not re-fetched is dropped, so there is never a redo history.
    pub fn advance(&mut self, next: Option<ContinuationToken>) {
        let previous = std::mem::replace(&mut self.current, next);
        self.stack.push(previous);
        self.fetched_next = None;
    }

    /// Advances using the token recorded by
    /// [`on_page_fetched`](Self::on_page_fetched).
    ///
    /// Returns `false` and leaves the cursor untouched when the current page
    /// has not been fetched.
    pub fn advance_fetched(&mut self) -> bool {
        match self.fetched_next.take() {
            Some(next) => {
                self.advance(next);
                true
            }
            None => false,
        }
    }

    /// Moves back to the page before the current one.
    ///
    /// The current page's position is discarded and the token of the page
    /// before it becomes current. On the first page this is a no-op.
    pub fn retreat(&mut self) {
        if let Some(previous) = self.stack.pop() {
            self.current = previous;
            self.fetched_next = None;
        }
    }

    /// Returns the token to use for the next listing call.
    #[must_use]
    pub fn current_token(&self) -> Option<&ContinuationToken> {
        self.current.as_ref()
    }

    /// Returns the number of pages before the current one.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns the 1-based number of the current page.
    #[must_use]
    pub fn page_number(&self) -> usize {
        self.stack.len() + 1
    }

    /// Returns whether there is a page to go back to.
    #[must_use]
    pub fn can_retreat(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Returns the next token from the last fetch of the current page.
    ///
    /// `None` when the page has not been fetched, `Some(None)` when it was
    /// the last page.
    #[must_use]
    pub fn fetched_next(&self) -> Option<Option<&ContinuationToken>> {
        self.fetched_next.as_ref().map(Option::as_ref)
    }

    /// Returns whether the current page was fetched and has a successor.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        matches!(self.fetched_next, Some(Some(_)))
    }

    /// Returns whether the cursor is in its initial state.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        self.stack.is_empty() && self.current.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: &str) -> Option<ContinuationToken> {
        Some(ContinuationToken::new(value))
    }

    /// Drives the cursor through `pages` forward steps with tokens `t1..tN`.
    fn advanced(pages: usize) -> PageCursor {
        let mut cursor = PageCursor::new();
        for i in 1..=pages {
            cursor.advance(token(&format!("t{i}")));
        }
        cursor
    }

    #[test]
    fn reset_restores_initial_state() {
        for depth in [0, 1, 5, 40] {
            let mut cursor = advanced(depth);
            cursor.on_page_fetched(token("later"));
            cursor.reset();
            assert_eq!(cursor.current_token(), None);
            assert_eq!(cursor, PageCursor::new());
            assert!(cursor.is_initial());
        }
    }

    #[test]
    fn reset_is_idempotent() {
        let mut cursor = advanced(3);
        cursor.reset();
        let once = cursor.clone();
        cursor.reset();
        assert_eq!(cursor, once);
    }

    #[test]
    fn advance_then_retreat_is_inverse() {
        for depth in 0..6 {
            for next in [None, token("x"), token("")] {
                let mut cursor = advanced(depth);
                let before_token = cursor.current_token().cloned();
                let before_depth = cursor.depth();

                cursor.advance(next);
                cursor.retreat();

                assert_eq!(cursor.current_token().cloned(), before_token);
                assert_eq!(cursor.depth(), before_depth);
            }
        }
    }

    #[test]
    fn retreat_from_first_page_is_noop() {
        let mut cursor = PageCursor::new();
        for _ in 0..10 {
            cursor.retreat();
            assert_eq!(cursor.current_token(), None);
            assert_eq!(cursor.depth(), 0);
        }
    }

    #[test]
    fn retreat_keeps_lookahead_on_first_page() {
        let mut cursor = PageCursor::new();
        cursor.on_page_fetched(token("t1"));
        cursor.retreat();
        assert!(cursor.can_advance());
    }

    #[test]
    fn stack_grows_by_one_per_advance() {
        let mut cursor = PageCursor::new();
        for n in 1..=25 {
            cursor.advance(token(&format!("t{n}")));
            assert_eq!(cursor.depth(), n);
            assert_eq!(cursor.page_number(), n + 1);
        }
    }

    #[test]
    fn first_history_entry_is_start_of_sequence() {
        let mut cursor = advanced(4);
        for _ in 0..3 {
            cursor.retreat();
        }
        assert_eq!(cursor.current_token(), token("t1").as_ref());
        cursor.retreat();
        assert_eq!(cursor.current_token(), None);
        assert!(!cursor.can_retreat());
    }

    #[test]
    fn retreat_walks_back_one_page_at_a_time() {
        let mut cursor = advanced(3);
        assert_eq!(cursor.current_token(), token("t3").as_ref());
        cursor.retreat();
        assert_eq!(cursor.current_token(), token("t2").as_ref());
        cursor.retreat();
        assert_eq!(cursor.current_token(), token("t1").as_ref());
        cursor.retreat();
        assert_eq!(cursor.current_token(), None);
    }

    #[test]
    fn fetch_hook_does_not_move() {
        let mut cursor = PageCursor::new();
        cursor.on_page_fetched(token("t1"));
        assert_eq!(cursor.current_token(), None);
        assert_eq!(cursor.depth(), 0);
        assert_eq!(cursor.fetched_next(), Some(token("t1").as_ref()));
    }

    #[test]
    fn advance_fetched_requires_a_fetch() {
        let mut cursor = PageCursor::new();
        assert!(!cursor.advance_fetched());
        assert!(cursor.is_initial());

        cursor.on_page_fetched(token("t1"));
        assert!(cursor.advance_fetched());
        assert_eq!(cursor.current_token(), token("t1").as_ref());
        assert_eq!(cursor.fetched_next(), None);
        assert!(!cursor.advance_fetched());
    }

    #[test]
    fn last_page_cannot_advance() {
        let mut cursor = advanced(1);
        cursor.on_page_fetched(None);
        assert!(!cursor.can_advance());
        assert_eq!(cursor.fetched_next(), Some(None));
    }

    #[test]
    fn advance_after_retreat_truncates_redo() {
        let mut cursor = advanced(3);
        cursor.retreat();
        cursor.retreat();
        assert_eq!(cursor.depth(), 1);

        cursor.on_page_fetched(token("fresh"));
        assert!(cursor.advance_fetched());
        assert_eq!(cursor.depth(), 2);
        assert_eq!(cursor.current_token(), token("fresh").as_ref());

        cursor.retreat();
        assert_eq!(cursor.current_token(), token("t1").as_ref());
    }

    #[test]
    fn two_page_listing_scenario() {
        let mut cursor = PageCursor::new();

        // Page 1: [a, b], next = T1.
        assert_eq!(cursor.current_token(), None);
        cursor.on_page_fetched(token("T1"));

        cursor.advance(token("T1"));
        assert_eq!(cursor.current_token(), token("T1").as_ref());

        // Page 2: [c, d], next = None.
        cursor.on_page_fetched(None);
        assert!(!cursor.can_advance());

        cursor.retreat();
        assert_eq!(cursor.current_token(), None);
        assert_eq!(cursor.page_number(), 1);
    }
}
