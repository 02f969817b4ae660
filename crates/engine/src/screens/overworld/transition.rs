use crate::app::{ScreenStatus, Texture};

/// Successor the exploration screen will produce on its next advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionRequest {
    #[default]
    None,
    Battle,
    MenuOpen,
    Menu,
    MenuClose,
}

impl TransitionRequest {
    /// Stable numeric code reported in fatal errors.
    pub fn code(self) -> u8 {
        match self {
            TransitionRequest::None => 0,
            TransitionRequest::Battle => 1,
            TransitionRequest::MenuOpen => 2,
            TransitionRequest::Menu => 3,
            TransitionRequest::MenuClose => 4,
        }
    }

    /// Next stage of the menu sequence, if this is a non-final stage.
    pub fn next_in_sequence(self) -> Option<TransitionRequest> {
        match self {
            TransitionRequest::MenuOpen => Some(TransitionRequest::Menu),
            TransitionRequest::Menu => Some(TransitionRequest::MenuClose),
            _ => None,
        }
    }
}

/// Tracks the pending successor request and the backdrop captured for the
/// next transition.
#[derive(Debug, Default)]
pub struct TransitionResolver {
    request: TransitionRequest,
    snapshot: Option<Texture>,
}

impl TransitionResolver {
    pub fn request(&self) -> TransitionRequest {
        self.request
    }

    /// Moves a mid-sequence request to its next stage. Returns the status
    /// that hands control to that stage, or `None` outside a sequence.
    pub fn advance_sequence(&mut self) -> Option<ScreenStatus> {
        let next = self.request.next_in_sequence()?;
        self.request = next;
        Some(ScreenStatus::AdvanceSilent)
    }

    pub fn begin_menu(&mut self) {
        self.request = TransitionRequest::MenuOpen;
    }

    pub fn request_battle(&mut self) {
        self.request = TransitionRequest::Battle;
    }

    pub fn capture(&mut self, snapshot: Texture) {
        self.snapshot = Some(snapshot);
    }

    pub fn snapshot(&self) -> Option<&Texture> {
        self.snapshot.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_sequence_walks_open_menu_close_then_stops() {
        let mut resolver = TransitionResolver::default();
        assert_eq!(resolver.advance_sequence(), None);

        resolver.begin_menu();
        assert_eq!(resolver.request(), TransitionRequest::MenuOpen);
        assert_eq!(resolver.advance_sequence(), Some(ScreenStatus::AdvanceSilent));
        assert_eq!(resolver.request(), TransitionRequest::Menu);
        assert_eq!(resolver.advance_sequence(), Some(ScreenStatus::AdvanceSilent));
        assert_eq!(resolver.request(), TransitionRequest::MenuClose);
        assert_eq!(resolver.advance_sequence(), None);
        assert_eq!(resolver.request(), TransitionRequest::MenuClose);
    }

    #[test]
    fn battle_request_is_not_a_sequence() {
        let mut resolver = TransitionResolver::default();
        resolver.request_battle();
        assert_eq!(resolver.advance_sequence(), None);
        assert_eq!(resolver.request().code(), 1);
    }

    #[test]
    fn codes_are_stable() {
        let codes: Vec<u8> = [
            TransitionRequest::None,
            TransitionRequest::Battle,
            TransitionRequest::MenuOpen,
            TransitionRequest::Menu,
            TransitionRequest::MenuClose,
        ]
        .into_iter()
        .map(TransitionRequest::code)
        .collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4]);
    }
}
