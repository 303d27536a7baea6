//! Events emitted by the scene controllers.
//! The presentation layer consumes these for sound.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UiEvent {
    SelectionMoved,
    Activated,
    ModalOpened,
    ModalClosed,
}
