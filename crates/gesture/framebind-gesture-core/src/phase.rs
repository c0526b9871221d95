/// Outcome of feeding one event to a recognizer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GesturePhase<T> {
    Began(T),
    Changed(T),
    Ended(T),
    Cancelled(T),
}

impl<T> GesturePhase<T> {
    pub fn data(&self) -> &T {
        match self {
            GesturePhase::Began(d)
            | GesturePhase::Changed(d)
            | GesturePhase::Ended(d)
            | GesturePhase::Cancelled(d) => d,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            GesturePhase::Began(d)
            | GesturePhase::Changed(d)
            | GesturePhase::Ended(d)
            | GesturePhase::Cancelled(d) => d,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GesturePhase::Ended(_) | GesturePhase::Cancelled(_))
    }
}
