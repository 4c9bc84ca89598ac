/// What the search screen is showing. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Typing,
    Searching,
    Results,
    NoResults,
    StemmedBrowsing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    InputChanged { empty: bool },
    SearchStarted,
    SearchFinished { found: bool },
    SubmittedEmpty,
    StemmedToggled { has_query: bool },
}

impl ViewState {
    pub fn next(self, event: Event) -> ViewState {
        use ViewState::*;

        match (self, event) {
            (Idle | Typing, Event::InputChanged { empty: false }) => Typing,
            (Typing, Event::InputChanged { empty: true }) => Idle,
            // Editing over results or the vocabulary panel keeps that screen.
            (state, Event::InputChanged { .. }) => state,

            (_, Event::SearchStarted) => Searching,
            (Searching, Event::SearchFinished { found: true }) => Results,
            (Searching, Event::SearchFinished { found: false }) => NoResults,
            (state, Event::SearchFinished { .. }) => state,

            (_, Event::SubmittedEmpty) => Idle,

            (Idle | Typing, Event::StemmedToggled { .. }) => StemmedBrowsing,
            (StemmedBrowsing, Event::StemmedToggled { has_query: true }) => Typing,
            (StemmedBrowsing, Event::StemmedToggled { has_query: false }) => Idle,
            (state, Event::StemmedToggled { .. }) => state,
        }
    }

    pub fn shows_suggestions(self) -> bool {
        self != ViewState::Searching
    }

    pub fn is_pre_search(self) -> bool {
        matches!(self, ViewState::Idle | ViewState::Typing | ViewState::StemmedBrowsing)
    }
}
