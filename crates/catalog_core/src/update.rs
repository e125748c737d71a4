use crate::{Effect, Msg, PagerState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PagerState, msg: Msg) -> (PagerState, Vec<Effect>) {
    let effects = match msg {
        Msg::Start => {
            // Activation happens once; a `LoadMore` before `Start` counts as activation.
            if !state.activate() {
                return (state, Vec::new());
            }
            state.begin_load().into_iter().collect()
        }
        Msg::LoadMore => state.begin_load().into_iter().collect(),
        Msg::PageLoaded { page, result } => {
            state.finish_load(page, result);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
