mod controller;
mod outcome;
mod state;

pub use {
    controller::{
        Collaborators, DEFAULT_STAGE_TIMEOUT, MIN_RECORDING_DURATION, OUTPUT_FAILURE_MESSAGE,
        OUTPUT_FAILURE_TITLE, SessionController, SessionSettings,
    },
    outcome::{CycleFailure, CycleOutcome, Stage},
    state::{SessionState, SessionStateMachine},
};
