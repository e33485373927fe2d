mod dispatcher;
mod trigger;

pub use {
    dispatcher::{ADMISSION_CAPACITY, Admission, TriggerDispatcher, TriggerWorker},
    trigger::{Trigger, TriggerOrigin},
};
