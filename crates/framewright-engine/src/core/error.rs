use thiserror::Error;

/// Misuse of the frame controller state machine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum LifecycleError {
    #[error("frame controller has not been initialized")]
    NotInitialized,

    #[error("frame controller is already initialized")]
    AlreadyInitialized,

    #[error("frame controller has been shut down")]
    Terminated,
}
