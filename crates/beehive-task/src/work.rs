//! The computation a task runs in its background step.

use crate::error::WorkError;

/// A background computation over owned inputs.
///
/// Implementors hold copies of everything they need; `run` executes on a worker thread
/// and must not reach for caller-owned state. Returning `Err` (or panicking) is reported
/// to the caller as a failure, never as a process fault.
pub trait Work: Send + 'static {
    /// Value handed to the caller on success.
    type Output: Send + 'static;

    /// Short label used in logs and the task registry.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Execute the computation.
    fn run(&self) -> Result<Self::Output, WorkError>;
}

/// Adapter turning a closure into [`Work`].
pub struct FnWork<F> {
    name: String,
    f: F,
}

impl<F, T> FnWork<F>
where
    F: Fn() -> Result<T, WorkError> + Send + 'static,
    T: Send + 'static,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> std::fmt::Debug for FnWork<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnWork").field("name", &self.name).finish()
    }
}

impl<F, T> Work for FnWork<F>
where
    F: Fn() -> Result<T, WorkError> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self) -> Result<T, WorkError> {
        (self.f)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_work_runs_closure() {
        let work = FnWork::new("answer", || Ok::<_, WorkError>(42));
        assert_eq!(work.name(), "answer");
        assert_eq!(work.run(), Ok(42));
    }

    #[test]
    fn test_default_name_is_type_name() {
        struct Nap;
        impl Work for Nap {
            type Output = ();
            fn run(&self) -> Result<(), WorkError> {
                Ok(())
            }
        }
        assert!(Nap.name().ends_with("Nap"));
    }
}
