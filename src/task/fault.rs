use std::{any::Any, fmt, panic};

/// A fault captured from a task body.
///
/// A task faults when its future panics while being resumed. The panic payload is kept
/// intact so the fault can be re-raised in whichever task awaits it, or inspected by the
/// owner of the handle.
pub struct TaskFault {
    payload: Box<dyn Any + Send + 'static>,
}

impl TaskFault {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        Self { payload }
    }

    /// Message carried by the fault, if the payload was a string (as with `panic!("...")`).
    pub fn message(&self) -> Option<&str> {
        if let Some(s) = self.payload.downcast_ref::<&'static str>() {
            Some(s)
        } else if let Some(s) = self.payload.downcast_ref::<String>() {
            Some(s.as_str())
        } else {
            None
        }
    }

    /// Borrows the payload as `E`, for faults raised with [`std::panic::panic_any`].
    pub fn downcast_ref<E: Any>(&self) -> Option<&E> {
        self.payload.downcast_ref::<E>()
    }

    pub fn is<E: Any>(&self) -> bool {
        self.payload.is::<E>()
    }

    pub fn into_panic(self) -> Box<dyn Any + Send + 'static> {
        self.payload
    }

    /// Re-raises the fault on the current thread.
    ///
    /// Inside a task this faults the calling task with the same payload.
    pub fn resume(self) -> ! {
        panic::resume_unwind(self.payload)
    }
}

impl fmt::Debug for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFault")
            .field("message", &self.message())
            .finish()
    }
}

impl fmt::Display for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => write!(f, "task faulted: {}", msg),
            None => f.write_str("task faulted with a non-string payload"),
        }
    }
}

impl std::error::Error for TaskFault {}

#[cfg(test)]
mod test {
    use std::panic;

    use super::TaskFault;

    #[derive(Debug, PartialEq)]
    struct Custom(u32);

    fn capture(f: impl FnOnce()) -> TaskFault {
        TaskFault::from_panic(panic::catch_unwind(panic::AssertUnwindSafe(f)).unwrap_err())
    }

    #[test]
    fn test_string_payloads() {
        let fault = capture(|| panic!("boom"));
        assert_eq!(fault.message(), Some("boom"));
        assert_eq!(fault.to_string(), "task faulted: boom");

        let fault = capture(|| panic!("code {}", 7));
        assert_eq!(fault.message(), Some("code 7"));
    }

    #[test]
    fn test_custom_payload() {
        let fault = capture(|| panic::panic_any(Custom(3)));
        assert!(fault.message().is_none());
        assert!(fault.is::<Custom>());
        assert_eq!(fault.downcast_ref::<Custom>(), Some(&Custom(3)));
    }

    #[test]
    fn test_resume_keeps_payload() {
        let fault = capture(|| panic::panic_any(Custom(11)));
        let again = capture(move || fault.resume());
        assert_eq!(again.downcast_ref::<Custom>(), Some(&Custom(11)));
    }
}
