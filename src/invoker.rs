//! Ambient loader binding and the isolated invoker.
//!
//! Some instantiation paths resolve component kinds through whatever loader
//! binding is currently in effect on the thread, and an embedding host may
//! have installed a binding that does not know the kinds an assembly
//! document needs. The factory therefore runs refresh through
//! [`IsolatedInvoker`], which installs a caller-specified loader for exactly
//! the duration of the call and restores the prior binding afterwards,
//! including on unwind.
//!
//! This is an indirection, not a concurrency primitive: the work runs on the
//! calling thread, only the binding differs.

use std::cell::RefCell;
use std::sync::Arc;

use crate::component::ComponentLoader;

thread_local! {
    static AMBIENT: RefCell<Vec<Arc<ComponentLoader>>> = const { RefCell::new(Vec::new()) };
}

/// The loader binding currently installed on this thread, if any.
pub fn ambient_loader() -> Option<Arc<ComponentLoader>> {
    AMBIENT.with(|stack| stack.borrow().last().cloned())
}

/// Pops the binding it pushed, on return or unwind.
struct AmbientGuard;

impl AmbientGuard {
    fn install(loader: Arc<ComponentLoader>) -> Self {
        AMBIENT.with(|stack| stack.borrow_mut().push(loader));
        AmbientGuard
    }
}

impl Drop for AmbientGuard {
    fn drop(&mut self) {
        AMBIENT.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Runs units of work with a specific loader installed as the ambient
/// binding.
pub struct IsolatedInvoker {
    loader: Arc<ComponentLoader>,
}

impl IsolatedInvoker {
    pub fn new(loader: Arc<ComponentLoader>) -> Self {
        Self { loader }
    }

    /// Execute `work` under this invoker's loader binding and return its
    /// outcome unchanged.
    pub fn run<T>(&self, work: impl FnOnce() -> T) -> T {
        let _guard = AmbientGuard::install(self.loader.clone());
        work()
    }
}
