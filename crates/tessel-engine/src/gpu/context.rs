use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::GpuApi;

/// Shared handle to the active GPU backend.
///
/// Resources keep a clone so they can release their handles on drop. The handle is
/// `!Send`: every GPU call stays on the thread that created the context.
#[derive(Clone)]
pub struct GpuContext {
    api: Rc<RefCell<dyn GpuApi>>,
}

impl GpuContext {
    pub fn new<G: GpuApi + 'static>(api: G) -> Self {
        Self {
            api: Rc::new(RefCell::new(api)),
        }
    }

    /// Wraps a backend the caller also keeps a typed handle to.
    pub fn from_rc<G: GpuApi + 'static>(api: Rc<RefCell<G>>) -> Self {
        Self { api }
    }

    /// Runs `f` with exclusive access to the backend.
    ///
    /// Panics if called re-entrantly from inside another `with`.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn GpuApi) -> R) -> R {
        let mut api = self.api.borrow_mut();
        f(&mut *api)
    }

    /// Like [`with`](Self::with) but returns `None` instead of panicking when the
    /// backend is already borrowed. Used on release paths that run inside `Drop`.
    pub(crate) fn try_with<R>(&self, f: impl FnOnce(&mut dyn GpuApi) -> R) -> Option<R> {
        let mut api = self.api.try_borrow_mut().ok()?;
        Some(f(&mut *api))
    }
}

impl fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuContext")
            .field("refs", &Rc::strong_count(&self.api))
            .finish()
    }
}
