use std::cell::Cell;
use std::rc::Rc;

use crate::ViewerError;

/// Counts file selections. Only the load started by the latest selection may install its scene.
#[derive(Clone, Debug, Default)]
pub struct LoadGeneration {
    current: Rc<Cell<u64>>,
}

impl LoadGeneration {
    /// Starts a new load, invalidating every ticket handed out before.
    pub fn begin(&self) -> LoadTicket {
        let id = self.current.get().wrapping_add(1);
        self.current.set(id);
        LoadTicket {
            id,
            current: self.current.clone(),
        }
    }

    pub fn current(&self) -> u64 {
        self.current.get()
    }
}

#[derive(Clone, Debug)]
pub struct LoadTicket {
    id: u64,
    current: Rc<Cell<u64>>,
}

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.current.get() == self.id
    }

    pub fn ensure_current(&self) -> Result<(), ViewerError> {
        if self.is_current() {
            Ok(())
        } else {
            Err(ViewerError::Superseded)
        }
    }
}
