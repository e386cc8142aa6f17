//! Order Store Port
//!
//! The datastore the dispatch pipeline writes to: masters, children and
//! fills behind one handle. Any type implementing the three repository
//! traits is an order store.

use crate::domain::order_dispatch::{ChildOrderRepository, FillRepository, MasterOrderRepository};

/// Combined order persistence.
pub trait OrderStore: MasterOrderRepository + ChildOrderRepository + FillRepository {}

impl<T> OrderStore for T where T: MasterOrderRepository + ChildOrderRepository + FillRepository {}
