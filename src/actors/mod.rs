// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based ownership of mutable in-process state. The accumulator actor
// is the single writer for the session → partial-order map; domain rules
// live in src/domain/, not here.
//
// ============================================================================

mod accumulator;

pub use accumulator::{
    AccumulatorActor, AddItems, ClearSession, PeekOrder, RemoveItems, RestoreOrder, TakeOrder,
};
