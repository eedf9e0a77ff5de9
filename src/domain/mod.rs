// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Domain-specific value objects, invariants, and orchestration. This layer
// performs no HTTP handling and owns no shared state; the actor and webhook
// layers drive it.
//
// ============================================================================

pub mod order;
