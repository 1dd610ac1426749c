// Aggregates all integration tests as modules.
