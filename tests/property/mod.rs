//! Property-based tests for pagination and canonicalization guarantees

mod canonical_numbers;
