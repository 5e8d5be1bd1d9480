//! Property-based tests for age arithmetic and field validators.
